//! Integration tests for plugin boot and the markup pipeline.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use quill_plugin::prelude::*;

use helpers::{
    BrokenMarkupPlugin, ParagraphsPlugin, QuoteRenderer, SmartypantsPlugin, TestApp,
    quote_feather,
};

async fn render_markup(app: &TestApp, text: &str) -> Value {
    app.runtime
        .hooks()
        .apply_filters(HookName::MARKUP_TEXT, json!(text), &HookArgs::new())
        .await
}

#[tokio::test]
async fn test_boot_builds_markup_pipeline_in_priority_order() {
    let app = TestApp::with_defaults();
    let modules = app.runtime.modules();

    // Registered in reverse of their filter priority.
    modules
        .register(
            PluginDescriptor::new("paragraphs", "Paragraphs", "1.0").with_enabled(true),
            Arc::new(ParagraphsPlugin),
        )
        .await
        .unwrap();
    modules
        .register(
            PluginDescriptor::new("smartypants", "SmartyPants", "1.0").with_enabled(true),
            Arc::new(SmartypantsPlugin),
        )
        .await
        .unwrap();

    let report = app.runtime.boot().await.unwrap();
    assert_eq!(report.activated(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        app.runtime.hooks().filter_priorities(HookName::MARKUP_TEXT).await,
        vec![5, 20]
    );

    let html = render_markup(&app, "Rust -- fast\n\nand safe").await;
    assert_eq!(html, json!("<p>Rust \u{2013} fast</p><p>and safe</p>"));
}

#[tokio::test]
async fn test_broken_plugin_does_not_break_rendering() {
    let app = TestApp::with_defaults();
    let modules = app.runtime.modules();

    for (slug, extension) in [
        ("smartypants", Arc::new(SmartypantsPlugin) as Arc<dyn Extension>),
        ("broken", Arc::new(BrokenMarkupPlugin) as Arc<dyn Extension>),
        ("paragraphs", Arc::new(ParagraphsPlugin) as Arc<dyn Extension>),
    ] {
        modules
            .register(PluginDescriptor::new(slug, slug, "1.0"), extension)
            .await
            .unwrap();
        modules.activate(slug).await.unwrap();
    }

    assert_eq!(app.runtime.hooks().filter_count(HookName::MARKUP_TEXT).await, 3);
    let html = render_markup(&app, "a -- b").await;
    assert_eq!(html, json!("<p>a \u{2013} b</p>"));
}

#[tokio::test]
async fn test_dependency_chain_boots_in_registration_order() {
    let app = TestApp::with_defaults();
    let modules = app.runtime.modules();

    modules
        .register(
            PluginDescriptor::new("comments", "Comments", "1.0").with_enabled(true),
            Arc::new(NoopExtension),
        )
        .await
        .unwrap();
    modules
        .register(
            PluginDescriptor::new("akismet", "Akismet", "1.0")
                .depends_on("comments")
                .with_enabled(true),
            Arc::new(NoopExtension),
        )
        .await
        .unwrap();
    // Enabled, but its dependency is never enabled.
    modules
        .register(
            PluginDescriptor::new("lightbox", "Lightbox", "1.0")
                .depends_on("gallery")
                .with_enabled(true),
            Arc::new(NoopExtension),
        )
        .await
        .unwrap();
    modules
        .register(PluginDescriptor::new("gallery", "Gallery", "1.0"), Arc::new(NoopExtension))
        .await
        .unwrap();

    let report = app.runtime.boot().await.unwrap();
    assert_eq!(report.modules.activated, vec!["comments", "akismet"]);
    assert_eq!(report.modules.failed.len(), 1);
    assert_eq!(report.modules.failed[0].0, "lightbox");

    modules.activate("gallery").await.unwrap();
    modules.activate("lightbox").await.unwrap();
    assert!(modules.is_active("lightbox").await);

    app.runtime.shutdown().await;
    for descriptor in modules.list().await {
        assert!(!modules.is_active(&descriptor.slug).await);
    }
}

#[tokio::test]
async fn test_duplicate_registration_leaves_registry_unchanged() {
    let app = TestApp::with_defaults();
    let modules = app.runtime.modules();

    modules
        .register(PluginDescriptor::new("tags", "Tags", "1.0"), Arc::new(NoopExtension))
        .await
        .unwrap();
    let before = modules.list().await;

    let err = modules
        .register(PluginDescriptor::new("tags", "Tags Pro", "2.0"), Arc::new(NoopExtension))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateSlug(_)));
    assert_eq!(modules.list().await, before);
}

#[tokio::test]
async fn test_feather_renders_after_boot() {
    let app = TestApp::with_defaults();
    let feathers = app.runtime.feathers();

    feathers
        .register(
            {
                let mut quote = quote_feather();
                quote.plugin.enabled = true;
                quote
            },
            Arc::new(NoopExtension),
            Arc::new(QuoteRenderer),
        )
        .await
        .unwrap();

    let report = app.runtime.boot().await.unwrap();
    assert_eq!(report.feathers.activated, vec!["quote"]);

    let rendered = feathers
        .render("quote", &json!({ "quote": "Ship it.", "source": "Everyone" }))
        .await
        .unwrap();
    assert_eq!(
        rendered.html,
        "<blockquote>Ship it.</blockquote><cite>Everyone</cite>"
    );

    let err = feathers
        .render("quote", &json!({ "source": "Nobody" }))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::MissingField { ref field, .. } if field == "quote"));

    let manifest = feathers.fields("quote").await.unwrap();
    let required: Vec<&str> = manifest
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(required, vec!["quote"]);
}

#[tokio::test]
async fn test_plugin_config_round_trip() {
    let app = TestApp::new(
        r#"
        [plugins]
        default_priority = 50
        "#,
    );
    assert_eq!(app.runtime.hooks().default_priority(), 50);

    let modules = app.runtime.modules();
    modules
        .register(
            PluginDescriptor::new("excerpt", "Excerpt", "1.0")
                .with_config_schema(json!({
                    "type": "object",
                    "properties": { "words": { "type": "integer", "minimum": 10, "maximum": 500 } }
                }))
                .with_config_default("words", json!(55)),
            Arc::new(NoopExtension),
        )
        .await
        .unwrap();

    let err = modules
        .upsert_config("excerpt", "words", json!(5000))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidConfig { ref violations, .. } if !violations.is_empty()));
    assert_eq!(
        modules.effective_config("excerpt").await.unwrap().get("words"),
        Some(&json!(55))
    );

    modules.upsert_config("excerpt", "words", json!(120)).await.unwrap();
    assert_eq!(
        modules.effective_config("excerpt").await.unwrap().get("words"),
        Some(&json!(120))
    );
}
