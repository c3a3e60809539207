//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use quill_core::config::AppConfig;
use quill_guard::{ChallengeStore, RateLimiter};
use quill_plugin::hooks::{ActionFn, FilterFn, HandlerError};
use quill_plugin::prelude::*;

/// Test application context
pub struct TestApp {
    /// Application config
    pub config: AppConfig,
    /// Plugin runtime with in-memory stores
    pub runtime: PluginRuntime,
    /// Shared rate limiter
    pub limiter: Arc<RateLimiter>,
    /// Shared challenge store
    pub challenges: Arc<ChallengeStore>,
    /// Comments accepted by `submit_comment`
    pub saved_comments: Arc<Mutex<Vec<Value>>>,
}

/// Outcome of a comment submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Saved(Value),
    RateLimited,
    ChallengeFailed,
    Rejected(String),
}

impl TestApp {
    /// Create a new test application from inline TOML
    pub fn new(toml: &str) -> Self {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .expect("Failed to build test config")
            .try_deserialize()
            .expect("Failed to deserialize test config");

        Self {
            runtime: PluginRuntime::in_memory(&config.plugins),
            limiter: Arc::new(RateLimiter::new()),
            challenges: Arc::new(ChallengeStore::new(&config.challenge)),
            saved_comments: Arc::new(Mutex::new(Vec::new())),
            config,
        }
    }

    /// Create a test application with default configuration
    pub fn with_defaults() -> Self {
        Self::new("")
    }

    /// Record every `comment.saved` action into `saved_comments`
    pub async fn capture_saved_comments(&self) {
        let sink = Arc::clone(&self.saved_comments);
        self.runtime
            .hooks()
            .add_action(
                HookName::COMMENT_SAVED,
                ActionFn::arc("test-capture", move |args| {
                    let sink = Arc::clone(&sink);
                    async move {
                        let comment = args.get("comment").cloned().unwrap_or(Value::Null);
                        sink.lock().await.push(comment);
                        Ok(())
                    }
                }),
            )
            .await;
    }

    /// Run a comment through the guards and the hook pipeline the way a
    /// comment handler would.
    pub async fn submit_comment(
        &self,
        ip: &str,
        token: &str,
        answer: &str,
        body: &str,
    ) -> Submission {
        let policy = self.config.rate_limit.policy("comment");
        if !self
            .limiter
            .allow(&format!("comment:{ip}"), policy.capacity, policy.refill_per_sec)
        {
            return Submission::RateLimited;
        }

        if !self.challenges.validate(token, answer) {
            return Submission::ChallengeFailed;
        }

        let args = HookArgs::new().with_actor(ip);
        let comment = self
            .runtime
            .hooks()
            .apply_filters(
                HookName::COMMENT_BEFORE_SAVE,
                json!({ "body": body, "status": "approved" }),
                &args,
            )
            .await;

        if comment["status"] == "spam" {
            return Submission::Rejected("spam".to_string());
        }

        let args = args.with_data("comment", comment.clone());
        self.runtime
            .hooks()
            .do_action(HookName::COMMENT_SAVED, &args)
            .await;
        Submission::Saved(comment)
    }
}

/// Solve a challenge prompt of the form `What is A op B?`
pub fn solve(prompt: &str) -> i64 {
    let expression = prompt
        .trim_start_matches("What is ")
        .trim_end_matches('?');
    let parts: Vec<&str> = expression.split_whitespace().collect();
    assert_eq!(parts.len(), 3, "unexpected prompt {prompt}");

    let left: i64 = parts[0].parse().expect("left operand");
    let right: i64 = parts[2].parse().expect("right operand");
    match parts[1] {
        "+" => left + right,
        "-" => left - right,
        "×" => left * right,
        other => panic!("unknown operator {other}"),
    }
}

// ── Plugin fixtures ──────────────────────────────────────────────

/// Wraps paragraphs in `<p>` tags on `markup.text`.
#[derive(Debug)]
pub struct ParagraphsPlugin;

#[async_trait]
impl Extension for ParagraphsPlugin {
    async fn on_activate(&self, hooks: &HookBus) -> Result<(), String> {
        hooks
            .register_filter(
                HookName::MARKUP_TEXT,
                20,
                FilterFn::arc("paragraphs", |value, _args| async move {
                    let text = value.as_str().unwrap_or_default();
                    let html: Vec<String> = text
                        .split("\n\n")
                        .filter(|p| !p.trim().is_empty())
                        .map(|p| format!("<p>{}</p>", p.trim()))
                        .collect();
                    Ok(Value::from(html.join("")))
                }),
            )
            .await;
        Ok(())
    }
}

/// Converts `--` into an en dash on `markup.text`, before paragraphs.
#[derive(Debug)]
pub struct SmartypantsPlugin;

#[async_trait]
impl Extension for SmartypantsPlugin {
    async fn on_activate(&self, hooks: &HookBus) -> Result<(), String> {
        hooks
            .register_filter(
                HookName::MARKUP_TEXT,
                5,
                FilterFn::arc("smartypants", |value, _args| async move {
                    let text = value.as_str().unwrap_or_default().replace("--", "\u{2013}");
                    Ok(Value::from(text))
                }),
            )
            .await;
        Ok(())
    }
}

/// Filter that always fails, standing in for a broken plugin.
#[derive(Debug)]
pub struct BrokenMarkupPlugin;

#[async_trait]
impl Extension for BrokenMarkupPlugin {
    async fn on_activate(&self, hooks: &HookBus) -> Result<(), String> {
        hooks
            .register_filter(
                HookName::MARKUP_TEXT,
                10,
                FilterFn::arc("broken-markup", |_value, _args| async move {
                    Err(HandlerError::failed("regex compile error"))
                }),
            )
            .await;
        Ok(())
    }
}

/// Marks comments containing a banned word as spam on `comment.before_save`.
#[derive(Debug)]
pub struct SpamFilterPlugin {
    pub banned: &'static str,
}

#[async_trait]
impl Extension for SpamFilterPlugin {
    async fn on_activate(&self, hooks: &HookBus) -> Result<(), String> {
        let banned = self.banned;
        hooks
            .add_filter(
                HookName::COMMENT_BEFORE_SAVE,
                FilterFn::arc("spam-filter", move |mut comment, _args| async move {
                    let body = comment["body"].as_str().unwrap_or_default().to_lowercase();
                    if body.contains(banned) {
                        comment["status"] = json!("spam");
                    }
                    Ok(comment)
                }),
            )
            .await;
        Ok(())
    }
}

/// Renders the `quote` feather.
#[derive(Debug)]
pub struct QuoteRenderer;

#[async_trait]
impl FeatherRenderer for QuoteRenderer {
    async fn render(&self, input: &Map<String, Value>) -> Result<String, String> {
        let quote = input.get("quote").and_then(Value::as_str).unwrap_or_default();
        Ok(match input.get("source").and_then(Value::as_str) {
            Some(source) if !source.is_empty() => {
                format!("<blockquote>{quote}</blockquote><cite>{source}</cite>")
            }
            _ => format!("<blockquote>{quote}</blockquote>"),
        })
    }
}

/// The `quote` feather descriptor.
pub fn quote_feather() -> FeatherDescriptor {
    FeatherDescriptor::new(PluginDescriptor::new("quote", "Quote", "1.0"))
        .with_field(FieldSpec::new("quote", FieldType::TextBlock, "Quote").required())
        .with_field(FieldSpec::new("source", FieldType::Text, "Source"))
}
