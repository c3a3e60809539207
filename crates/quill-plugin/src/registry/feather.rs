//! Feather registry: content types bound to a renderer and a form manifest.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use quill_core::traits::DescriptorStore;
use quill_core::types::{FeatherDescriptor, FieldSpec, LifecycleState};

use super::{ActivationReport, Extension, Registry};
use crate::error::RegistryError;
use crate::hooks::HookBus;

/// Turns a feather's submitted fields into post markup.
#[async_trait]
pub trait FeatherRenderer: Send + Sync + std::fmt::Debug {
    async fn render(&self, input: &Map<String, Value>) -> Result<String, String>;
}

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedContent {
    pub feather: String,
    pub html: String,
}

/// [`Registry`] of feathers plus the renderer bound to each slug.
#[derive(Debug)]
pub struct FeatherRegistry {
    registry: Registry<FeatherDescriptor>,
    renderers: RwLock<HashMap<String, Arc<dyn FeatherRenderer>>>,
}

impl FeatherRegistry {
    /// Creates an empty feather registry on `hooks`.
    pub fn new(hooks: Arc<HookBus>, store: Arc<dyn DescriptorStore<FeatherDescriptor>>) -> Self {
        Self {
            registry: Registry::new("feather", hooks, store),
            renderers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a feather and bind its renderer.
    pub async fn register(
        &self,
        descriptor: FeatherDescriptor,
        extension: Arc<dyn Extension>,
        renderer: Arc<dyn FeatherRenderer>,
    ) -> Result<(), RegistryError> {
        let slug = descriptor.plugin.slug.clone();
        self.registry.register(descriptor, extension).await?;
        self.renderers.write().await.insert(slug, renderer);
        Ok(())
    }

    /// Render submitted input with the feather bound to `slug`.
    ///
    /// Every required field must be present and non-empty: `null`, `""` and
    /// `[]` all count as missing. The feather does not need to be active.
    pub async fn render(&self, slug: &str, input: &Value) -> Result<RenderedContent, RegistryError> {
        let descriptor = self
            .registry
            .get(slug)
            .await
            .ok_or_else(|| RegistryError::ModuleNotFound(slug.to_string()))?;

        let renderer = self
            .renderers
            .read()
            .await
            .get(slug)
            .cloned()
            .ok_or_else(|| RegistryError::RendererMissing(slug.to_string()))?;

        let empty = Map::new();
        let fields = input.as_object().unwrap_or(&empty);

        if let Some(field) = descriptor
            .required_fields()
            .find(|name| is_missing(fields.get(*name)))
        {
            debug!(feather = %slug, field = %field, "Required field missing");
            return Err(RegistryError::MissingField {
                slug: slug.to_string(),
                field: field.to_string(),
            });
        }

        let html = renderer.render(fields).await.map_err(|reason| {
            warn!(feather = %slug, error = %reason, "Render failed");
            RegistryError::RenderFailed {
                slug: slug.to_string(),
                reason,
            }
        })?;

        Ok(RenderedContent {
            feather: slug.to_string(),
            html,
        })
    }

    /// Form manifest for `slug`.
    pub async fn fields(&self, slug: &str) -> Option<Vec<FieldSpec>> {
        self.registry.get(slug).await.map(|d| d.fields)
    }

    /// Whether a renderer is bound to `slug`.
    pub async fn has_renderer(&self, slug: &str) -> bool {
        self.renderers.read().await.contains_key(slug)
    }

    /// See [`Registry::activate`].
    pub async fn activate(&self, slug: &str) -> Result<(), RegistryError> {
        self.registry.activate(slug).await
    }

    /// See [`Registry::deactivate`].
    pub async fn deactivate(&self, slug: &str) -> Result<(), RegistryError> {
        self.registry.deactivate(slug).await
    }

    /// See [`Registry::toggle`].
    pub async fn toggle(&self, slug: &str, enabled: bool) -> Result<(), RegistryError> {
        self.registry.toggle(slug, enabled).await
    }

    /// See [`Registry::upsert_config`].
    pub async fn upsert_config(&self, slug: &str, key: &str, value: Value) -> Result<(), RegistryError> {
        self.registry.upsert_config(slug, key, value).await
    }

    /// See [`Registry::activate_enabled`].
    pub async fn activate_enabled(&self) -> Result<ActivationReport, RegistryError> {
        self.registry.activate_enabled().await
    }

    /// See [`Registry::deactivate_all`].
    pub async fn deactivate_all(&self) {
        self.registry.deactivate_all().await
    }

    /// Feather descriptor for `slug`.
    pub async fn get(&self, slug: &str) -> Option<FeatherDescriptor> {
        self.registry.get(slug).await
    }

    /// All feathers in registration order.
    pub async fn list(&self) -> Vec<FeatherDescriptor> {
        self.registry.list().await
    }

    /// Lifecycle state for `slug`.
    pub async fn state(&self, slug: &str) -> Option<LifecycleState> {
        self.registry.state(slug).await
    }

    /// Whether `slug` is `Activated`.
    pub async fn is_active(&self, slug: &str) -> bool {
        self.registry.is_active(slug).await
    }

    /// Number of registered feathers.
    pub async fn len(&self) -> usize {
        self.registry.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.is_empty().await
    }

    /// The underlying generic registry.
    pub fn inner(&self) -> &Registry<FeatherDescriptor> {
        &self.registry
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
