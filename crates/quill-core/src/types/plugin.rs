//! Plugin descriptor and lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Install-time description of a plugin (a "module").
///
/// `slug` is unique within a registry. `enabled` and `config` are the only
/// fields mutated after install, by `toggle` and `upsert_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique identifier within a registry.
    pub slug: String,
    /// Human-readable name.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Short description shown in the admin panel.
    #[serde(default)]
    pub description: String,
    /// Slugs that must be active before this plugin can be activated.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Persisted enabled flag.
    #[serde(default)]
    pub enabled: bool,
    /// JSON Schema describing the accepted configuration object.
    #[serde(default = "empty_schema")]
    pub config_schema: Value,
    /// Values used for keys that were never explicitly configured.
    #[serde(default)]
    pub config_defaults: Map<String, Value>,
    /// Explicitly configured values.
    #[serde(default)]
    pub config: Map<String, Value>,
    /// When the descriptor was first installed.
    #[serde(default = "Utc::now")]
    pub installed_at: DateTime<Utc>,
}

impl PluginDescriptor {
    /// Create a descriptor with an accept-anything schema and no dependencies.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            dependencies: Vec::new(),
            enabled: false,
            config_schema: empty_schema(),
            config_defaults: Map::new(),
            config: Map::new(),
            installed_at: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a direct dependency.
    pub fn depends_on(mut self, slug: impl Into<String>) -> Self {
        self.dependencies.push(slug.into());
        self
    }

    /// Set the configuration schema.
    pub fn with_config_schema(mut self, schema: Value) -> Self {
        self.config_schema = schema;
        self
    }

    /// Set a configuration default.
    pub fn with_config_default(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config_defaults.insert(key.into(), value);
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Defaults overlaid by explicitly configured values.
    pub fn effective_config(&self) -> Map<String, Value> {
        let mut merged = self.config_defaults.clone();
        for (key, value) in &self.config {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

fn empty_schema() -> Value {
    Value::Object(Map::new())
}

/// Anything a plugin registry can manage.
///
/// Implemented by [`PluginDescriptor`] itself and by descriptors that embed
/// one, such as `FeatherDescriptor`.
pub trait Descriptor: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// The embedded plugin descriptor.
    fn plugin(&self) -> &PluginDescriptor;

    /// Mutable access to the embedded plugin descriptor.
    fn plugin_mut(&mut self) -> &mut PluginDescriptor;

    /// Shorthand for `self.plugin().slug`.
    fn slug(&self) -> &str {
        &self.plugin().slug
    }
}

impl Descriptor for PluginDescriptor {
    fn plugin(&self) -> &PluginDescriptor {
        self
    }

    fn plugin_mut(&mut self) -> &mut PluginDescriptor {
        self
    }
}

/// Lifecycle state of a registry entry.
///
/// `Registered -> Activated -> Deactivated -> Activated -> ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Known to the registry but never activated.
    Registered,
    /// Activation callback completed.
    Activated,
    /// Deactivation callback completed; may be activated again.
    Deactivated,
}

impl LifecycleState {
    /// Whether the entry is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivated => write!(f, "deactivated"),
        }
    }
}
