//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Priority assigned to hook handlers registered without an explicit one.
    #[serde(default = "default_priority")]
    pub default_priority: i32,
    /// Whether enabled plugins are activated on startup.
    #[serde(default = "default_true")]
    pub auto_activate: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            auto_activate: true,
        }
    }
}

fn default_priority() -> i32 {
    10
}

fn default_true() -> bool {
    true
}
