//! Background maintenance configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic sweep of idle buckets and expired challenges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Whether the maintenance runner is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between sweeps.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}
