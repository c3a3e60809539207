//! Comment challenge configuration.

use serde::{Deserialize, Serialize};

/// Settings for the arithmetic comment challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Seconds a challenge stays answerable after creation.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Largest operand used when generating a puzzle.
    #[serde(default = "default_max_operand")]
    pub max_operand: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_operand: default_max_operand(),
        }
    }
}

fn default_ttl() -> u64 {
    600
}

fn default_max_operand() -> u32 {
    10
}
