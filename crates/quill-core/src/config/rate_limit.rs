//! Rate limiter configuration.
//!
//! The limiter itself is policy-free: every call site passes its own
//! capacity and refill rate. This section only holds housekeeping settings
//! and a table of named policies call sites may look up.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Buckets untouched for longer than this are evicted by the sweep.
    #[serde(default = "default_idle_horizon")]
    pub idle_horizon_seconds: u64,
    /// Named policies keyed by call site (e.g. `"comment"`, `"login"`).
    #[serde(default)]
    pub policies: HashMap<String, RateLimitPolicy>,
}

impl RateLimitConfig {
    /// Return the named policy, or [`RateLimitPolicy::default`] when absent.
    pub fn policy(&self, name: &str) -> RateLimitPolicy {
        self.policies.get(name).cloned().unwrap_or_default()
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            idle_horizon_seconds: default_idle_horizon(),
            policies: HashMap::new(),
        }
    }
}

/// Token bucket parameters for one call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Maximum burst size.
    pub capacity: u32,
    /// Tokens restored per second.
    pub refill_per_sec: f64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_per_sec: 1.0,
        }
    }
}

fn default_idle_horizon() -> u64 {
    3600
}
