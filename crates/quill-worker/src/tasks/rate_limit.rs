//! Idle bucket eviction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use quill_guard::RateLimiter;

use super::{SweepError, SweepTask};

/// Evicts rate limit buckets untouched for longer than `idle_horizon`.
#[derive(Debug)]
pub struct RateLimitSweep {
    limiter: Arc<RateLimiter>,
    idle_horizon: Duration,
}

impl RateLimitSweep {
    pub fn new(limiter: Arc<RateLimiter>, idle_horizon: Duration) -> Self {
        Self {
            limiter,
            idle_horizon,
        }
    }
}

#[async_trait]
impl SweepTask for RateLimitSweep {
    fn name(&self) -> &str {
        "rate_limit"
    }

    async fn run(&self) -> Result<usize, SweepError> {
        Ok(self.limiter.sweep_idle(self.idle_horizon))
    }
}
