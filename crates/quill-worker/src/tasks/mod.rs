//! Sweep task trait and built-in tasks.

pub mod challenge;
pub mod rate_limit;

use async_trait::async_trait;

pub use challenge::ChallengeSweep;
pub use rate_limit::RateLimitSweep;

/// One unit of periodic maintenance.
#[async_trait]
pub trait SweepTask: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run one sweep. Returns the number of entries evicted.
    async fn run(&self) -> Result<usize, SweepError>;
}

/// Error from a sweep tick. Logged by the runner; the loop continues.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// The sweep could not complete.
    #[error("Sweep failed: {0}")]
    Failed(String),
}
