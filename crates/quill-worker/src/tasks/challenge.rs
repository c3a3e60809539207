//! Expired challenge eviction.

use std::sync::Arc;

use async_trait::async_trait;

use quill_guard::ChallengeStore;

use super::{SweepError, SweepTask};

/// Evicts challenges past their expiry, answered or not.
#[derive(Debug)]
pub struct ChallengeSweep {
    store: Arc<ChallengeStore>,
}

impl ChallengeSweep {
    pub fn new(store: Arc<ChallengeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SweepTask for ChallengeSweep {
    fn name(&self) -> &str {
        "challenge"
    }

    async fn run(&self) -> Result<usize, SweepError> {
        Ok(self.store.sweep_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::config::ChallengeConfig;
    use std::time::Duration;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_abandoned_challenges() {
        let config = ChallengeConfig {
            ttl_seconds: 30,
            ..ChallengeConfig::default()
        };
        let store = Arc::new(ChallengeStore::new(&config));
        store.create().unwrap();
        store.create().unwrap();

        let task = ChallengeSweep::new(Arc::clone(&store));
        assert_eq!(task.run().await.unwrap(), 0);

        time::advance(Duration::from_secs(31)).await;
        assert_eq!(task.run().await.unwrap(), 2);
        assert!(store.is_empty());
    }
}
