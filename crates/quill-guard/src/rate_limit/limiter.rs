//! Per-key token bucket rate limiter.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use super::bucket::Bucket;

/// In-memory token bucket rate limiter.
///
/// The limiter holds no policy: each call site passes the capacity and
/// refill rate it wants for its keys. Buckets are created full on first use
/// and refilled lazily on each call; nothing ticks in the background.
///
/// Each key's read-modify-write runs under the map's shard lock for that key,
/// so concurrent calls against one key see a serialized token count.
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// Key → bucket state.
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    /// Creates a limiter with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to consume one token for `key`.
    pub fn allow(&self, key: &str, capacity: u32, refill_per_sec: f64) -> bool {
        let now = Instant::now();

        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(capacity, refill_per_sec, now));

        bucket.reconfigure(capacity, refill_per_sec);
        bucket.refill(now);
        let allowed = bucket.try_take();

        if !allowed {
            debug!(key = %key, capacity = capacity, "Rate limited");
        }
        allowed
    }

    /// Remove buckets untouched for longer than `horizon`. Returns how many.
    pub fn sweep_idle(&self, horizon: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0usize;

        self.buckets.retain(|_, bucket| {
            let idle = now.saturating_duration_since(bucket.last_update()) > horizon;
            if idle {
                evicted += 1;
            }
            !idle
        });

        if evicted > 0 {
            info!(evicted = evicted, remaining = self.buckets.len(), "Evicted idle rate limit buckets");
        } else {
            debug!(remaining = self.buckets.len(), "No idle rate limit buckets");
        }
        evicted
    }

    /// Tokens currently available for `key`, or `None` if it has no bucket.
    pub fn tokens(&self, key: &str) -> Option<f64> {
        let now = Instant::now();
        self.buckets.get(key).map(|bucket| bucket.available_at(now))
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
