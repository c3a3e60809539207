//! Single token bucket.

use tokio::time::Instant;

/// Bucket state for one key.
///
/// Invariant: `0 <= tokens <= capacity`.
#[derive(Debug, Clone)]
pub(crate) struct Bucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_update: Instant,
}

impl Bucket {
    /// A new bucket holding its full capacity.
    pub(crate) fn full(capacity: u32, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            tokens: f64::from(capacity),
            capacity: f64::from(capacity),
            refill_per_sec: sanitize_rate(refill_per_sec),
            last_update: now,
        }
    }

    /// Apply the caller's current parameters. Shrinking clamps stored tokens.
    pub(crate) fn reconfigure(&mut self, capacity: u32, refill_per_sec: f64) {
        self.capacity = f64::from(capacity);
        self.refill_per_sec = sanitize_rate(refill_per_sec);
        self.tokens = self.tokens.min(self.capacity);
    }

    /// Add tokens for the time elapsed since the last update.
    pub(crate) fn refill(&mut self, now: Instant) {
        self.tokens = self.available_at(now);
        self.last_update = now;
    }

    /// Consume one token if available.
    pub(crate) fn try_take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens that would be available at `now`, without mutating.
    pub(crate) fn available_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        (self.tokens + elapsed * self.refill_per_sec).min(self.capacity)
    }

    pub(crate) fn last_update(&self) -> Instant {
        self.last_update
    }
}

/// Negative, NaN and infinite rates refill nothing.
fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 { rate } else { 0.0 }
}
