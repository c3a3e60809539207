//! Token bucket rate limiting.

mod bucket;
mod limiter;

pub use limiter::RateLimiter;
