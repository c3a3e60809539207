//! # quill-guard
//!
//! Abuse controls for Quill:
//!
//! - [`RateLimiter`]: per-key token buckets with lazy refill; callers pass
//!   capacity and refill rate on every call
//! - [`ChallengeStore`]: short-lived, single-use arithmetic challenges for
//!   comment forms, storing only a salted hash of each answer
//!
//! Both are plain service objects. Nothing here is global; construct one,
//! share it through an `Arc`, and let a maintenance task sweep it.

pub mod challenge;
pub mod rate_limit;

pub use challenge::{ChallengeStore, ChallengeTicket, Operator, Puzzle};
pub use rate_limit::RateLimiter;
