//! # quill-worker
//!
//! Background maintenance for Quill. A [`MaintenanceRunner`] ticks on a
//! fixed interval and runs each registered [`SweepTask`]: evicting idle rate
//! limit buckets and expired challenges so their maps stay bounded
//! regardless of request traffic.

pub mod runner;
pub mod tasks;

pub use runner::{MIN_INTERVAL, MaintenanceRunner};
pub use tasks::{ChallengeSweep, RateLimitSweep, SweepError, SweepTask};
