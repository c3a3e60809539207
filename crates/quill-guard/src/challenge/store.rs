//! Challenge store: TTL-bound, single-use verification tokens.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use quill_core::config::ChallengeConfig;
use quill_core::error::AppError;
use quill_core::result::AppResult;

use super::puzzle::Puzzle;

/// What the comment form receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeTicket {
    pub token: String,
    pub prompt: String,
    pub ttl_seconds: u64,
}

/// A stored challenge. The plaintext answer is never kept.
#[derive(Debug, Clone)]
struct Challenge {
    answer_hash: String,
    expires_at: Instant,
}

/// In-memory store of pending challenges keyed by token.
///
/// Any lookup consumes the entry: a right answer, a wrong answer, and an
/// expired entry all remove it. `validate` takes the entry out of the map
/// before comparing, so two concurrent calls with one token cannot both
/// succeed.
#[derive(Debug)]
pub struct ChallengeStore {
    entries: DashMap<String, Challenge>,
    ttl: Duration,
    max_operand: u32,
}

impl ChallengeStore {
    /// Creates an empty store using the configured TTL and operand range.
    pub fn new(config: &ChallengeConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(config.ttl_seconds),
            max_operand: config.max_operand,
        }
    }

    /// Issue a random challenge.
    pub fn create(&self) -> AppResult<ChallengeTicket> {
        let puzzle = Puzzle::random(&mut rand::thread_rng(), self.max_operand);
        self.issue(&puzzle)
    }

    /// Issue a challenge for a given puzzle.
    pub fn issue(&self, puzzle: &Puzzle) -> AppResult<ChallengeTicket> {
        let answer = puzzle
            .answer()
            .ok_or_else(|| AppError::internal(format!("Puzzle overflows: {}", puzzle.prompt())))?;

        let expires_at = Instant::now().checked_add(self.ttl).ok_or_else(|| {
            AppError::configuration(format!(
                "Challenge TTL of {}s is out of range",
                self.ttl.as_secs()
            ))
        })?;

        let token = Uuid::new_v4().simple().to_string();
        let challenge = Challenge {
            answer_hash: hash_answer(&token, answer),
            expires_at,
        };
        self.entries.insert(token.clone(), challenge);

        debug!(token = %token, ttl_seconds = self.ttl.as_secs(), "Challenge issued");

        Ok(ChallengeTicket {
            token,
            prompt: puzzle.prompt(),
            ttl_seconds: self.ttl.as_secs(),
        })
    }

    /// Check `answer` for `token`, consuming the challenge.
    ///
    /// Returns `false` for unknown, consumed or expired tokens, and for
    /// answers that are not an integer or are wrong.
    pub fn validate(&self, token: &str, answer: &str) -> bool {
        let Some((_, challenge)) = self.entries.remove(token) else {
            debug!(token = %token, "Unknown or consumed challenge");
            return false;
        };

        if Instant::now() > challenge.expires_at {
            debug!(token = %token, "Challenge expired");
            return false;
        }

        let Ok(answer) = answer.trim().parse::<i64>() else {
            debug!(token = %token, "Challenge answer is not a number");
            return false;
        };

        let passed = hash_answer(token, answer) == challenge.answer_hash;
        debug!(token = %token, passed = passed, "Challenge answered");
        passed
    }

    /// Remove every expired challenge. Returns how many.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0usize;

        self.entries.retain(|_, challenge| {
            let expired = now > challenge.expires_at;
            if expired {
                evicted += 1;
            }
            !expired
        });

        if evicted > 0 {
            info!(evicted = evicted, remaining = self.entries.len(), "Evicted expired challenges");
        } else {
            debug!(remaining = self.entries.len(), "No expired challenges");
        }
        evicted
    }

    /// Number of pending challenges, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hex SHA-256 of `token:answer`.
fn hash_answer(token: &str, answer: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(b":");
    hasher.update(answer.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
