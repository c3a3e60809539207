//! Fixed-interval maintenance loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use quill_core::config::MaintenanceConfig;

use crate::tasks::SweepTask;

/// Shortest interval the runner will tick at.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs every registered sweep task once per interval until cancelled.
#[derive(Debug)]
pub struct MaintenanceRunner {
    interval: Duration,
    tasks: Vec<Arc<dyn SweepTask>>,
}

impl MaintenanceRunner {
    /// Creates a runner with no tasks. Intervals below [`MIN_INTERVAL`] are
    /// raised to it.
    pub fn new(interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                requested_ms = interval.as_millis() as u64,
                "Maintenance interval too short, using minimum"
            );
        }
        Self {
            interval: interval.max(MIN_INTERVAL),
            tasks: Vec::new(),
        }
    }

    /// Creates a runner ticking at `config.interval_seconds`.
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self::new(Duration::from_secs(config.interval_seconds))
    }

    /// Add a task to every pass.
    pub fn with_task(mut self, task: Arc<dyn SweepTask>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Effective tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Tick until `cancel` flips to `true` or its sender is dropped.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            tasks = self.tasks.len(),
            "Maintenance runner started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Maintenance runner shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Run every task once. Returns the total number of evicted entries.
    pub async fn run_once(&self) -> usize {
        let mut total = 0;
        for task in &self.tasks {
            match task.run().await {
                Ok(evicted) => {
                    debug!(task = %task.name(), evicted = evicted, "Sweep complete");
                    total += evicted;
                }
                Err(e) => {
                    error!(task = %task.name(), error = %e, "Sweep failed");
                }
            }
        }
        total
    }
}
