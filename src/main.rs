//! Quill Server: extension and policy runtime
//!
//! Main entry point that wires the plugin runtime, the abuse guards and the
//! maintenance runner together and keeps them alive until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

use quill_core::config::AppConfig;
use quill_core::error::AppError;
use quill_guard::{ChallengeStore, RateLimiter};
use quill_plugin::PluginRuntime;
use quill_worker::{ChallengeSweep, MaintenanceRunner, RateLimitSweep};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("QUILL_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Quill");

    // ── Step 1: Plugin runtime ───────────────────────────────────
    let runtime = Arc::new(PluginRuntime::in_memory(&config.plugins));

    if config.plugins.auto_activate {
        let report = runtime.boot().await.map_err(AppError::from)?;
        for (slug, reason) in report.modules.failed.iter().chain(&report.feathers.failed) {
            tracing::warn!(slug = %slug, reason = %reason, "Plugin left inactive");
        }
    } else {
        tracing::info!("Plugin auto-activation disabled");
    }

    // ── Step 2: Abuse guards ─────────────────────────────────────
    let limiter = Arc::new(RateLimiter::new());
    let challenges = Arc::new(ChallengeStore::new(&config.challenge));
    tracing::info!(
        policies = config.rate_limit.policies.len(),
        challenge_ttl_secs = config.challenge.ttl_seconds,
        "Abuse guards initialized"
    );

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Maintenance runner ───────────────────────────────
    let maintenance_handle = if config.maintenance.enabled {
        let runner = MaintenanceRunner::from_config(&config.maintenance)
            .with_task(Arc::new(RateLimitSweep::new(
                Arc::clone(&limiter),
                Duration::from_secs(config.rate_limit.idle_horizon_seconds),
            )))
            .with_task(Arc::new(ChallengeSweep::new(Arc::clone(&challenges))));

        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            runner.run(cancel).await;
        }))
    } else {
        tracing::info!("Maintenance runner disabled");
        None
    };

    tracing::info!("Quill runtime ready");

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = maintenance_handle {
        join_maintenance(handle, Duration::from_secs(10)).await;
    }

    runtime.shutdown().await;

    tracing::info!("Quill shut down gracefully");
    Ok(())
}

/// Wait up to `grace` for the maintenance task to finish.
///
/// Returns `true` on a clean stop. A panic or a timeout is logged.
async fn join_maintenance(handle: JoinHandle<()>, grace: Duration) -> bool {
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(())) => {
            tracing::info!("Maintenance runner stopped");
            true
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Maintenance runner task failed");
            false
        }
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Maintenance runner did not stop in time"
            );
            false
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
