//! Integration tests for the maintenance runner sweeping the guards.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use quill_worker::{ChallengeSweep, MaintenanceRunner, RateLimitSweep};

use helpers::TestApp;

const MAINTENANCE: &str = r#"
[rate_limit]
idle_horizon_seconds = 300

[challenge]
ttl_seconds = 60

[maintenance]
interval_seconds = 30
"#;

fn runner_for(app: &TestApp) -> MaintenanceRunner {
    MaintenanceRunner::from_config(&app.config.maintenance)
        .with_task(Arc::new(RateLimitSweep::new(
            Arc::clone(&app.limiter),
            Duration::from_secs(app.config.rate_limit.idle_horizon_seconds),
        )))
        .with_task(Arc::new(ChallengeSweep::new(Arc::clone(&app.challenges))))
}

#[tokio::test(start_paused = true)]
async fn test_run_once_bounds_both_maps() {
    let app = TestApp::new(MAINTENANCE);
    let runner = runner_for(&app);

    for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        app.limiter.allow(&format!("comment:{ip}"), 3, 0.1);
    }
    for _ in 0..4 {
        app.challenges.create().unwrap();
    }

    assert_eq!(runner.run_once().await, 0);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(runner.run_once().await, 4);
    assert!(app.challenges.is_empty());
    assert_eq!(app.limiter.len(), 3);

    tokio::time::advance(Duration::from_secs(240)).await;
    assert_eq!(runner.run_once().await, 3);
    assert!(app.limiter.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_sweeps_and_stops() {
    let app = TestApp::new(MAINTENANCE);
    let runner = runner_for(&app);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    app.challenges.create().unwrap();
    let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

    // Ticks at 30s and 60s leave it; the 90s tick removes it.
    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(app.challenges.len(), 1);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(app.challenges.is_empty());

    cancel_tx.send(true).unwrap();
    handle.await.unwrap();
}
