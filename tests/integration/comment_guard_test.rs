//! Integration tests for comment submission: rate limit, challenge, spam filter.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use quill_plugin::prelude::*;

use helpers::{SpamFilterPlugin, Submission, TestApp, solve};

const GUARDED: &str = r#"
[challenge]
ttl_seconds = 120

[rate_limit.policies.comment]
capacity = 2
refill_per_sec = 0.5
"#;

#[tokio::test(start_paused = true)]
async fn test_comment_flow_with_spam_plugin() {
    let app = TestApp::new(GUARDED);
    app.capture_saved_comments().await;
    app.runtime
        .modules()
        .register(
            PluginDescriptor::new("spam-filter", "Spam Filter", "1.0").with_enabled(true),
            Arc::new(SpamFilterPlugin { banned: "casino" }),
        )
        .await
        .unwrap();
    app.runtime.boot().await.unwrap();

    let ticket = app.challenges.create().unwrap();
    assert_eq!(ticket.ttl_seconds, 120);
    let answer = solve(&ticket.prompt).to_string();

    let outcome = app
        .submit_comment("10.0.0.1", &ticket.token, &answer, "Great post!")
        .await;
    assert_eq!(
        outcome,
        Submission::Saved(json!({ "body": "Great post!", "status": "approved" }))
    );

    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt).to_string();
    let outcome = app
        .submit_comment("10.0.0.2", &ticket.token, &answer, "Cheap CASINO chips")
        .await;
    assert_eq!(outcome, Submission::Rejected("spam".to_string()));

    let saved = app.saved_comments.lock().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["body"], "Great post!");
}

#[tokio::test(start_paused = true)]
async fn test_replayed_token_is_rejected() {
    let app = TestApp::new(GUARDED);
    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt).to_string();

    assert!(matches!(
        app.submit_comment("10.0.0.1", &ticket.token, &answer, "first").await,
        Submission::Saved(_)
    ));
    assert_eq!(
        app.submit_comment("10.0.0.1", &ticket.token, &answer, "replay").await,
        Submission::ChallengeFailed
    );
}

#[tokio::test(start_paused = true)]
async fn test_wrong_answer_burns_the_challenge() {
    let app = TestApp::new(GUARDED);
    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt);

    assert_eq!(
        app.submit_comment("10.0.0.1", &ticket.token, &(answer + 1).to_string(), "hi")
            .await,
        Submission::ChallengeFailed
    );
    assert_eq!(
        app.submit_comment("10.0.0.1", &ticket.token, &answer.to_string(), "hi")
            .await,
        Submission::ChallengeFailed
    );
}

#[tokio::test(start_paused = true)]
async fn test_expired_challenge_is_rejected() {
    let app = TestApp::new(GUARDED);
    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt).to_string();

    tokio::time::advance(Duration::from_secs(121)).await;
    assert_eq!(
        app.submit_comment("10.0.0.1", &ticket.token, &answer, "too late").await,
        Submission::ChallengeFailed
    );
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_applies_per_ip_before_challenge() {
    let app = TestApp::new(GUARDED);

    for _ in 0..2 {
        let ticket = app.challenges.create().unwrap();
        let answer = solve(&ticket.prompt).to_string();
        assert!(matches!(
            app.submit_comment("10.0.0.9", &ticket.token, &answer, "hello").await,
            Submission::Saved(_)
        ));
    }

    // Third attempt is limited and the challenge is left untouched.
    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt).to_string();
    assert_eq!(
        app.submit_comment("10.0.0.9", &ticket.token, &answer, "again").await,
        Submission::RateLimited
    );
    assert_eq!(app.challenges.len(), 1);

    // Another client is unaffected.
    assert!(matches!(
        app.submit_comment("10.0.0.10", &ticket.token, &answer, "other").await,
        Submission::Saved(_)
    ));

    // 0.5 tokens per second: two seconds restores one comment.
    tokio::time::advance(Duration::from_secs(2)).await;
    let ticket = app.challenges.create().unwrap();
    let answer = solve(&ticket.prompt).to_string();
    assert!(matches!(
        app.submit_comment("10.0.0.9", &ticket.token, &answer, "later").await,
        Submission::Saved(_)
    ));
}

#[tokio::test]
async fn test_unconfigured_policy_falls_back_to_default() {
    let app = TestApp::with_defaults();
    let policy = app.config.rate_limit.policy("comment");
    assert_eq!(policy, app.config.rate_limit.policy("anything-else"));
    assert!(policy.capacity > 0);
}
