//! Verification runner tests for pact-harness.
// crates/pact-harness/tests/runner.rs
// =============================================================================
// Module: Runner Tests
// Description: End-to-end verification against an in-process axum router.
// Purpose: Ensure selection, dispatch, callbacks, and matching cooperate.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use axum::Extension;
use axum::Router;
use axum::routing::get;
use pact_harness::ContextPath;
use pact_harness::FnMatcher;
use pact_harness::HttpVerb;
use pact_harness::PactTestRunner;
use pact_harness::RequestBuildError;
use pact_harness::StatusMatcher;
use pact_harness::VerificationError;
use pact_harness::VerificationOutcome;

mod common;

/// Runner over the user pact targeting the user router.
fn user_runner() -> PactTestRunner {
    let mut runner = PactTestRunner::new(vec![common::user_pact()]);
    runner.with_target(common::user_router());
    runner
}

#[tokio::test]
async fn verifies_interaction_by_provider_state() {
    let mut runner = user_runner();
    runner.with_provider_state("user 1 exists");
    let report = runner.run().await.unwrap();
    assert_eq!(report.outcome, VerificationOutcome::Verified);
    assert_eq!(report.description, "get user");
    assert_eq!(report.method, Some(HttpVerb::Get));
    assert_eq!(report.status, Some(200));
    assert_eq!(report.expectations_checked, 3);
}

#[tokio::test]
async fn verifies_by_description_ignoring_case() {
    let mut runner = user_runner();
    runner.with_interaction_description("CREATE USER");
    let report = runner.run().await.unwrap();
    assert_eq!(report.description, "create user");
    assert_eq!(report.status, Some(201));
}

#[tokio::test]
async fn repeated_query_values_and_unordered_arrays_verify() {
    let mut runner = user_runner();
    runner.with_provider_state("users exist");
    assert!(runner.run().await.is_ok());
}

#[tokio::test]
async fn cookies_reach_the_router() {
    let mut runner = user_runner();
    runner.with_provider_state("logged in");
    assert!(runner.run().await.is_ok());
}

#[tokio::test]
async fn declared_error_status_verifies() {
    let mut runner = user_runner();
    runner.with_provider_state("user 9 missing");
    assert_eq!(runner.run().await.unwrap().status, Some(404));
}

#[tokio::test]
async fn missing_selector_fails() {
    let mut runner = user_runner();
    assert_eq!(runner.run().await, Err(VerificationError::MissingSelector));
}

#[tokio::test]
async fn unknown_state_fails_with_no_match() {
    let mut runner = user_runner();
    runner.with_provider_state("nobody home");
    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, VerificationError::NoMatchingInteraction(ref text) if text.contains("nobody home")));
}

#[tokio::test]
async fn consumer_filter_restricts_selection() {
    let mut runner = PactTestRunner::new(vec![common::user_pact(), common::mobile_pact()]);
    runner.with_target(common::user_router()).with_provider_state("user 1 exists").for_consumer("mobile");
    let report = runner.run().await.unwrap();
    assert_eq!(report.consumer, "mobile");
    assert_eq!(report.expectations_checked, 2);
    runner.for_provider("orders");
    assert!(matches!(runner.run().await, Err(VerificationError::NoMatchingInteraction(_))));
}

#[tokio::test]
async fn message_interactions_are_skipped() {
    let mut runner = PactTestRunner::new(vec![common::user_pact()]);
    runner.with_provider_state("user created");
    let report = runner.run().await.unwrap();
    assert!(report.is_skipped());
    assert_eq!(report.status, None);
}

#[tokio::test]
async fn missing_target_fails() {
    let mut runner = PactTestRunner::new(vec![common::user_pact()]);
    runner.with_provider_state("user 1 exists");
    assert_eq!(runner.run().await, Err(VerificationError::MissingTarget));
}

#[tokio::test]
async fn mismatches_are_collected() {
    let router = Router::new().route("/users/{id}", get(|| async { "not json" }));
    let mut runner = PactTestRunner::new(vec![common::user_pact()]);
    runner
        .with_target(router)
        .with_provider_state("user 1 exists")
        .add_result_matcher(StatusMatcher {
            expected: 418,
        });
    let Err(VerificationError::Mismatch {
        description,
        failures,
    }) = runner.run().await
    else {
        panic!("expected mismatch");
    };
    assert_eq!(description, "get user");
    // body is not JSON, content type differs, extra status matcher fails.
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().any(|failure| failure.expectation == "status 418"));
}

#[tokio::test]
async fn request_callback_can_rewrite_the_request() {
    let mut runner = user_runner();
    runner.with_provider_state("user 9 missing").with_request_callback(|request| {
        request.path = "/users/1".to_string();
    });
    let err = runner.run().await.unwrap_err();
    let VerificationError::Mismatch {
        failures, ..
    } = err
    else {
        panic!("expected mismatch");
    };
    assert_eq!(failures[0].expectation, "status 404");
}

#[tokio::test]
async fn response_callback_observes_the_response() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let mut runner = user_runner();
    runner.with_provider_state("user 1 exists").with_response_callback(move |response| {
        *sink.lock().unwrap() = response.json().ok();
    });
    runner.run().await.unwrap();
    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn extra_matchers_run_after_declared_ones() {
    let mut runner = user_runner();
    runner.with_provider_state("user 1 exists").add_result_matcher(FnMatcher::new(
        "has email",
        |response: &pact_harness::MockResponse| {
            let body = response.json().map_err(|err| err.to_string())?;
            if body.get("email").is_some() { Ok(()) } else { Err("no email".to_string()) }
        },
    ));
    assert_eq!(runner.result_matcher_count(), 1);
    assert_eq!(runner.run().await.unwrap().expectations_checked, 4);
}

#[tokio::test]
async fn context_path_is_stripped_before_dispatch() {
    let router = Router::new().route(
        "/users/{id}",
        get(|Extension(context): Extension<ContextPath>| async move {
            axum::Json(serde_json::json!({"id": 1, "name": "Ada", "mount": context.0}))
        }),
    );
    let mut runner = PactTestRunner::new(vec![common::user_pact()]);
    runner
        .with_target(router)
        .with_context_path("/api")
        .with_provider_state("user 1 exists")
        .with_request_callback(|request| {
            request.path = format!("/api{}", request.path);
        });
    let report = runner.run().await.unwrap();
    assert_eq!(report.path.as_deref(), Some("/api/users/1"));
}

#[tokio::test]
async fn context_path_not_prefixing_path_fails() {
    let mut runner = user_runner();
    runner.with_context_path("/api").with_provider_state("user 1 exists");
    assert!(matches!(
        runner.run().await,
        Err(VerificationError::Request(RequestBuildError::ContextPath(_)))
    ));
}

#[tokio::test]
async fn oversized_response_bodies_fail() {
    let mut runner = user_runner();
    runner.with_provider_state("user 1 exists").with_max_response_bytes(4);
    assert!(matches!(runner.run().await, Err(VerificationError::ResponseBody(_))));
}

#[tokio::test]
async fn every_run_is_audited() {
    let audit = Arc::new(common::RecordingAuditSink::default());
    let mut runner = user_runner();
    runner.with_audit_sink(audit.clone()).with_provider_state("user 1 exists");
    runner.run().await.unwrap();
    runner.clear_selection().with_provider_state("nobody home");
    runner.run().await.unwrap_err();
    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].outcome, VerificationOutcome::Verified);
    assert_eq!(events[0].method, Some("GET"));
    assert_eq!(events[0].path.as_deref(), Some("/users/1"));
    assert_eq!(events[0].status, Some(200));
    assert_eq!(events[1].outcome, VerificationOutcome::Failed);
    assert_eq!(events[1].error_kind, Some("no_matching_interaction"));
    assert_eq!(events[1].provider_state.as_deref(), Some("nobody home"));
}
