// crates/pact-harness/src/lib.rs
// ============================================================================
// Module: Pact Harness
// Description: Provider-side pact verification against in-process routers.
// Purpose: Replay consumer contracts against an axum router inside tests.
// Dependencies: axum, bytes, pact-harness-config, pact-harness-model, tower
// ============================================================================

//! ## Overview
//! `pact-harness` verifies a provider against consumer pacts without a
//! network: the selected interaction's request is translated into an
//! `axum` request, dispatched to the router under test with
//! `tower::ServiceExt::oneshot`, and the collected response is checked
//! against the declared response.
//!
//! Entry points:
//! - [`PactHarness`] owns the pact set and the per-test callback lifecycle.
//! - [`PactTestRunner`] verifies a single interaction.
//! - [`build_request`] and [`response_matchers`] expose the translation steps
//!   on their own.
//!
//! Security posture: pact documents and configuration are untrusted input;
//! loading is size-limited and resource locations cannot escape their root.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod error;
pub mod expectations;
pub mod harness;
pub mod json_compare;
pub mod request;
pub mod response;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::VerificationAuditEvent;
pub use audit::VerificationAuditEventParams;
pub use audit::VerificationAuditSink;
pub use audit::VerificationOutcome;
pub use audit::audit_sink_from_config;
pub use error::HarnessError;
pub use error::MatchFailure;
pub use error::RequestBuildError;
pub use error::VerificationError;
pub use expectations::FnMatcher;
pub use expectations::HeaderMatcher;
pub use expectations::JsonBodyMatcher;
pub use expectations::ResponseMatcher;
pub use expectations::StatusMatcher;
pub use expectations::TextBodyMatcher;
pub use expectations::response_matchers;
pub use expectations::response_matchers_for;
pub use harness::LifecycleCallback;
pub use harness::PactHarness;
pub use harness::PactHarnessBuilder;
pub use harness::VerificationDefaults;
pub use json_compare::lenient_matches;
pub use json_compare::lenient_mismatches;
pub use request::ContextPath;
pub use request::HttpVerb;
pub use request::MockRequest;
pub use request::RequestCookie;
pub use request::build_request;
pub use request::build_request_from;
pub use request::strip_context_path;
pub use response::MockResponse;
pub use runner::PactTestRunner;
pub use runner::RequestCallback;
pub use runner::ResponseCallback;
pub use runner::VerificationReport;
