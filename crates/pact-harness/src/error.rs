// crates/pact-harness/src/error.rs
// ============================================================================
// Module: Verification Errors
// Description: Error types for request translation and verification runs.
// Purpose: Report why an interaction could not be replayed or verified.
// Dependencies: pact-harness-config, pact-harness-model, thiserror
// ============================================================================

//! ## Overview
//! Two layers of errors are exposed:
//! - [`RequestBuildError`] for interactions that cannot be turned into an
//!   in-process HTTP request.
//! - [`VerificationError`] for everything a run can fail on, including every
//!   response expectation that did not hold.
//!
//! [`HarnessError`] covers harness construction from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use pact_harness_config::ConfigError;
use pact_harness_model::PactError;
use thiserror::Error;

// ============================================================================
// SECTION: Request Errors
// ============================================================================

/// Errors raised while translating an interaction into an HTTP request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestBuildError {
    /// The declared method is absent or not one of the supported verbs.
    #[error("unsupported request method: {0}")]
    UnsupportedMethod(String),
    /// The path or query cannot form a valid request URI.
    #[error("invalid request uri: {0}")]
    InvalidUri(String),
    /// A header name or value is not valid HTTP.
    #[error("invalid request header {name}: {message}")]
    InvalidHeader {
        /// Offending header name.
        name: String,
        /// Failure detail.
        message: String,
    },
    /// The context path is malformed or does not prefix the request path.
    #[error("context path error: {0}")]
    ContextPath(String),
    /// A request/response interaction declares no request.
    #[error("interaction '{0}' declares no request")]
    MissingRequest(String),
}

// ============================================================================
// SECTION: Match Failures
// ============================================================================

/// A single response expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    /// Description of the expectation.
    pub expectation: String,
    /// What was observed instead.
    pub message: String,
}

impl MatchFailure {
    /// Creates a failure for an expectation.
    #[must_use]
    pub fn new(expectation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expectation: expectation.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.expectation, self.message)
    }
}

// ============================================================================
// SECTION: Verification Errors
// ============================================================================

/// Errors raised by a verification run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Neither a provider state nor a description was configured.
    #[error("a provider state or interaction description is required")]
    MissingSelector,
    /// No loaded interaction matches the selection.
    #[error("no interaction matches {0}")]
    NoMatchingInteraction(String),
    /// No router was configured for an interaction that needs one.
    #[error("no target router configured")]
    MissingTarget,
    /// The interaction could not be translated into a request.
    #[error(transparent)]
    Request(#[from] RequestBuildError),
    /// The response body could not be collected.
    #[error("failed to read response body: {0}")]
    ResponseBody(String),
    /// One or more response expectations failed.
    #[error("interaction '{description}' failed: {}", join_failures(.failures))]
    Mismatch {
        /// Description of the verified interaction.
        description: String,
        /// Every failed expectation, in evaluation order.
        failures: Vec<MatchFailure>,
    },
}

impl VerificationError {
    /// Returns a stable label for audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingSelector => "missing_selector",
            Self::NoMatchingInteraction(_) => "no_matching_interaction",
            Self::MissingTarget => "missing_target",
            Self::Request(_) => "request",
            Self::ResponseBody(_) => "response_body",
            Self::Mismatch {
                ..
            } => "mismatch",
        }
    }
}

/// Joins failures into a single line prefixed with their count.
fn join_failures(failures: &[MatchFailure]) -> String {
    let joined = failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
    format!("{} expectation(s): {joined}", failures.len())
}

// ============================================================================
// SECTION: Harness Errors
// ============================================================================

/// Errors raised while assembling a harness.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A pact source failed to load.
    #[error(transparent)]
    Pact(#[from] PactError),
    /// The audit sink could not be opened.
    #[error("audit sink error: {0}")]
    Audit(String),
}
