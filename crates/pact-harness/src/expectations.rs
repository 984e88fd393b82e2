// crates/pact-harness/src/expectations.rs
// ============================================================================
// Module: Response Expectations
// Description: Matchers derived from a pact's declared response.
// Purpose: Check an observed response against what the consumer expects.
// Dependencies: serde_json, pact-harness-model
// ============================================================================

//! ## Overview
//! A [`ResponseMatcher`] checks one property of a [`MockResponse`]. The
//! declared response of an interaction yields, in order:
//! - a status matcher,
//! - a body matcher when a body is declared (lenient JSON when the body is
//!   JSON or JSON text, exact text otherwise),
//! - one header matcher per declared header.
//!
//! Additional matchers may be supplied by callers; all matchers of a run are
//! evaluated and their failures reported together.

// ============================================================================
// SECTION: Imports
// ============================================================================

use pact_harness_model::Body;
use pact_harness_model::Interaction;
use pact_harness_model::Response;
use serde_json::Value;

use crate::error::MatchFailure;
use crate::json_compare::lenient_mismatches;
use crate::response::MockResponse;

// ============================================================================
// SECTION: Matcher Trait
// ============================================================================

/// A single check applied to an observed response.
pub trait ResponseMatcher: Send + Sync {
    /// Describes the expectation for failure reports.
    fn describe(&self) -> String;

    /// Checks the response.
    ///
    /// # Errors
    ///
    /// Returns a [`MatchFailure`] describing what was observed instead.
    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure>;
}

// ============================================================================
// SECTION: Built-in Matchers
// ============================================================================

/// Expects an exact status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMatcher {
    /// Expected status.
    pub expected: u16,
}

impl ResponseMatcher for StatusMatcher {
    fn describe(&self) -> String {
        format!("status {}", self.expected)
    }

    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure> {
        let actual = response.status().as_u16();
        if actual == self.expected {
            Ok(())
        } else {
            Err(MatchFailure::new(self.describe(), format!("was {actual}")))
        }
    }
}

/// Expects a JSON body that leniently matches.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBodyMatcher {
    /// Expected JSON document.
    pub expected: Value,
}

impl ResponseMatcher for JsonBodyMatcher {
    fn describe(&self) -> String {
        "json body".to_string()
    }

    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure> {
        let actual = response
            .json()
            .map_err(|err| MatchFailure::new(self.describe(), format!("body is not JSON: {err}")))?;
        let mismatches = lenient_mismatches(&self.expected, &actual);
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(MatchFailure::new(self.describe(), mismatches.join(", ")))
        }
    }
}

/// Expects an exact text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBodyMatcher {
    /// Expected text.
    pub expected: String,
}

impl ResponseMatcher for TextBodyMatcher {
    fn describe(&self) -> String {
        "text body".to_string()
    }

    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure> {
        match response.text() {
            Some(actual) if actual == self.expected => Ok(()),
            Some(actual) => Err(MatchFailure::new(
                self.describe(),
                format!("expected '{}' but was '{actual}'", self.expected),
            )),
            None => Err(MatchFailure::new(self.describe(), "body is not UTF-8")),
        }
    }
}

/// Expects a header with an exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatcher {
    /// Header name, compared case-insensitively.
    pub name: String,
    /// Expected header value.
    pub expected: String,
}

impl ResponseMatcher for HeaderMatcher {
    fn describe(&self) -> String {
        format!("header {}", self.name)
    }

    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure> {
        match response.header(&self.name) {
            Some(actual) if actual == self.expected => Ok(()),
            Some(actual) => Err(MatchFailure::new(
                self.describe(),
                format!("expected '{}' but was '{actual}'", self.expected),
            )),
            None => Err(MatchFailure::new(self.describe(), "missing")),
        }
    }
}

/// Closure-backed matcher for ad-hoc expectations.
pub struct FnMatcher<F> {
    /// Expectation description.
    description: String,
    /// Check returning a failure message.
    check: F,
}

impl<F> FnMatcher<F>
where
    F: Fn(&MockResponse) -> Result<(), String> + Send + Sync,
{
    /// Creates a matcher from a description and a check.
    #[must_use]
    pub fn new(description: impl Into<String>, check: F) -> Self {
        Self {
            description: description.into(),
            check,
        }
    }
}

impl<F> ResponseMatcher for FnMatcher<F>
where
    F: Fn(&MockResponse) -> Result<(), String> + Send + Sync,
{
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn check(&self, response: &MockResponse) -> Result<(), MatchFailure> {
        (self.check)(response).map_err(|message| MatchFailure::new(self.describe(), message))
    }
}

// ============================================================================
// SECTION: Derivation
// ============================================================================

/// Derives the matchers for an interaction's declared response.
///
/// Message interactions and interactions without a response yield none.
#[must_use]
pub fn response_matchers(interaction: &Interaction) -> Vec<Box<dyn ResponseMatcher>> {
    interaction
        .as_request_response()
        .and_then(|interaction| interaction.response.as_ref())
        .map_or_else(Vec::new, response_matchers_for)
}

/// Derives the matchers for a declared response.
#[must_use]
pub fn response_matchers_for(response: &Response) -> Vec<Box<dyn ResponseMatcher>> {
    let mut matchers: Vec<Box<dyn ResponseMatcher>> = vec![Box::new(StatusMatcher {
        expected: response.status,
    })];
    if let Some(matcher) = body_matcher(&response.body) {
        matchers.push(matcher);
    }
    for (name, value) in response.headers.iter() {
        matchers.push(Box::new(HeaderMatcher {
            name: name.to_string(),
            expected: value.to_string(),
        }));
    }
    matchers
}

/// Chooses the body matcher for a declared body.
fn body_matcher(body: &Body) -> Option<Box<dyn ResponseMatcher>> {
    let value = body.value()?;
    let matcher: Box<dyn ResponseMatcher> = match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(expected) => Box::new(JsonBodyMatcher {
                expected,
            }),
            Err(_) => Box::new(TextBodyMatcher {
                expected: text.clone(),
            }),
        },
        other => Box::new(JsonBodyMatcher {
            expected: other.clone(),
        }),
    };
    Some(matcher)
}
