// crates/pact-harness/src/runner.rs
// ============================================================================
// Module: Pact Test Runner
// Description: Replays one selected interaction against an axum router.
// Purpose: Verify a provider's response against a consumer's contract.
// Dependencies: axum, tower, pact-harness-model
// ============================================================================

//! ## Overview
//! A [`PactTestRunner`] is configured by a test (selection, router, context
//! path, callbacks, extra matchers) and then [`run`](PactTestRunner::run)
//! once. A run:
//! 1. requires a provider state or an interaction description,
//! 2. selects the first matching interaction of the pacts that pass the
//!    consumer/provider filter,
//! 3. builds the request, applies the context path and the request callback,
//! 4. dispatches it in-process with `tower::ServiceExt::oneshot`,
//! 5. hands the collected response to the response callback,
//! 6. evaluates declared and extra matchers, reporting every failure at once.
//!
//! Message interactions are reported as skipped without dispatching. Every
//! run records one audit event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use pact_harness_config::DEFAULT_MAX_RESPONSE_BYTES;
use pact_harness_model::InteractionSelector;
use pact_harness_model::Pact;
use pact_harness_model::PactFilter;
use pact_harness_model::first_interaction;
use tower::ServiceExt;

use crate::audit::NoopAuditSink;
use crate::audit::VerificationAuditEvent;
use crate::audit::VerificationAuditEventParams;
use crate::audit::VerificationAuditSink;
use crate::audit::VerificationOutcome;
use crate::error::MatchFailure;
use crate::error::VerificationError;
use crate::expectations::ResponseMatcher;
use crate::expectations::response_matchers;
use crate::request::HttpVerb;
use crate::request::MockRequest;
use crate::request::build_request;
use crate::response::MockResponse;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Callback that may adjust the request before dispatch.
pub type RequestCallback = Box<dyn FnMut(&mut MockRequest) + Send>;

/// Callback that observes the collected response.
pub type ResponseCallback = Box<dyn FnMut(&MockResponse) + Send>;

/// Summary of a successful or skipped run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Consumer of the verified pact.
    pub consumer: String,
    /// Provider of the verified pact.
    pub provider: String,
    /// Description of the verified interaction.
    pub description: String,
    /// First provider state of the verified interaction.
    pub provider_state: Option<String>,
    /// Dispatched verb; `None` when skipped.
    pub method: Option<HttpVerb>,
    /// Dispatched path; `None` when skipped.
    pub path: Option<String>,
    /// Observed status; `None` when skipped.
    pub status: Option<u16>,
    /// Number of matchers evaluated.
    pub expectations_checked: usize,
    /// Verified or skipped.
    pub outcome: VerificationOutcome,
}

impl VerificationReport {
    /// Returns true when the interaction was not dispatched.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.outcome, VerificationOutcome::Skipped)
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Configurable single-interaction verifier.
pub struct PactTestRunner {
    /// Loaded pacts, in selection order.
    pacts: Vec<Pact>,
    /// Consumer/provider restriction.
    filter: PactFilter,
    /// Provider state and description selection.
    selector: InteractionSelector,
    /// Router under test.
    target: Option<Router>,
    /// Context path the router is mounted under.
    context_path: Option<String>,
    /// Request adjustment hook.
    request_callback: Option<RequestCallback>,
    /// Response observation hook.
    response_callback: Option<ResponseCallback>,
    /// Matchers evaluated after the declared ones.
    result_matchers: Vec<Box<dyn ResponseMatcher>>,
    /// Audit destination.
    audit: Arc<dyn VerificationAuditSink>,
    /// Response body limit in bytes.
    max_response_bytes: usize,
}

impl PactTestRunner {
    /// Creates a runner over the given pacts.
    #[must_use]
    pub fn new(pacts: Vec<Pact>) -> Self {
        Self {
            pacts,
            filter: PactFilter::default(),
            selector: InteractionSelector::default(),
            target: None,
            context_path: None,
            request_callback: None,
            response_callback: None,
            result_matchers: Vec::new(),
            audit: Arc::new(NoopAuditSink),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Restricts selection to pacts of a consumer.
    pub fn for_consumer(&mut self, consumer: impl Into<String>) -> &mut Self {
        self.filter.consumer = Some(consumer.into());
        self
    }

    /// Restricts selection to pacts of a provider.
    pub fn for_provider(&mut self, provider: impl Into<String>) -> &mut Self {
        self.filter.provider = Some(provider.into());
        self
    }

    /// Selects interactions by provider state.
    pub fn with_provider_state(&mut self, provider_state: impl Into<String>) -> &mut Self {
        self.selector.provider_state = Some(provider_state.into());
        self
    }

    /// Selects interactions by description.
    pub fn with_interaction_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.selector.description = Some(description.into());
        self
    }

    /// Clears the consumer/provider filter and the state/description selection.
    pub fn clear_selection(&mut self) -> &mut Self {
        self.filter = PactFilter::default();
        self.selector = InteractionSelector::default();
        self
    }

    /// Sets the router requests are dispatched to.
    pub fn with_target(&mut self, target: Router) -> &mut Self {
        self.target = Some(target);
        self
    }

    /// Sets the context path stripped from request paths.
    pub fn with_context_path(&mut self, context_path: impl Into<String>) -> &mut Self {
        self.context_path = Some(context_path.into());
        self
    }

    /// Sets the callback invoked on the request before dispatch.
    pub fn with_request_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut MockRequest) + Send + 'static,
    {
        self.request_callback = Some(Box::new(callback));
        self
    }

    /// Sets the callback invoked on the collected response.
    pub fn with_response_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&MockResponse) + Send + 'static,
    {
        self.response_callback = Some(Box::new(callback));
        self
    }

    /// Adds a matcher evaluated after the declared ones.
    pub fn add_result_matcher<M>(&mut self, matcher: M) -> &mut Self
    where
        M: ResponseMatcher + 'static,
    {
        self.result_matchers.push(Box::new(matcher));
        self
    }

    /// Sets the audit sink.
    pub fn with_audit_sink(&mut self, audit: Arc<dyn VerificationAuditSink>) -> &mut Self {
        self.audit = audit;
        self
    }

    /// Sets the response body limit.
    pub const fn with_max_response_bytes(&mut self, max_response_bytes: usize) -> &mut Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    /// Returns the loaded pacts.
    #[must_use]
    pub fn pacts(&self) -> &[Pact] {
        &self.pacts
    }

    /// Returns the consumer restriction.
    #[must_use]
    pub fn consumer(&self) -> Option<&str> {
        self.filter.consumer.as_deref()
    }

    /// Returns the provider restriction.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.filter.provider.as_deref()
    }

    /// Returns the selected provider state.
    #[must_use]
    pub fn provider_state(&self) -> Option<&str> {
        self.selector.provider_state.as_deref()
    }

    /// Returns the selected interaction description.
    #[must_use]
    pub fn interaction_description(&self) -> Option<&str> {
        self.selector.description.as_deref()
    }

    /// Returns the context path.
    #[must_use]
    pub fn context_path(&self) -> Option<&str> {
        self.context_path.as_deref()
    }

    /// Returns the router under test.
    #[must_use]
    pub const fn target(&self) -> Option<&Router> {
        self.target.as_ref()
    }

    /// Returns the number of extra matchers.
    #[must_use]
    pub fn result_matcher_count(&self) -> usize {
        self.result_matchers.len()
    }

    /// Returns the response body limit.
    #[must_use]
    pub const fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// Verifies the selected interaction and records an audit event.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] when selection, request translation,
    /// dispatch, or any response expectation fails.
    pub async fn run(&mut self) -> Result<VerificationReport, VerificationError> {
        let mut trace = VerificationAuditEventParams {
            provider_state: self.selector.provider_state.clone(),
            description: self.selector.description.clone(),
            ..VerificationAuditEventParams::default()
        };
        let result = self.execute(&mut trace).await;
        let event = match &result {
            Ok(report) => VerificationAuditEvent::new(trace, report.outcome, None, Vec::new()),
            Err(err) => VerificationAuditEvent::new(
                trace,
                VerificationOutcome::Failed,
                Some(err.kind()),
                failure_messages(err),
            ),
        };
        self.audit.record(&event);
        result
    }

    /// Performs the run, filling `trace` as stages complete.
    async fn execute(
        &mut self,
        trace: &mut VerificationAuditEventParams,
    ) -> Result<VerificationReport, VerificationError> {
        if self.selector.is_unbounded() {
            return Err(VerificationError::MissingSelector);
        }
        let (consumer, provider, interaction) = {
            let candidates = self.pacts.iter().filter(|pact| self.filter.matches(pact));
            let selected = first_interaction(candidates, &self.selector)
                .ok_or_else(|| VerificationError::NoMatchingInteraction(self.describe_selection()))?;
            (
                selected.pact.consumer.name.clone(),
                selected.pact.provider.name.clone(),
                selected.interaction.clone(),
            )
        };
        trace.consumer = Some(consumer.clone());
        trace.provider = Some(provider.clone());
        let mut report = VerificationReport {
            consumer,
            provider,
            description: interaction.description().to_string(),
            provider_state: interaction.provider_state().map(str::to_string),
            method: None,
            path: None,
            status: None,
            expectations_checked: 0,
            outcome: VerificationOutcome::Skipped,
        };

        let Some(mut request) = build_request(&interaction)? else {
            return Ok(report);
        };
        request.context_path.clone_from(&self.context_path);
        if let Some(callback) = self.request_callback.as_mut() {
            callback(&mut request);
        }
        trace.method = Some(request.verb.as_str());
        trace.path = Some(request.path.clone());
        report.method = Some(request.verb);
        report.path = Some(request.path.clone());

        let target = self.target.clone().ok_or(VerificationError::MissingTarget)?;
        let http_request = request.into_http()?;
        let response = target.oneshot(http_request).await.unwrap_or_else(|never| match never {});
        let response = MockResponse::collect(response, self.max_response_bytes).await?;
        trace.status = Some(response.status().as_u16());
        report.status = Some(response.status().as_u16());
        if let Some(callback) = self.response_callback.as_mut() {
            callback(&response);
        }

        let declared = response_matchers(&interaction);
        let failures: Vec<MatchFailure> = declared
            .iter()
            .chain(self.result_matchers.iter())
            .filter_map(|matcher| matcher.check(&response).err())
            .collect();
        if !failures.is_empty() {
            return Err(VerificationError::Mismatch {
                description: report.description,
                failures,
            });
        }
        report.expectations_checked = declared.len() + self.result_matchers.len();
        report.outcome = VerificationOutcome::Verified;
        Ok(report)
    }

    /// Describes the active filter and selector for error messages.
    fn describe_selection(&self) -> String {
        let mut parts = Vec::new();
        if let Some(state) = &self.selector.provider_state {
            parts.push(format!("provider state '{state}'"));
        }
        if let Some(description) = &self.selector.description {
            parts.push(format!("description '{description}'"));
        }
        if let Some(consumer) = &self.filter.consumer {
            parts.push(format!("consumer '{consumer}'"));
        }
        if let Some(provider) = &self.filter.provider {
            parts.push(format!("provider '{provider}'"));
        }
        parts.join(", ")
    }
}

/// Flattens an error into audit failure messages.
fn failure_messages(err: &VerificationError) -> Vec<String> {
    match err {
        VerificationError::Mismatch {
            failures, ..
        } => failures.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    }
}
