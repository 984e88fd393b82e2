// crates/pact-harness/src/harness.rs
// ============================================================================
// Module: Pact Harness
// Description: Pact loading, callbacks, and per-test verification lifecycle.
// Purpose: Give each test a fresh runner over a shared, filtered pact set.
// Dependencies: pact-harness-config, pact-harness-model
// ============================================================================

//! ## Overview
//! [`PactHarness`] is assembled once, through [`PactHarnessBuilder`] or from a
//! [`HarnessConfig`], and then drives any number of verifications. Each
//! [`verify`](PactHarness::verify) call:
//! 1. creates a fresh [`PactTestRunner`] with the harness defaults,
//! 2. runs the before callbacks,
//! 3. lets the test configure the runner,
//! 4. fills an unset provider state or description from
//!    [`VerificationDefaults`],
//! 5. runs the verification,
//! 6. runs the after callbacks, also when the run fails or the test panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use pact_harness_config::DEFAULT_MAX_RESPONSE_BYTES;
use pact_harness_config::HarnessConfig;
use pact_harness_model::DEFAULT_MAX_PACT_BYTES;
use pact_harness_model::Pact;
use pact_harness_model::PactError;
use pact_harness_model::PactFilter;
use pact_harness_model::ResourceLoader;

use crate::audit::NoopAuditSink;
use crate::audit::VerificationAuditSink;
use crate::audit::audit_sink_from_config;
use crate::error::HarnessError;
use crate::error::VerificationError;
use crate::runner::PactTestRunner;
use crate::runner::VerificationReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Callback run around each verification.
pub type LifecycleCallback = Box<dyn Fn() + Send + Sync>;

/// Per-verification selection used when the test leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationDefaults {
    /// Default provider state.
    pub provider_state: Option<String>,
    /// Default interaction description.
    pub interaction_description: Option<String>,
}

impl VerificationDefaults {
    /// Defaults selecting a provider state.
    #[must_use]
    pub fn for_state(provider_state: impl Into<String>) -> Self {
        Self {
            provider_state: Some(provider_state.into()),
            interaction_description: None,
        }
    }

    /// Adds a default interaction description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.interaction_description = Some(description.into());
        self
    }
}

/// Runs after callbacks when dropped.
struct AfterCallbacks<'a>(&'a [LifecycleCallback]);

impl Drop for AfterCallbacks<'_> {
    fn drop(&mut self) {
        for callback in self.0 {
            callback();
        }
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Shared pact set and lifecycle hooks for a group of verifications.
pub struct PactHarness {
    /// Filtered, deduplicated pacts.
    pacts: Vec<Pact>,
    /// Callbacks run before each verification.
    before_callbacks: Vec<LifecycleCallback>,
    /// Callbacks run after each verification.
    after_callbacks: Vec<LifecycleCallback>,
    /// Audit sink handed to each runner.
    audit: Arc<dyn VerificationAuditSink>,
    /// Context path handed to each runner.
    context_path: Option<String>,
    /// Response body limit handed to each runner.
    max_response_bytes: usize,
}

impl PactHarness {
    /// Starts a harness builder.
    #[must_use]
    pub fn builder() -> PactHarnessBuilder {
        PactHarnessBuilder::default()
    }

    /// Builds a harness from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the configuration is invalid, a pact
    /// source fails to load, or the audit sink cannot be opened.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let mut builder = Self::builder().with_max_pact_bytes(config.pacts.max_pact_bytes);
        if let Some(root) = &config.pacts.resource_root {
            builder = builder.with_resource_root(root);
        }
        for location in &config.pacts.files {
            builder = builder.with_file(location)?;
        }
        for folder in &config.pacts.folders {
            builder = builder.with_folder(&folder.location, folder.recursive)?;
        }
        if let Some(consumer) = &config.filter.consumer {
            builder = builder.for_consumer(consumer);
        }
        if let Some(provider) = &config.filter.provider {
            builder = builder.for_provider(provider);
        }
        if let Some(context_path) = &config.request.context_path {
            builder = builder.with_context_path(context_path);
        }
        let audit =
            audit_sink_from_config(&config.audit).map_err(|err| HarnessError::Audit(err.to_string()))?;
        Ok(builder
            .with_max_response_bytes(config.request.max_response_bytes)
            .with_audit_sink(audit)
            .build())
    }

    /// Returns the pacts verifications select from.
    #[must_use]
    pub fn pacts(&self) -> &[Pact] {
        &self.pacts
    }

    /// Returns the context path handed to runners.
    #[must_use]
    pub fn context_path(&self) -> Option<&str> {
        self.context_path.as_deref()
    }

    /// Returns the response body limit handed to runners.
    #[must_use]
    pub const fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// Adds a callback run before each verification.
    pub fn add_before_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.before_callbacks.push(Box::new(callback));
    }

    /// Adds a callback run after each verification.
    pub fn add_after_callback<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_callbacks.push(Box::new(callback));
    }

    /// Creates a fresh runner carrying the harness defaults.
    #[must_use]
    pub fn runner(&self) -> PactTestRunner {
        let mut runner = PactTestRunner::new(self.pacts.clone());
        runner.with_audit_sink(Arc::clone(&self.audit)).with_max_response_bytes(self.max_response_bytes);
        if let Some(context_path) = &self.context_path {
            runner.with_context_path(context_path.clone());
        }
        runner
    }

    /// Runs one verification through the full callback lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] from the run; after callbacks still run.
    pub async fn verify<F>(
        &self,
        defaults: &VerificationDefaults,
        configure: F,
    ) -> Result<VerificationReport, VerificationError>
    where
        F: FnOnce(&mut PactTestRunner),
    {
        let mut runner = self.runner();
        for callback in &self.before_callbacks {
            callback();
        }
        let _after = AfterCallbacks(&self.after_callbacks);
        configure(&mut runner);
        if runner.provider_state().is_none()
            && let Some(provider_state) = &defaults.provider_state
        {
            runner.with_provider_state(provider_state.clone());
        }
        if runner.interaction_description().is_none()
            && let Some(description) = &defaults.interaction_description
        {
            runner.with_interaction_description(description.clone());
        }
        runner.run().await
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder collecting pacts and hooks for a [`PactHarness`].
pub struct PactHarnessBuilder {
    /// Collected pacts, before filtering.
    pacts: Vec<Pact>,
    /// Consumer/provider filter applied at build time.
    filter: PactFilter,
    /// Root for `resource:` locations.
    resource_root: Option<PathBuf>,
    /// Pact document size limit.
    max_pact_bytes: usize,
    /// Callbacks run before each verification.
    before_callbacks: Vec<LifecycleCallback>,
    /// Callbacks run after each verification.
    after_callbacks: Vec<LifecycleCallback>,
    /// Audit sink; defaults to no-op.
    audit: Option<Arc<dyn VerificationAuditSink>>,
    /// Context path for every runner.
    context_path: Option<String>,
    /// Response body limit for every runner.
    max_response_bytes: usize,
}

impl Default for PactHarnessBuilder {
    fn default() -> Self {
        Self {
            pacts: Vec::new(),
            filter: PactFilter::default(),
            resource_root: None,
            max_pact_bytes: DEFAULT_MAX_PACT_BYTES,
            before_callbacks: Vec::new(),
            after_callbacks: Vec::new(),
            audit: None,
            context_path: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl PactHarnessBuilder {
    /// Sets the root for `resource:` locations.
    #[must_use]
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Sets the pact document size limit for subsequent loads.
    #[must_use]
    pub const fn with_max_pact_bytes(mut self, max_pact_bytes: usize) -> Self {
        self.max_pact_bytes = max_pact_bytes;
        self
    }

    /// Loads one pact from a resource location.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the pact is missing or invalid.
    pub fn with_file(mut self, location: &str) -> Result<Self, PactError> {
        let pact = self.loader().load_pact_by_resource(location)?;
        self.pacts.push(pact);
        Ok(self)
    }

    /// Loads every pact below a resource folder, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when a pact in the folder is invalid.
    pub fn with_all_from(self, location: &str) -> Result<Self, PactError> {
        self.with_folder(location, true)
    }

    /// Loads every pact in a resource folder.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when a pact in the folder is invalid.
    pub fn with_folder(mut self, location: &str, recursive: bool) -> Result<Self, PactError> {
        let pacts = self.loader().load_pacts_by_resource_folder(location, recursive)?;
        self.pacts.extend(pacts);
        Ok(self)
    }

    /// Loads every pact below a filesystem path, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when a pact below the path is invalid.
    pub fn with_all_from_path(mut self, path: impl AsRef<Path>) -> Result<Self, PactError> {
        let pacts = self.loader().load_pacts_by_file(path.as_ref(), true)?;
        self.pacts.extend(pacts);
        Ok(self)
    }

    /// Loads one pact from inline JSON or a resource location.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the source is missing or invalid.
    pub fn with_pact_source(mut self, source: &str) -> Result<Self, PactError> {
        let pact = self.loader().load_pact_generic(source)?;
        self.pacts.push(pact);
        Ok(self)
    }

    /// Adds an already loaded pact.
    #[must_use]
    pub fn with_pact(mut self, pact: Pact) -> Self {
        self.pacts.push(pact);
        self
    }

    /// Keeps only pacts of a consumer.
    #[must_use]
    pub fn for_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.filter.consumer = Some(consumer.into());
        self
    }

    /// Keeps only pacts of a provider.
    #[must_use]
    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.filter.provider = Some(provider.into());
        self
    }

    /// Adds a callback run before each verification.
    #[must_use]
    pub fn with_before_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.before_callbacks.push(Box::new(callback));
        self
    }

    /// Adds a callback run after each verification.
    #[must_use]
    pub fn with_after_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_callbacks.push(Box::new(callback));
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn VerificationAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Sets the context path for every runner.
    #[must_use]
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = Some(context_path.into());
        self
    }

    /// Sets the response body limit for every runner.
    #[must_use]
    pub const fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    /// Filters and deduplicates the collected pacts.
    #[must_use]
    pub fn build(self) -> PactHarness {
        let mut pacts: Vec<Pact> = Vec::new();
        for pact in self.filter.apply(self.pacts) {
            if !pacts.contains(&pact) {
                pacts.push(pact);
            }
        }
        let audit: Arc<dyn VerificationAuditSink> = match self.audit {
            Some(audit) => audit,
            None => Arc::new(NoopAuditSink),
        };
        PactHarness {
            pacts,
            before_callbacks: self.before_callbacks,
            after_callbacks: self.after_callbacks,
            audit,
            context_path: self.context_path,
            max_response_bytes: self.max_response_bytes,
        }
    }

    /// Returns a loader for the current root and size limit.
    fn loader(&self) -> ResourceLoader {
        let loader = match &self.resource_root {
            Some(root) => ResourceLoader::new(root.clone()),
            None => ResourceLoader::unrestricted(),
        };
        loader.with_max_bytes(self.max_pact_bytes)
    }
}
