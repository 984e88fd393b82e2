// crates/pact-harness/src/audit.rs
// ============================================================================
// Module: Verification Audit Logging
// Description: Structured audit events for verification runs.
// Purpose: Emit one JSON line per run without a logging framework dependency.
// Dependencies: pact-harness-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Every verification run records exactly one [`VerificationAuditEvent`],
//! whether it passed, was skipped, or failed. Sinks decide where the JSON
//! line goes; the default sink discards it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use pact_harness_config::AuditConfig;
use pact_harness_config::AuditSinkKind;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Every expectation held.
    Verified,
    /// The interaction carries no HTTP request.
    Skipped,
    /// The run returned an error.
    Failed,
}

/// Verification audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Consumer of the verified pact, once selected.
    pub consumer: Option<String>,
    /// Provider of the verified pact, once selected.
    pub provider: Option<String>,
    /// Requested provider state.
    pub provider_state: Option<String>,
    /// Requested interaction description.
    pub description: Option<String>,
    /// Request method when a request was sent.
    pub method: Option<&'static str>,
    /// Request path when a request was sent.
    pub path: Option<String>,
    /// Response status when a response was received.
    pub status: Option<u16>,
    /// Run outcome.
    pub outcome: VerificationOutcome,
    /// Error label for failed runs.
    pub error_kind: Option<&'static str>,
    /// Failure messages for failed runs.
    pub failures: Vec<String>,
}

/// Verification audit event inputs.
#[derive(Debug, Clone, Default)]
pub struct VerificationAuditEventParams {
    /// Consumer of the verified pact.
    pub consumer: Option<String>,
    /// Provider of the verified pact.
    pub provider: Option<String>,
    /// Requested provider state.
    pub provider_state: Option<String>,
    /// Requested interaction description.
    pub description: Option<String>,
    /// Request method.
    pub method: Option<&'static str>,
    /// Request path.
    pub path: Option<String>,
    /// Response status.
    pub status: Option<u16>,
}

impl VerificationAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        params: VerificationAuditEventParams,
        outcome: VerificationOutcome,
        error_kind: Option<&'static str>,
        failures: Vec<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "pact_verification",
            timestamp_ms,
            consumer: params.consumer,
            provider: params.provider,
            provider_state: params.provider_state,
            description: params.description,
            method: params.method,
            path: params.path,
            status: params.status,
            outcome,
            error_kind,
            failures,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for verification events.
pub trait VerificationAuditSink: Send + Sync {
    /// Records a verification event.
    fn record(&self, event: &VerificationAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl VerificationAuditSink for StderrAuditSink {
    fn record(&self, event: &VerificationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl VerificationAuditSink for FileAuditSink {
    fn record(&self, event: &VerificationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl VerificationAuditSink for NoopAuditSink {
    fn record(&self, _event: &VerificationAuditEvent) {}
}

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns an error if the file sink cannot open its path.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn VerificationAuditSink>> {
    match (config.sink, &config.path) {
        (AuditSinkKind::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(path)?)),
        (AuditSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "file audit sink requires a path"))
        }
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
    }
}
