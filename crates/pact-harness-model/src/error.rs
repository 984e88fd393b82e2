// crates/pact-harness-model/src/error.rs
// ============================================================================
// Module: Pact Errors
// Description: Error types for pact loading and resource resolution.
// Purpose: Surface load failures directly to the calling test.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every loader failure maps to a [`PactError`]. Nothing is retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while locating or parsing pact documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PactError {
    /// I/O failure while reading a pact source.
    #[error("cannot read pact source {location}: {message}")]
    Io {
        /// Location that failed.
        location: String,
        /// Underlying error message.
        message: String,
    },
    /// The pact document could not be parsed.
    #[error("cannot parse pact {location}: {message}")]
    Parse {
        /// Location of the document (or `<inline>`).
        location: String,
        /// Parser error message.
        message: String,
    },
    /// The pact location does not exist.
    #[error("pact source not found: {0}")]
    NotFound(String),
    /// The resource location is malformed or escapes its root.
    #[error("invalid pact location: {0}")]
    InvalidLocation(String),
    /// The pact document exceeds the configured size limit.
    #[error("pact source {location} exceeds {limit} bytes")]
    TooLarge {
        /// Location of the document.
        location: String,
        /// Configured byte limit.
        limit: usize,
    },
}
