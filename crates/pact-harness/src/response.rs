// crates/pact-harness/src/response.rs
// ============================================================================
// Module: Observed Response
// Description: Buffered view of the response returned by the router.
// Purpose: Give expectations and callbacks read access to status, headers, body.
// Dependencies: axum, bytes, serde_json
// ============================================================================

//! ## Overview
//! [`MockResponse`] is the fully collected response of one replayed request.
//! Collection is bounded: bodies larger than the configured limit fail the
//! run instead of being truncated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::body::Body as HttpBody;
use axum::http::HeaderMap;
use axum::http::Response as HttpResponse;
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::Value;

use crate::error::VerificationError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Response observed from the router.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Response status.
    status: StatusCode,
    /// Response headers.
    headers: HeaderMap,
    /// Collected body bytes.
    body: Bytes,
}

impl MockResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Collects a router response, reading at most `limit` body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::ResponseBody`] when the body cannot be
    /// read or exceeds the limit.
    pub async fn collect(
        response: HttpResponse<HttpBody>,
        limit: usize,
    ) -> Result<Self, VerificationError> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|err| VerificationError::ResponseBody(err.to_string()))?;
        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header when it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error when the body is not JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
