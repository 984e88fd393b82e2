// crates/pact-harness/src/request.rs
// ============================================================================
// Module: Request Translation
// Description: Builds in-process HTTP requests from pact interactions.
// Purpose: Replay the consumer's recorded request against a provider router.
// Dependencies: axum, pact-harness-config, pact-harness-model, url
// ============================================================================

//! ## Overview
//! An interaction's request becomes a [`MockRequest`], an editable description
//! of the HTTP call that request callbacks may adjust, and is then lowered to
//! an `axum` request by [`MockRequest::into_http`].
//! Translation rules:
//! - The method must be one of the supported verbs; a missing method fails.
//! - Every query value is sent, repeated names in declaration order.
//! - The `Cookie` header is lifted into individual [`RequestCookie`] entries
//!   and re-emitted as one header.
//! - The body is sent as text: strings verbatim, other JSON compact.
//!   `Content-Length` is computed from it; a declared length is dropped.
//! - A context path must prefix the request path and is stripped before the
//!   request reaches the router.
//!
//! Message interactions produce no request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use axum::body::Body as HttpBody;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request as HttpRequest;
use axum::http::Uri;
use axum::http::header::CONTENT_LENGTH;
use axum::http::header::COOKIE;
use pact_harness_config::validate_context_path;
use pact_harness_model::Interaction;
use pact_harness_model::Request;
use url::Url;

use crate::error::RequestBuildError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base used to normalize request paths and encode query strings.
const BASE_URL: &str = "http://localhost";

/// Header that carries cookies, as written in pact documents.
const COOKIE_HEADER: &str = "cookie";

// ============================================================================
// SECTION: HTTP Verbs
// ============================================================================

/// HTTP verbs a pact request may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
    /// OPTIONS.
    Options,
    /// HEAD.
    Head,
    /// PATCH.
    Patch,
}

impl HttpVerb {
    /// Every supported verb.
    pub const ALL: [Self; 7] =
        [Self::Get, Self::Post, Self::Put, Self::Delete, Self::Options, Self::Head, Self::Patch];

    /// Parses a declared method name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`RequestBuildError::UnsupportedMethod`] when the method is
    /// absent or unknown.
    pub fn parse(method: Option<&str>) -> Result<Self, RequestBuildError> {
        let Some(method) = method else {
            return Err(RequestBuildError::UnsupportedMethod("<missing>".to_string()));
        };
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(method.trim()))
            .ok_or_else(|| RequestBuildError::UnsupportedMethod(method.to_string()))
    }

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }

    /// Returns the matching HTTP method.
    #[must_use]
    pub const fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Options => Method::OPTIONS,
            Self::Head => Method::HEAD,
            Self::Patch => Method::PATCH,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Cookies
// ============================================================================

/// A single request cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value; `None` for a bare name.
    pub value: Option<String>,
}

impl RequestCookie {
    /// Creates a cookie with a value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Parses a `name=value` entry, splitting on the first `=`.
    ///
    /// Returns `None` for blank entries.
    #[must_use]
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        let cookie = match entry.split_once('=') {
            Some((name, value)) => Self {
                name: name.trim().to_string(),
                value: Some(value.trim().to_string()),
            },
            None => Self {
                name: entry.to_string(),
                value: None,
            },
        };
        Some(cookie)
    }

    /// Parses every entry of a `Cookie` header value.
    #[must_use]
    pub fn parse_header(value: &str) -> Vec<Self> {
        value.split(';').filter_map(Self::parse).collect()
    }
}

impl fmt::Display for RequestCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ============================================================================
// SECTION: Context Path
// ============================================================================

/// Request extension carrying the context path stripped from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPath(pub String);

// ============================================================================
// SECTION: Mock Request
// ============================================================================

/// Editable description of the request replayed against the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Request verb.
    pub verb: HttpVerb,
    /// Raw request path, including any context path.
    pub path: String,
    /// Decoded query parameters in send order.
    pub query: Vec<(String, String)>,
    /// Headers other than `Cookie`, in send order.
    pub headers: Vec<(String, String)>,
    /// Cookies sent as a single `Cookie` header.
    pub cookies: Vec<RequestCookie>,
    /// Body text; empty sends no body.
    pub body: String,
    /// Context path the router is mounted under.
    pub context_path: Option<String>,
}

impl MockRequest {
    /// Creates an empty request for a verb and path.
    #[must_use]
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            cookies: Vec::new(),
            body: String::new(),
            context_path: None,
        }
    }

    /// Returns every value sent for a query parameter.
    #[must_use]
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Returns the first header value with the given name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the cookie with the given name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&RequestCookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }

    /// Replaces every header with the given name, ignoring case.
    ///
    /// A `Cookie` header replaces [`MockRequest::cookies`] instead, so the
    /// request still carries a single `Cookie` header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if name.eq_ignore_ascii_case(COOKIE_HEADER) {
            self.cookies = RequestCookie::parse_header(&value);
            return;
        }
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value));
    }

    /// Appends a query parameter value.
    pub fn add_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    /// Lowers the request into an `axum` request.
    ///
    /// `Content-Length` always reflects the body; a declared value is not
    /// sent. `Cookie` entries left in `headers` are merged into the single
    /// `Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns [`RequestBuildError`] when the URI, a header, or the context
    /// path is invalid.
    pub fn into_http(self) -> Result<HttpRequest<HttpBody>, RequestBuildError> {
        let uri = self.request_uri()?;
        let mut builder = HttpRequest::builder().method(self.verb.as_method()).uri(uri);
        let mut cookies = self.cookies;
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(COOKIE_HEADER) {
                cookies.extend(RequestCookie::parse_header(value));
                continue;
            }
            if name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str()) {
                continue;
            }
            let (name, value) = header_pair(name, value)?;
            builder = builder.header(name, value);
        }
        if !cookies.is_empty() {
            let joined = cookies.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
            let (_, value) = header_pair(COOKIE.as_str(), &joined)?;
            builder = builder.header(COOKIE, value);
        }
        if !self.body.is_empty() {
            builder = builder.header(CONTENT_LENGTH, self.body.len());
        }
        if let Some(context_path) = self.context_path {
            builder = builder.extension(ContextPath(context_path));
        }
        builder
            .body(HttpBody::from(self.body))
            .map_err(|err| RequestBuildError::InvalidUri(err.to_string()))
    }

    /// Builds the origin-form URI, stripping the context path.
    fn request_uri(&self) -> Result<Uri, RequestBuildError> {
        let mut url = base_url()?;
        url.set_path(&self.path);
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        let path = match &self.context_path {
            Some(context_path) => {
                validate_context_path(context_path).map_err(RequestBuildError::ContextPath)?;
                strip_context_path(url.path(), &encode_path(context_path)?)?
            }
            None => url.path().to_string(),
        };
        let text = match url.query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };
        text.parse::<Uri>().map_err(|err| RequestBuildError::InvalidUri(format!("{text}: {err}")))
    }
}

/// Returns the base URL request paths are resolved against.
fn base_url() -> Result<Url, RequestBuildError> {
    Url::parse(BASE_URL).map_err(|err| RequestBuildError::InvalidUri(format!("{BASE_URL}: {err}")))
}

/// Percent-encodes a path the way request paths are encoded.
fn encode_path(path: &str) -> Result<String, RequestBuildError> {
    let mut url = base_url()?;
    url.set_path(path);
    Ok(url.path().to_string())
}

/// Validates a header name and value.
fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), RequestBuildError> {
    let invalid = |message: String| RequestBuildError::InvalidHeader {
        name: name.to_string(),
        message,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid(err.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|err| invalid(err.to_string()))?;
    Ok((header_name, header_value))
}

/// Removes the context path prefix from an encoded request path.
///
/// # Errors
///
/// Returns [`RequestBuildError::ContextPath`] when the context path is
/// malformed or does not prefix the path on a segment boundary.
pub fn strip_context_path(path: &str, context_path: &str) -> Result<String, RequestBuildError> {
    validate_context_path(context_path).map_err(RequestBuildError::ContextPath)?;
    let rest = path
        .strip_prefix(context_path)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| {
            RequestBuildError::ContextPath(format!(
                "request path {path} does not start with context path {context_path}"
            ))
        })?;
    if rest.is_empty() { Ok("/".to_string()) } else { Ok(rest.to_string()) }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Builds the request for an interaction.
///
/// Returns `Ok(None)` for message interactions, which carry no HTTP request.
///
/// # Errors
///
/// Returns [`RequestBuildError`] when a request/response interaction has no
/// request or declares an unsupported method.
pub fn build_request(interaction: &Interaction) -> Result<Option<MockRequest>, RequestBuildError> {
    match interaction {
        Interaction::RequestResponse(interaction) => {
            let request = interaction
                .request
                .as_ref()
                .ok_or_else(|| RequestBuildError::MissingRequest(interaction.description.clone()))?;
            build_request_from(request).map(Some)
        }
        Interaction::Message(_) => Ok(None),
    }
}

/// Builds a mock request from a pact request.
///
/// # Errors
///
/// Returns [`RequestBuildError::UnsupportedMethod`] for unknown methods.
pub fn build_request_from(request: &Request) -> Result<MockRequest, RequestBuildError> {
    let verb = HttpVerb::parse(request.method.as_deref())?;
    let mut mock = MockRequest::new(verb, request.path.clone());
    for (name, values) in request.query.iter() {
        for value in values {
            mock.add_query(name, value.clone());
        }
    }
    mock.headers = request
        .headers
        .iter()
        .filter(|(name, _)| {
            !name.eq_ignore_ascii_case(COOKIE_HEADER)
                && !name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str())
        })
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    mock.cookies =
        request.cookies().iter().map(String::as_str).filter_map(RequestCookie::parse).collect();
    mock.body = request.body.as_content();
    Ok(mock)
}
