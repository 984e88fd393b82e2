// crates/pact-harness-model/src/model.rs
// ============================================================================
// Module: Contract Document Model
// Description: Typed model of pact contract documents.
// Purpose: Deserialize pact v2/v3 JSON into normalized, read-only types.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! A [`Pact`] records the interactions a consumer expects from a provider.
//! Parsing is delegated to `serde`; this module only normalizes the version
//! differences that matter downstream:
//! - `providerState` (v2) and `providerStates` (v3) both become
//!   [`ProviderState`] lists.
//! - Query strings (v2) and query maps (v3) both become a [`Query`].
//! - A missing body, a `null` body, and an empty body stay distinguishable
//!   through [`Body`].
//!
//! Unknown fields (matching rules, generators, plugin data) are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;
use url::form_urlencoded;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status assumed when a response omits it.
pub const DEFAULT_RESPONSE_STATUS: u16 = 200;

/// Header that carries request cookies.
const COOKIE_HEADER: &str = "cookie";

// ============================================================================
// SECTION: Pact
// ============================================================================

/// A contract document between one consumer and one provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPact")]
pub struct Pact {
    /// Consumer participant.
    pub consumer: Pacticipant,
    /// Provider participant.
    pub provider: Pacticipant,
    /// Request/response interactions followed by message interactions.
    pub interactions: Vec<Interaction>,
    /// Raw metadata block (spec version, generator info).
    pub metadata: Option<Value>,
}

impl Pact {
    /// Creates a pact from its parts.
    #[must_use]
    pub fn new(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        interactions: Vec<Interaction>,
    ) -> Self {
        Self {
            consumer: Pacticipant::new(consumer),
            provider: Pacticipant::new(provider),
            interactions,
            metadata: None,
        }
    }

    /// Returns the declared pact specification version, if any.
    #[must_use]
    pub fn specification_version(&self) -> Option<&str> {
        let metadata = self.metadata.as_ref()?;
        metadata
            .get("pactSpecification")
            .or_else(|| metadata.get("pact-specification"))
            .and_then(|spec| spec.get("version"))
            .and_then(Value::as_str)
    }
}

/// A named party of a pact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pacticipant {
    /// Participant name.
    pub name: String,
}

impl Pacticipant {
    /// Creates a participant with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

/// Wire shape of a pact document.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPact {
    /// Consumer participant.
    consumer: Pacticipant,
    /// Provider participant.
    provider: Pacticipant,
    /// Request/response interactions.
    #[serde(default)]
    interactions: Vec<RawInteraction>,
    /// Message interactions (v3 message pacts).
    #[serde(default)]
    messages: Vec<RawMessage>,
    /// Metadata block.
    #[serde(default)]
    metadata: Option<Value>,
}

impl From<RawPact> for Pact {
    fn from(raw: RawPact) -> Self {
        let mut interactions: Vec<Interaction> = raw
            .interactions
            .into_iter()
            .map(|entry| Interaction::RequestResponse(entry.into()))
            .collect();
        interactions.extend(raw.messages.into_iter().map(|entry| Interaction::Message(entry.into())));
        Self {
            consumer: raw.consumer,
            provider: raw.provider,
            interactions,
            metadata: raw.metadata,
        }
    }
}

// ============================================================================
// SECTION: Interactions
// ============================================================================

/// One interaction within a pact.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// HTTP request/response pair.
    RequestResponse(RequestResponseInteraction),
    /// Asynchronous message.
    Message(MessageInteraction),
}

impl Interaction {
    /// Returns the interaction description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::RequestResponse(interaction) => &interaction.description,
            Self::Message(interaction) => &interaction.description,
        }
    }

    /// Returns all provider states of the interaction.
    #[must_use]
    pub fn provider_states(&self) -> &[ProviderState] {
        match self {
            Self::RequestResponse(interaction) => &interaction.provider_states,
            Self::Message(interaction) => &interaction.provider_states,
        }
    }

    /// Returns the name of the first provider state.
    #[must_use]
    pub fn provider_state(&self) -> Option<&str> {
        self.provider_states().first().map(|state| state.name.as_str())
    }

    /// Returns true when any provider state has the given name, ignoring ASCII case.
    #[must_use]
    pub fn has_provider_state(&self, name: &str) -> bool {
        self.provider_states().iter().any(|state| state.name.eq_ignore_ascii_case(name))
    }

    /// Returns the request/response form when this is an HTTP interaction.
    #[must_use]
    pub const fn as_request_response(&self) -> Option<&RequestResponseInteraction> {
        match self {
            Self::RequestResponse(interaction) => Some(interaction),
            Self::Message(_) => None,
        }
    }
}

/// HTTP request/response interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestResponseInteraction {
    /// Interaction description.
    pub description: String,
    /// Provider states required by the interaction.
    pub provider_states: Vec<ProviderState>,
    /// Expected request.
    pub request: Option<Request>,
    /// Expected response.
    pub response: Option<Response>,
}

impl RequestResponseInteraction {
    /// Creates an interaction with a description and a single provider state.
    #[must_use]
    pub fn new(description: impl Into<String>, provider_state: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_states: vec![ProviderState::new(provider_state)],
            request: None,
            response: None,
        }
    }
}

/// Message interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageInteraction {
    /// Message description.
    pub description: String,
    /// Provider states required by the message.
    pub provider_states: Vec<ProviderState>,
    /// Message contents.
    pub contents: Body,
    /// Message metadata.
    pub metadata: Option<Value>,
}

/// A provider state with optional parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderState {
    /// State name.
    pub name: String,
    /// State parameters (v3).
    #[serde(default)]
    pub params: Option<Value>,
}

impl ProviderState {
    /// Creates a parameterless provider state.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }
}

/// Wire shape of a request/response interaction.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInteraction {
    /// Interaction description.
    #[serde(default)]
    description: String,
    /// v2 provider state.
    #[serde(default)]
    provider_state: Option<String>,
    /// v3 provider states.
    #[serde(default)]
    provider_states: Option<Vec<ProviderState>>,
    /// Expected request.
    #[serde(default)]
    request: Option<Request>,
    /// Expected response.
    #[serde(default)]
    response: Option<Response>,
}

impl From<RawInteraction> for RequestResponseInteraction {
    fn from(raw: RawInteraction) -> Self {
        Self {
            description: raw.description,
            provider_states: merge_states(raw.provider_state, raw.provider_states),
            request: raw.request,
            response: raw.response,
        }
    }
}

/// Wire shape of a message interaction.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    /// Message description.
    #[serde(default)]
    description: String,
    /// v2-style provider state.
    #[serde(default)]
    provider_state: Option<String>,
    /// v3 provider states.
    #[serde(default)]
    provider_states: Option<Vec<ProviderState>>,
    /// Message contents.
    #[serde(default)]
    contents: Body,
    /// Message metadata.
    #[serde(default)]
    metadata: Option<Value>,
}

impl From<RawMessage> for MessageInteraction {
    fn from(raw: RawMessage) -> Self {
        Self {
            description: raw.description,
            provider_states: merge_states(raw.provider_state, raw.provider_states),
            contents: raw.contents,
            metadata: raw.metadata,
        }
    }
}

/// Combines v3 provider states with a v2 provider state; v3 entries win.
fn merge_states(legacy: Option<String>, states: Option<Vec<ProviderState>>) -> Vec<ProviderState> {
    match states {
        Some(states) if !states.is_empty() => states,
        _ => legacy.into_iter().filter(|name| !name.is_empty()).map(ProviderState::new).collect(),
    }
}

// ============================================================================
// SECTION: Request / Response
// ============================================================================

/// Expected HTTP request of an interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    /// HTTP method as written in the contract.
    #[serde(default)]
    pub method: Option<String>,
    /// Request path, possibly percent-encoded.
    #[serde(default = "default_path")]
    pub path: String,
    /// Query parameters.
    #[serde(default)]
    pub query: Query,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Request body.
    #[serde(default)]
    pub body: Body,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Some("GET".to_string()),
            path: default_path(),
            query: Query::default(),
            headers: Headers::default(),
            body: Body::Missing,
        }
    }
}

impl Request {
    /// Returns the raw cookie strings carried by the `Cookie` header.
    ///
    /// Entries are split on `;`, trimmed, and empty entries are dropped.
    #[must_use]
    pub fn cookies(&self) -> Vec<String> {
        self.headers.get(COOKIE_HEADER).map_or_else(Vec::new, |value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Default request path.
fn default_path() -> String {
    "/".to_string()
}

/// Expected HTTP response of an interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// Response status; missing or `null` means 200.
    #[serde(default = "default_status", deserialize_with = "deserialize_status")]
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Response body.
    #[serde(default)]
    pub body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: DEFAULT_RESPONSE_STATUS,
            headers: Headers::default(),
            body: Body::Missing,
        }
    }
}

/// Default response status.
const fn default_status() -> u16 {
    DEFAULT_RESPONSE_STATUS
}

/// Reads a response status, treating `null` like a missing status.
fn deserialize_status<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u16>::deserialize(deserializer)?.unwrap_or(DEFAULT_RESPONSE_STATUS))
}

// ============================================================================
// SECTION: Query
// ============================================================================

/// Query parameters keyed by name; values keep their declared order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Parameter name to ordered values.
    params: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Parses a form-encoded query string (`a=1&a=2&b`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (name, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            parsed.append(name.into_owned(), value.into_owned());
        }
        parsed
    }

    /// Appends one value to a parameter.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.entry(name.into()).or_default().push(value.into());
    }

    /// Replaces all values of a parameter.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.params.insert(name.into(), values);
    }

    /// Returns the values of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns true when no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Wire shape of a query declaration.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuery {
    /// v2 query string.
    Text(String),
    /// v3 query map.
    Map(BTreeMap<String, OneOrMany>),
}

/// A single string or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    /// Single value.
    One(String),
    /// Multiple values.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flattens into a value list.
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawQuery>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self::default(),
            Some(RawQuery::Text(text)) => Self::parse(&text),
            Some(RawQuery::Map(map)) => Self {
                params: map.into_iter().map(|(name, values)| (name, values.into_vec())).collect(),
            },
        })
    }
}

// ============================================================================
// SECTION: Headers
// ============================================================================

/// Header declarations keyed by name as written in the contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headers {
    /// Header name to value.
    entries: BTreeMap<String, String>,
}

impl Headers {
    /// Sets a header value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Returns a header value, matching the name case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates headers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of declared headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no headers are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, OneOrMany>>::deserialize(deserializer)?;
        let entries = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, value.into_vec().join(", ")))
            .collect();
        Ok(Self {
            entries,
        })
    }
}

// ============================================================================
// SECTION: Body
// ============================================================================

/// Optional body of a request, response, or message.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// The body field is absent.
    #[default]
    Missing,
    /// The body is explicitly `null`.
    Null,
    /// The body is an empty string.
    Empty,
    /// The body carries content.
    Present(Value),
}

impl Body {
    /// Returns true when the body carries content.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns the body value when present.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Null | Self::Empty => None,
        }
    }

    /// Returns the text a request should carry for this body.
    ///
    /// String bodies are returned verbatim, other JSON is serialized compactly,
    /// and absent bodies yield an empty string.
    #[must_use]
    pub fn as_content(&self) -> String {
        match self {
            Self::Present(Value::String(text)) => text.clone(),
            Self::Present(value) => value.to_string(),
            Self::Missing | Self::Null | Self::Empty => String::new(),
        }
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => Self::Null,
            Value::String(text) if text.is_empty() => Self::Empty,
            other => Self::Present(other),
        })
    }
}
