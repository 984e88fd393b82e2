// crates/pact-harness/tests/common/mod.rs
// =============================================================================
// Module: Harness Test Helpers
// Description: Pact fixtures, a user service router, and a recording sink.
// Purpose: Reduce duplication across integration tests for pact-harness.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::HashMap;
use std::sync::Mutex;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::get;
use pact_harness::VerificationAuditEvent;
use pact_harness::VerificationAuditSink;
use pact_harness_model::Body;
use pact_harness_model::Interaction;
use pact_harness_model::Pact;
use pact_harness_model::Request;
use pact_harness_model::RequestResponseInteraction;
use pact_harness_model::load_pact_from_str;
use serde_json::Value;
use serde_json::json;

/// Request path used by the request translation fixture.
pub const REQUEST_PATH: &str = "/to/service";

/// Query value that needs encoding on the wire.
pub const PARAM_VALUE: &str = "v%25a%3Dl%3Fu%26e";

/// Builds the request translation fixture interaction.
pub fn dummy_interaction() -> Interaction {
    let mut request = Request {
        path: REQUEST_PATH.to_string(),
        body: Body::Null,
        ..Request::default()
    };
    request.query.insert(
        "argList",
        vec!["item1".to_string(), "item2".to_string(), "lastitem".to_string()],
    );
    request.query.insert("arg2", vec![PARAM_VALUE.to_string()]);
    request.headers.insert("HEADER_KEY", "header_value");
    request.headers.insert("cookie", "TOKEN=abc;session=def");
    let mut interaction = RequestResponseInteraction::new("a dummy request", "state");
    interaction.request = Some(request);
    Interaction::RequestResponse(interaction)
}

/// Returns the user service pact as JSON.
pub fn user_pact_json() -> Value {
    json!({
        "consumer": {"name": "web"},
        "provider": {"name": "users"},
        "interactions": [
            {
                "description": "get user",
                "providerState": "user 1 exists",
                "request": {"method": "GET", "path": "/users/1"},
                "response": {
                    "status": 200,
                    "headers": {"Content-Type": "application/json"},
                    "body": {"id": 1, "name": "Ada"}
                }
            },
            {
                "description": "create user",
                "providerStates": [{"name": "no users"}],
                "request": {
                    "method": "POST",
                    "path": "/users",
                    "headers": {"Content-Type": "application/json"},
                    "body": {"name": "Bob"}
                },
                "response": {"status": 201, "body": {"id": 2, "name": "Bob"}}
            },
            {
                "description": "search users",
                "providerState": "users exist",
                "request": {"method": "GET", "path": "/users", "query": "tag=a&tag=b"},
                "response": {"status": 200, "body": [{"id": 1}, {"id": 2}]}
            },
            {
                "description": "whoami",
                "providerState": "logged in",
                "request": {
                    "method": "GET",
                    "path": "/whoami",
                    "headers": {"Cookie": "user=ada; theme=dark"}
                },
                "response": {"status": 200, "body": "ada"}
            },
            {
                "description": "missing user",
                "providerState": "user 9 missing",
                "request": {"method": "GET", "path": "/users/9"},
                "response": {"status": 404}
            }
        ],
        "messages": [
            {
                "description": "user created event",
                "providerStates": [{"name": "user created"}],
                "contents": {"id": 2}
            }
        ]
    })
}

/// Returns the user service pact.
pub fn user_pact() -> Pact {
    load_pact_from_str(&user_pact_json().to_string()).unwrap()
}

/// Returns pact JSON from another consumer of the same provider.
pub fn mobile_pact_source() -> String {
    json!({
        "consumer": {"name": "mobile"},
        "provider": {"name": "users"},
        "interactions": [{
            "description": "get user",
            "providerState": "user 1 exists",
            "request": {"method": "GET", "path": "/users/1"},
            "response": {"status": 200, "body": {"id": 1}}
        }]
    })
    .to_string()
}

/// Returns a second pact from another consumer of the same provider.
pub fn mobile_pact() -> Pact {
    load_pact_from_str(&mobile_pact_source()).unwrap()
}

/// Returns the user by id.
async fn get_user(Path(id): Path<u32>) -> Result<Json<Value>, StatusCode> {
    if id == 1 {
        Ok(Json(json!({"id": 1, "name": "Ada", "email": "ada@example.com"})))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Creates a user.
async fn create_user(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let name = body.get("name").cloned().unwrap_or(Value::Null);
    (StatusCode::CREATED, Json(json!({"id": 2, "name": name})))
}

/// Lists users matching every requested tag, newest first.
async fn search_users(Query(params): Query<Vec<(String, String)>>) -> Json<Value> {
    let tags = params.iter().filter(|(name, _)| name == "tag").count();
    let users: Vec<Value> = (1 ..= tags).rev().map(|id| json!({"id": id})).collect();
    Json(Value::Array(users))
}

/// Echoes the `user` cookie.
async fn whoami(headers: HeaderMap) -> String {
    let cookies = headers.get("cookie").and_then(|value| value.to_str().ok()).unwrap_or_default();
    let values: HashMap<&str, &str> =
        cookies.split(';').filter_map(|entry| entry.trim().split_once('=')).collect();
    values.get("user").copied().unwrap_or("anonymous").to_string()
}

/// Router implementing the user service pact.
pub fn user_router() -> Router {
    Router::new()
        .route("/users", get(search_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/whoami", get(whoami))
}

/// Audit sink keeping events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<VerificationAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<VerificationAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl VerificationAuditSink for RecordingAuditSink {
    fn record(&self, event: &VerificationAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
