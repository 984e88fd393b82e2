// crates/pact-harness-model/tests/common/mod.rs
// =============================================================================
// Module: Model Test Helpers
// Description: Pact fixtures shared by loader and selection tests.
// Purpose: Reduce duplication across integration tests for pact-harness-model.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use pact_harness_model::Pact;
use pact_harness_model::load_pact_from_str;
use serde_json::json;

/// Counter used to make fixture provider states unique.
static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Returns pact JSON with a single GET interaction.
pub fn pact_json(provider: &str, consumer: &str, state: &str, description: &str) -> String {
    json!({
        "provider": {"name": provider},
        "consumer": {"name": consumer},
        "interactions": [{
            "description": description,
            "request": {"method": "GET", "path": "/to/service"},
            "response": {"status": 200, "body": {}},
            "providerState": state
        }],
        "metadata": {
            "pact-specification": {"version": "3.0.0"},
            "pact-jvm": {"version": "3.2.10"}
        }
    })
    .to_string()
}

/// Returns pact JSON with a unique provider state.
pub fn unique_pact_json() -> String {
    let id = FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
    pact_json("a", "b", &format!("state-{id}"), "a dummy request")
}

/// Parses a fixture pact.
pub fn pact(provider: &str, consumer: &str, state: &str, description: &str) -> Pact {
    load_pact_from_str(&pact_json(provider, consumer, state, description))
        .unwrap_or_else(|err| unreachable!("fixture pact must parse: {err}"))
}

/// Writes a unique pact document to `path`.
pub fn write_pact(path: &Path) -> io::Result<()> {
    fs::write(path, unique_pact_json())
}
