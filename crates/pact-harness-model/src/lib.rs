// crates/pact-harness-model/src/lib.rs
// ============================================================================
// Module: Pact Harness Model
// Description: Contract document model, loading, and interaction selection.
// Purpose: Provide the read-only pact data consumed by the verification runner.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! `pact-harness-model` owns everything about contract documents that happens
//! before a request is built: the typed pact model, loading pacts from files,
//! folders, and resource roots, and selecting the interaction a verification
//! targets.
//! Invariants:
//! - Parsing is delegated to `serde`; the model is read-only once loaded.
//! - Selection is first-match-wins in pact order, then interaction order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod loader;
pub mod model;
pub mod selection;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::PactError;
pub use loader::DEFAULT_MAX_PACT_BYTES;
pub use loader::ResourceLoader;
pub use loader::load_pact_file;
pub use loader::load_pact_from_str;
pub use loader::load_pacts_by_file;
pub use model::Body;
pub use model::Headers;
pub use model::Interaction;
pub use model::MessageInteraction;
pub use model::Pact;
pub use model::Pacticipant;
pub use model::ProviderState;
pub use model::Query;
pub use model::Request;
pub use model::RequestResponseInteraction;
pub use model::Response;
pub use selection::InteractionSelector;
pub use selection::PactFilter;
pub use selection::SelectedInteraction;
pub use selection::first_interaction;
pub use selection::interactions;
