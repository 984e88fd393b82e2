// crates/pact-harness-config/src/lib.rs
// ============================================================================
// Module: Pact Harness Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for pact-harness.toml semantics.
// Dependencies: pact-harness-model, serde, toml
// ============================================================================

//! ## Overview
//! `pact-harness-config` defines the configuration model for pact
//! verification runs: which pacts to load, how to filter them, how requests
//! are executed, and where audit events go. Validation is strict and fails
//! closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
