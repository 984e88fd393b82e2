//! Config file loading tests for pact-harness-config.
// crates/pact-harness-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Tests
// Description: Load configuration from disk with size and encoding limits.
// Purpose: Ensure file-level failures map to the right config errors.
// =============================================================================

use std::fs;

use pact_harness_config::ConfigError;
use pact_harness_config::HarnessConfig;

mod common;

type TestResult = Result<(), String>;

#[test]
fn load_reads_explicit_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("pact-harness.toml");
    fs::write(&path, "[filter]\nprovider = \"api\"\n").map_err(|err| err.to_string())?;
    let config = HarnessConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.filter.provider.as_deref() != Some("api") {
        return Err("provider filter not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let result = HarnessConfig::load(Some(&dir.path().join("missing.toml")));
    if matches!(result, Err(ConfigError::Io(_))) {
        Ok(())
    } else {
        Err("expected io error for missing config".to_string())
    }
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    common::assert_invalid(HarnessConfig::load(Some(&path)), "config file must be utf-8")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("large.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    common::assert_invalid(HarnessConfig::load(Some(&path)), "config file exceeds size limit")
}

#[test]
fn load_validates_contents() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("invalid.toml");
    fs::write(&path, "[audit]\nsink = \"file\"\n").map_err(|err| err.to_string())?;
    common::assert_invalid(HarnessConfig::load(Some(&path)), "requires audit.path")
}
