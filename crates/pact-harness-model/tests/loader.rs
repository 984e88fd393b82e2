//! Pact loader tests for pact-harness-model.
// crates/pact-harness-model/tests/loader.rs
// =============================================================================
// Module: Pact Loader Tests
// Description: File, folder, resource, and inline pact loading.
// Purpose: Ensure folder scans honor recursion and missing sources behave.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::path::PathBuf;

use pact_harness_model::PactError;
use pact_harness_model::ResourceLoader;
use pact_harness_model::load_pact_file;
use pact_harness_model::load_pacts_by_file;
use tempfile::TempDir;

mod common;

/// Temporary pact tree: `1.json`, `2.json`, `3.txt`, `subfolder/4.json`, `subfolder/5.txt`.
struct PactTree {
    /// Owned temp directory.
    dir: TempDir,
    /// Path of the nested folder.
    subfolder: PathBuf,
}

/// Builds the standard pact tree.
fn pact_tree() -> PactTree {
    let dir = tempfile::tempdir().unwrap();
    common::write_pact(&dir.path().join("1.json")).unwrap();
    common::write_pact(&dir.path().join("2.json")).unwrap();
    common::write_pact(&dir.path().join("3.txt")).unwrap();
    let subfolder = dir.path().join("subfolder");
    fs::create_dir(&subfolder).unwrap();
    common::write_pact(&subfolder.join("4.json")).unwrap();
    common::write_pact(&subfolder.join("5.txt")).unwrap();
    PactTree {
        dir,
        subfolder,
    }
}

/// Formats a `file:` location for a path.
fn file_location(path: &std::path::Path) -> String {
    format!("file:{}", path.display())
}

#[test]
fn load_pact_by_resource_reads_single_files() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted();
    let pact = loader.load_pact_by_resource(&file_location(&tree.dir.path().join("1.json"))).unwrap();
    assert_eq!(pact.provider.name, "a");
    let pact = loader.load_pact_by_resource(&file_location(&tree.subfolder.join("4.json"))).unwrap();
    assert_eq!(pact.interactions.len(), 1);
}

#[test]
fn load_pact_by_resource_missing_file_is_not_found() {
    let tree = pact_tree();
    let result = ResourceLoader::unrestricted()
        .load_pact_by_resource(&file_location(&tree.dir.path().join("6.json")));
    assert!(matches!(result, Err(PactError::NotFound(_))));
}

#[test]
fn resource_folder_recursive_scan_finds_nested_pacts() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted();
    let pacts = loader.load_pacts_by_resource_folder(&file_location(tree.dir.path()), true).unwrap();
    assert_eq!(pacts.len(), 3);
    let pacts = loader.load_pacts_by_resource_folder(&file_location(&tree.subfolder), true).unwrap();
    assert_eq!(pacts.len(), 1);
}

#[test]
fn resource_folder_flat_scan_skips_subfolders() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted();
    let pacts = loader.load_pacts_by_resource_folder(&file_location(tree.dir.path()), false).unwrap();
    assert_eq!(pacts.len(), 2);
    let pacts = loader.load_pacts_by_resource_folder(&file_location(&tree.subfolder), false).unwrap();
    assert_eq!(pacts.len(), 1);
}

#[test]
fn missing_resource_folder_yields_no_pacts() {
    let tree = pact_tree();
    let location = format!("{}_temp", file_location(&tree.subfolder));
    let pacts = ResourceLoader::unrestricted().load_pacts_by_resource_folder(&location, true).unwrap();
    assert!(pacts.is_empty());
}

#[test]
fn file_folder_scans_honor_recursion() {
    let tree = pact_tree();
    assert_eq!(load_pacts_by_file(tree.dir.path(), true).unwrap().len(), 3);
    assert_eq!(load_pacts_by_file(&tree.subfolder, true).unwrap().len(), 1);
    assert_eq!(load_pacts_by_file(tree.dir.path(), false).unwrap().len(), 2);
    assert_eq!(load_pacts_by_file(&tree.subfolder, false).unwrap().len(), 1);
}

#[test]
fn file_scan_of_single_file_loads_it() {
    let tree = pact_tree();
    assert_eq!(load_pacts_by_file(&tree.dir.path().join("1.json"), true).unwrap().len(), 1);
    assert_eq!(load_pacts_by_file(&tree.subfolder.join("4.json"), false).unwrap().len(), 1);
}

#[test]
fn file_scan_of_missing_path_is_empty() {
    let tree = pact_tree();
    let missing = tree.dir.path().join("6.json");
    assert!(load_pacts_by_file(&missing, true).unwrap().is_empty());
    assert!(load_pacts_by_file(&missing, false).unwrap().is_empty());
}

#[test]
fn generic_source_accepts_paths_and_inline_json() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted();
    let path = tree.dir.path().join("1.json");
    assert!(loader.load_pact_generic(&path.display().to_string()).is_ok());
    assert!(loader.load_pact_generic(&common::unique_pact_json()).is_ok());
    assert!(load_pact_file(&path).is_ok());
}

#[test]
fn generic_source_missing_file_fails() {
    let tree = pact_tree();
    let missing = tree.dir.path().join("6.json");
    let result = ResourceLoader::unrestricted().load_pact_generic(&missing.display().to_string());
    assert!(matches!(result, Err(PactError::NotFound(_))));
}

#[test]
fn invalid_json_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"consumer\": ").unwrap();
    let result = load_pact_file(&path);
    assert!(matches!(result, Err(PactError::Parse { .. })));
}

#[test]
fn resource_locations_resolve_below_root() {
    let tree = pact_tree();
    let loader = ResourceLoader::new(tree.dir.path());
    let pact = loader.load_pact_by_resource("resource:subfolder/4.json").unwrap();
    assert_eq!(pact.consumer.name, "b");
    let pacts = loader.load_pacts_by_resource_folder("resource:/", true).unwrap();
    assert_eq!(pacts.len(), 3);
}

#[test]
fn resource_locations_cannot_escape_root() {
    let tree = pact_tree();
    let loader = ResourceLoader::new(&tree.subfolder);
    let result = loader.load_pact_by_resource("resource:../1.json");
    assert!(matches!(result, Err(PactError::InvalidLocation(_))));
}

#[test]
fn resource_locations_require_root() {
    let result = ResourceLoader::unrestricted().resolve("resource:pacts/a.json");
    assert!(matches!(result, Err(PactError::InvalidLocation(_))));
}

#[test]
fn file_urls_and_foreign_schemes() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted();
    let url = url::Url::from_file_path(tree.dir.path().join("2.json")).unwrap();
    assert!(loader.load_pact_by_resource(url.as_str()).is_ok());
    let result = loader.resolve("https://broker.example/pacts/a.json");
    assert!(matches!(result, Err(PactError::InvalidLocation(_))));
}

#[test]
fn oversized_documents_are_rejected() {
    let tree = pact_tree();
    let loader = ResourceLoader::unrestricted().with_max_bytes(16);
    let result = loader.load_pact_by_resource(&file_location(&tree.dir.path().join("1.json")));
    assert!(matches!(result, Err(PactError::TooLarge { limit: 16, .. })));
}
