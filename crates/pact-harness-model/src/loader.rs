// crates/pact-harness-model/src/loader.rs
// ============================================================================
// Module: Pact Loader
// Description: Load pact documents from files, folders, and resource roots.
// Purpose: Resolve pact locations and hand their contents to serde.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! Pacts are loaded from one of three location forms:
//! - `file:<path>` or `file://<url>` for explicit filesystem paths,
//! - `resource:<relative>` for paths below a configured resource root,
//! - a bare path, relative to the working directory.
//!
//! Folder loading picks up `*.json` files and optionally recurses into
//! sub-folders. A missing folder yields no pacts; a missing single file is an
//! error. Reads are size-limited and results are ordered by path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use url::Url;

use crate::error::PactError;
use crate::model::Pact;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum pact document size in bytes.
pub const DEFAULT_MAX_PACT_BYTES: usize = 4 * 1024 * 1024;

/// Extension of pact files picked up by folder scans.
const PACT_FILE_EXTENSION: &str = "json";

/// Location prefix for filesystem paths.
const FILE_PREFIX: &str = "file:";

/// Location prefix for resource-root relative paths.
const RESOURCE_PREFIX: &str = "resource:";

/// Location label used for inline JSON sources.
const INLINE_LOCATION: &str = "<inline>";

// ============================================================================
// SECTION: Free Functions
// ============================================================================

/// Parses a single pact document from JSON text.
///
/// # Errors
///
/// Returns [`PactError::Parse`] when the text is not a valid pact.
pub fn load_pact_from_str(json: &str) -> Result<Pact, PactError> {
    parse_pact(json, INLINE_LOCATION)
}

/// Loads a single pact file.
///
/// # Errors
///
/// Returns [`PactError`] when the file is missing, too large, or invalid.
pub fn load_pact_file(path: &Path) -> Result<Pact, PactError> {
    ResourceLoader::unrestricted().read_pact(path)
}

/// Loads all pacts from `path`.
///
/// A file is loaded directly. A folder is scanned for `*.json` files, and
/// sub-folders are scanned too when `recursive` is set. A missing path
/// yields no pacts.
///
/// # Errors
///
/// Returns [`PactError`] when a discovered file cannot be read or parsed.
pub fn load_pacts_by_file(path: &Path, recursive: bool) -> Result<Vec<Pact>, PactError> {
    ResourceLoader::unrestricted().load_pacts_by_file(path, recursive)
}

// ============================================================================
// SECTION: Resource Loader
// ============================================================================

/// Resolves pact locations and loads pact documents.
///
/// # Invariants
/// - `resource:` locations never resolve outside `root`.
/// - Documents larger than `max_bytes` are rejected.
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    /// Root directory for `resource:` locations.
    root: Option<PathBuf>,
    /// Maximum document size in bytes.
    max_bytes: usize,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl ResourceLoader {
    /// Creates a loader resolving `resource:` locations below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            max_bytes: DEFAULT_MAX_PACT_BYTES,
        }
    }

    /// Creates a loader without a resource root.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            root: None,
            max_bytes: DEFAULT_MAX_PACT_BYTES,
        }
    }

    /// Overrides the maximum document size.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Returns the configured resource root.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Resolves a location string into a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::InvalidLocation`] for unsupported schemes,
    /// malformed file URLs, or resource paths escaping the root.
    pub fn resolve(&self, location: &str) -> Result<PathBuf, PactError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(PactError::InvalidLocation("empty location".to_string()));
        }
        if let Some(rest) = location.strip_prefix(FILE_PREFIX) {
            if rest.starts_with("//") {
                let url = Url::parse(location)
                    .map_err(|err| PactError::InvalidLocation(format!("{location}: {err}")))?;
                return url.to_file_path().map_err(|()| {
                    PactError::InvalidLocation(format!("{location}: not a local file url"))
                });
            }
            return Ok(PathBuf::from(rest));
        }
        if let Some(rest) = location.strip_prefix(RESOURCE_PREFIX) {
            return self.resolve_resource(location, rest);
        }
        if let Some((scheme, _)) = location.split_once("://") {
            return Err(PactError::InvalidLocation(format!("unsupported scheme: {scheme}")));
        }
        Ok(PathBuf::from(location))
    }

    /// Loads a single pact from a resource location.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::NotFound`] when the location does not exist, or
    /// another [`PactError`] when it cannot be read or parsed.
    pub fn load_pact_by_resource(&self, location: &str) -> Result<Pact, PactError> {
        let path = self.resolve(location)?;
        self.read_pact(&path)
    }

    /// Loads all pacts from a resource folder.
    ///
    /// A missing folder (or a location naming a file) yields no pacts.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the location is invalid or a discovered
    /// file cannot be read or parsed.
    pub fn load_pacts_by_resource_folder(
        &self,
        location: &str,
        recursive: bool,
    ) -> Result<Vec<Pact>, PactError> {
        let path = self.resolve(location)?;
        if !path.is_dir() {
            return Ok(Vec::new());
        }
        self.load_pacts_by_file(&path, recursive)
    }

    /// Loads all pacts from a file or folder path.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when a discovered file cannot be read or parsed.
    pub fn load_pacts_by_file(&self, path: &Path, recursive: bool) -> Result<Vec<Pact>, PactError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        if path.is_file() {
            return Ok(vec![self.read_pact(path)?]);
        }
        let mut pacts = Vec::new();
        for entry in sorted_entries(path)? {
            if entry.is_dir() {
                if recursive {
                    pacts.extend(self.load_pacts_by_file(&entry, recursive)?);
                }
            } else if is_pact_file(&entry) {
                pacts.push(self.read_pact(&entry)?);
            }
        }
        Ok(pacts)
    }

    /// Loads a pact from inline JSON text or from a location.
    ///
    /// Sources whose trimmed text starts with `{` are parsed as JSON; anything
    /// else is treated as a location.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the JSON is invalid or the location cannot
    /// be loaded.
    pub fn load_pact_generic(&self, source: &str) -> Result<Pact, PactError> {
        if source.trim_start().starts_with('{') {
            return load_pact_from_str(source);
        }
        self.load_pact_by_resource(source)
    }

    /// Reads and parses one pact file with the size limit applied.
    fn read_pact(&self, path: &Path) -> Result<Pact, PactError> {
        let location = path.display().to_string();
        let file = fs::File::open(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                PactError::NotFound(location.clone())
            } else {
                PactError::Io {
                    location: location.clone(),
                    message: err.to_string(),
                }
            }
        })?;
        let limit = u64::try_from(self.max_bytes).unwrap_or(u64::MAX).saturating_add(1);
        let mut bytes = Vec::new();
        file.take(limit).read_to_end(&mut bytes).map_err(|err| PactError::Io {
            location: location.clone(),
            message: err.to_string(),
        })?;
        if bytes.len() > self.max_bytes {
            return Err(PactError::TooLarge {
                location,
                limit: self.max_bytes,
            });
        }
        let text = std::str::from_utf8(&bytes).map_err(|_| PactError::Parse {
            location: location.clone(),
            message: "pact file must be utf-8".to_string(),
        })?;
        parse_pact(text, &location)
    }

    /// Resolves a `resource:` location below the root.
    fn resolve_resource(&self, location: &str, relative: &str) -> Result<PathBuf, PactError> {
        let root = self.root.as_ref().ok_or_else(|| {
            PactError::InvalidLocation(format!("{location}: no resource root configured"))
        })?;
        let relative = Path::new(relative.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(PactError::InvalidLocation(format!("{location}: path escapes resource root")));
        }
        Ok(root.join(relative))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses pact JSON, labelling errors with the source location.
fn parse_pact(json: &str, location: &str) -> Result<Pact, PactError> {
    serde_json::from_str(json).map_err(|err| PactError::Parse {
        location: location.to_string(),
        message: err.to_string(),
    })
}

/// Lists directory entries sorted by path.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, PactError> {
    let reader = fs::read_dir(dir).map_err(|err| PactError::Io {
        location: dir.display().to_string(),
        message: err.to_string(),
    })?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|err| PactError::Io {
            location: dir.display().to_string(),
            message: err.to_string(),
        })?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Returns true for regular files with the pact extension.
fn is_pact_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == PACT_FILE_EXTENSION)
}
