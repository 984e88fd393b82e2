// crates/pact-harness-config/src/config.rs
// ============================================================================
// Module: Pact Harness Configuration
// Description: Configuration loading and validation for pact-harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pact-harness-model, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys are rejected and every section is validated before use.
//!
//! ```toml
//! [pacts]
//! files = ["file:pacts/web-api.json"]
//! folders = [{ location = "resource:pacts", recursive = true }]
//! resource_root = "tests/resources"
//!
//! [filter]
//! provider = "api"
//!
//! [request]
//! context_path = "/app"
//!
//! [audit]
//! sink = "stderr"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pact_harness_model::DEFAULT_MAX_PACT_BYTES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "pact-harness.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PACT_HARNESS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured pact files plus folders.
pub(crate) const MAX_PACT_SOURCES: usize = 256;
/// Maximum allowed pact document size in bytes.
pub(crate) const MAX_PACT_BYTES: usize = 64 * 1024 * 1024;
/// Default maximum response body size collected from the router.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum allowed response body size in bytes.
pub(crate) const MAX_RESPONSE_BYTES: usize = 256 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Pact harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Pact sources to load.
    #[serde(default)]
    pub pacts: PactSourcesConfig,
    /// Consumer/provider filter applied to loaded pacts.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Request execution settings.
    #[serde(default)]
    pub request: RequestConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl HarnessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path argument wins, then `PACT_HARNESS_CONFIG`, then
    /// `pact-harness.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pacts.validate()?;
        self.filter.validate()?;
        self.request.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Pact source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PactSourcesConfig {
    /// Single pact locations (`file:`, `resource:`, or bare paths).
    #[serde(default)]
    pub files: Vec<String>,
    /// Folders scanned for `*.json` pact files.
    #[serde(default)]
    pub folders: Vec<PactFolderConfig>,
    /// Root directory for `resource:` locations.
    #[serde(default)]
    pub resource_root: Option<PathBuf>,
    /// Maximum pact document size in bytes.
    #[serde(default = "default_max_pact_bytes")]
    pub max_pact_bytes: usize,
}

impl Default for PactSourcesConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            folders: Vec::new(),
            resource_root: None,
            max_pact_bytes: DEFAULT_MAX_PACT_BYTES,
        }
    }
}

impl PactSourcesConfig {
    /// Validates pact source settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.files.len() + self.folders.len() > MAX_PACT_SOURCES {
            return Err(ConfigError::Invalid(format!(
                "pacts declares more than {MAX_PACT_SOURCES} sources"
            )));
        }
        if self.files.iter().any(|location| location.trim().is_empty()) {
            return Err(ConfigError::Invalid("pacts.files entries must be non-empty".to_string()));
        }
        if self.folders.iter().any(|folder| folder.location.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "pacts.folders location must be non-empty".to_string(),
            ));
        }
        if let Some(root) = &self.resource_root {
            validate_path(root)?;
        }
        if self.max_pact_bytes == 0 || self.max_pact_bytes > MAX_PACT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "pacts.max_pact_bytes must be between 1 and {MAX_PACT_BYTES}"
            )));
        }
        Ok(())
    }
}

/// A folder of pact files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PactFolderConfig {
    /// Folder location (`file:`, `resource:`, or a bare path).
    pub location: String,
    /// Scan sub-folders too.
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

/// Consumer/provider filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Required consumer name.
    #[serde(default)]
    pub consumer: Option<String>,
    /// Required provider name.
    #[serde(default)]
    pub provider: Option<String>,
}

impl FilterConfig {
    /// Validates participant names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.consumer.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("filter.consumer must be non-empty".to_string()));
        }
        if self.provider.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("filter.provider must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Request execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    /// Context path the application is mounted under.
    #[serde(default)]
    pub context_path: Option<String>,
    /// Maximum response body size collected from the router.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            context_path: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl RequestConfig {
    /// Validates request settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(context_path) = &self.context_path {
            validate_context_path(context_path)
                .map_err(|err| ConfigError::Invalid(format!("request.{err}")))?;
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "request.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output file for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates sink/path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink = \"file\" requires audit.path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path(path),
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with audit.sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates a context path: it must start with `/` and must not end with `/`.
///
/// # Errors
///
/// Returns a message naming the violated rule.
pub fn validate_context_path(context_path: &str) -> Result<(), String> {
    if !context_path.starts_with('/') {
        return Err(format!("context_path must start with '/': {context_path}"));
    }
    if context_path.ends_with('/') {
        return Err(format!("context_path must not end with '/': {context_path}"));
    }
    if context_path.contains(['?', '#']) {
        return Err(format!("context_path must not contain query or fragment: {context_path}"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default recursion flag for pact folders.
const fn default_recursive() -> bool {
    true
}

/// Default maximum pact document size.
const fn default_max_pact_bytes() -> usize {
    DEFAULT_MAX_PACT_BYTES
}

/// Default maximum response body size.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}
