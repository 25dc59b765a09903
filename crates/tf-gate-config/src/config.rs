// crates/tf-gate-config/src/config.rs
// ============================================================================
// Module: tf-gate Configuration
// Description: Configuration loading and validation for tf-gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: tf-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file resolved from an explicit path,
//! the `TF_GATE_CONFIG` environment variable, or the default filename. An
//! explicitly named file must exist; a missing default file yields defaults.
//! Numeric settings are checked against bounded ranges so a typo cannot turn
//! a phase timeout into an unbounded subprocess.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tf_gate_core::ValidatorOptions;
use tf_gate_core::terraform::DEFAULT_BINARY_NAME;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "tf-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TF_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Minimum allowed request body limit in bytes.
pub(crate) const MIN_MAX_BODY_BYTES: usize = 1024;
/// Maximum allowed request body limit in bytes.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default phase-1 (init) timeout in milliseconds.
pub(crate) const DEFAULT_INIT_TIMEOUT_MS: u64 = 600_000;
/// Default phase-2 (validate) timeout in milliseconds.
pub(crate) const DEFAULT_VALIDATE_TIMEOUT_MS: u64 = 60_000;
/// Minimum allowed phase timeout in milliseconds.
pub(crate) const MIN_PHASE_TIMEOUT_MS: u64 = 1_000;
/// Maximum allowed phase timeout in milliseconds.
pub(crate) const MAX_PHASE_TIMEOUT_MS: u64 = 3_600_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// tf-gate MCP configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TfGateConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Terraform adapter configuration.
    #[serde(default)]
    pub terraform: TerraformConfig,
}

/// MCP server transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Content-Length framed JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST.
    Http,
}

impl ServerTransport {
    /// Returns a stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// Server transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport used to serve requests.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum allowed request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Terraform adapter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TerraformConfig {
    /// Binary name searched on the executable path.
    #[serde(default = "default_binary_name")]
    pub binary_name: String,
    /// Explicit binary path override; skips the search entirely.
    #[serde(default)]
    pub binary_path: Option<PathBuf>,
    /// Whether phase 1 forces a provider upgrade.
    #[serde(default = "default_init_upgrade")]
    pub init_upgrade: bool,
    /// Phase-1 timeout in milliseconds.
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,
    /// Phase-2 timeout in milliseconds.
    #[serde(default = "default_validate_timeout_ms")]
    pub validate_timeout_ms: u64,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary_name: default_binary_name(),
            binary_path: None,
            init_upgrade: true,
            init_timeout_ms: DEFAULT_INIT_TIMEOUT_MS,
            validate_timeout_ms: DEFAULT_VALIDATE_TIMEOUT_MS,
        }
    }
}

impl TerraformConfig {
    /// Converts the configuration into core validator options.
    #[must_use]
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            binary_name: self.binary_name.clone(),
            binary_path: self.binary_path.clone(),
            init_upgrade: self.init_upgrade,
            init_timeout: std::time::Duration::from_millis(self.init_timeout_ms),
            validate_timeout: std::time::Duration::from_millis(self.validate_timeout_ms),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default validator binary name.
fn default_binary_name() -> String {
    DEFAULT_BINARY_NAME.to_string()
}

/// Default provider upgrade policy for phase 1.
const fn default_init_upgrade() -> bool {
    true
}

/// Default phase-1 timeout.
const fn default_init_timeout_ms() -> u64 {
    DEFAULT_INIT_TIMEOUT_MS
}

/// Default phase-2 timeout.
const fn default_validate_timeout_ms() -> u64 {
    DEFAULT_VALIDATE_TIMEOUT_MS
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl TfGateConfig {
    /// Loads configuration from the resolved path.
    ///
    /// An explicit path (argument or environment) must name an existing
    /// file; a missing default file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some() || env::var_os(CONFIG_ENV_VAR).is_some();
        let resolved = resolve_path(path);
        if !resolved.exists() {
            if explicit {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    resolved.display()
                )));
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let config = Self::load_from(&resolved)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from an explicit file path without resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds max size".to_string()));
        }
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates settings against hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.transport == ServerTransport::Http && self.server.bind.is_none() {
            return Err(ConfigError::Invalid(
                "http transport requires server.bind".to_string(),
            ));
        }
        if self.server.max_body_bytes < MIN_MAX_BODY_BYTES
            || self.server.max_body_bytes > MAX_MAX_BODY_BYTES
        {
            return Err(ConfigError::Invalid("server.max_body_bytes out of range".to_string()));
        }
        if self.terraform.binary_name.is_empty() {
            return Err(ConfigError::Invalid("terraform.binary_name is empty".to_string()));
        }
        if self.terraform.binary_name.contains(std::path::is_separator) {
            return Err(ConfigError::Invalid(
                "terraform.binary_name must not contain path separators; use \
                 terraform.binary_path for explicit locations"
                    .to_string(),
            ));
        }
        for (label, value) in [
            ("terraform.init_timeout_ms", self.terraform.init_timeout_ms),
            ("terraform.validate_timeout_ms", self.terraform.validate_timeout_ms),
        ] {
            if !(MIN_PHASE_TIMEOUT_MS..=MAX_PHASE_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid(format!("{label} out of range")));
            }
        }
        Ok(())
    }
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Some(env_path) = env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
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
// SECTION: Tests
// ============================================================================
