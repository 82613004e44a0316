//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.
//! A TOML file that exists but cannot be parsed is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backend base URL environment variable
pub const ENV_API_URL: &str = "EEGWA_API_URL";
/// Bearer token environment variable
pub const ENV_ACCESS_TOKEN: &str = "EEGWA_ACCESS_TOKEN";
/// Alternate TOML config location environment variable
pub const ENV_CONFIG: &str = "EEGWA_CONFIG";

/// Compiled default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Overall request timeout applied by the transport
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Backend REST API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Overall request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Bearer token from a previous sign-in
    #[serde(default)]
    pub access_token: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse a TOML config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL without trailing slash
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub access_token: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            access_token: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from CLI → ENV → TOML → defaults
    pub fn resolve(overrides: &CliOverrides) -> Result<Self> {
        let toml_config = match resolve_config_path(overrides.config_path.as_deref()) {
            Some(path) => TomlConfig::load_or_default(&path)?,
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };
        Self::from_sources(overrides, &toml_config)
    }

    /// Merge already-loaded sources (environment is read here)
    pub fn from_sources(overrides: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let api_base_url = first_non_empty([
            overrides.api_url.clone(),
            std::env::var(ENV_API_URL).ok(),
            toml_config.api_base_url.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let access_token = first_non_empty([
            overrides.access_token.clone(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
            toml_config.access_token.clone(),
        ]);

        let timeout_secs = toml_config
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let config = Self {
            api_base_url: normalize_base_url(&api_base_url)?,
            request_timeout: Duration::from_secs(timeout_secs),
            access_token,
            logging: toml_config.logging.clone(),
        };

        debug!(
            api_base_url = %config.api_base_url,
            timeout_secs,
            has_token = config.access_token.is_some(),
            "Resolved client configuration"
        );

        Ok(config)
    }
}

/// Config file location: CLI path → `EEGWA_CONFIG` → `<config dir>/eegwa/config.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// Platform config file path (`~/.config/eegwa/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eegwa").join("config.toml"))
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            raw
        )));
    }
    Ok(trimmed.to_string())
}
