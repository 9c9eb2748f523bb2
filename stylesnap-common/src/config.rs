//! Configuration loading and API endpoint resolution
//!
//! The catalog service URL is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`STYLESNAP_API_URL`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never aborts start-up. The loader logs a
//! warning and continues with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Compiled default catalog service URL (Flask development server)
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Environment variable overriding the catalog service URL
pub const API_URL_ENV: &str = "STYLESNAP_API_URL";

/// Default EventBus capacity for an interactive client
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Log level used until the config file has been read
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracing targets of the StyleSnap crates
pub const LOG_TARGETS: [&str; 3] = ["stylesnap", "stylesnap_client", "stylesnap_common"];

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Catalog service base URL (optional)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds. Unset means no client-side timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// EventBus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// `EnvFilter` directives enabling `level` for every StyleSnap crate
pub fn log_directives(level: &str) -> String {
    let level = level.trim();
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: None,
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Platform config file location: `<config_dir>/stylesnap/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stylesnap").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load TOML config with graceful degradation
///
/// Uses `explicit` when given, otherwise the platform default location.
/// Any failure yields `TomlConfig::default()`.
pub fn load_or_default(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return TomlConfig::default();
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file not found: {}, using defaults", path.display());
        }
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            TomlConfig::default()
        }
    }
}

/// Validate and normalize a catalog service base URL
///
/// Requires an `http://` or `https://` scheme and a non-empty host.
/// Trailing slashes are stripped so endpoint paths can be appended.
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            Error::InvalidInput(format!("API URL must start with http:// or https://: {}", raw))
        })?;

    if rest.is_empty() {
        return Err(Error::InvalidInput(format!("API URL has no host: {}", raw)));
    }

    Ok(trimmed.to_string())
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Normalized catalog service base URL
    pub api_url: String,
    /// Optional per-request timeout
    pub request_timeout: Option<Duration>,
    /// EventBus channel capacity
    pub event_capacity: usize,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
}

impl ClientConfig {
    /// Resolve configuration from CLI argument, environment, TOML and defaults
    pub fn resolve(cli_api_url: Option<&str>, toml: &TomlConfig) -> Result<Self> {
        let (source, raw) = if let Some(url) = cli_api_url {
            ("command line", url.to_string())
        } else if let Ok(url) = std::env::var(API_URL_ENV) {
            ("environment", url)
        } else if let Some(url) = &toml.api_url {
            ("TOML", url.clone())
        } else {
            ("compiled default", DEFAULT_API_URL.to_string())
        };

        let api_url = normalize_api_url(&raw)?;
        info!("API URL resolved from {}: {}", source, api_url);

        if toml.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }

        Ok(Self {
            api_url,
            request_timeout: toml.request_timeout_secs.map(Duration::from_secs),
            event_capacity: toml.event_capacity,
            log_level: toml.logging.level.clone(),
        })
    }
}
