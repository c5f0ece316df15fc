use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::DetectorError;

/// Prediction endpoint used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Overrides `base_url`
pub const BASE_URL_ENV: &str = "EMOTION_API_URL";
/// Overrides `timeout_secs`
pub const TIMEOUT_ENV: &str = "EMOTION_API_TIMEOUT_SECS";

/// Settings for the prediction client and the session built on top of it.
///
/// Values are resolved in this order, later sources winning:
/// 1. built-in defaults
/// 2. a TOML file (see [`ClientConfig::default_config_path`])
/// 3. the `EMOTION_API_URL` / `EMOTION_API_TIMEOUT_SECS` environment variables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Request timeout; `None` keeps the HTTP client's default
    pub timeout_secs: Option<u64>,
    /// Whether still-photo results are appended to the history log
    pub record_photo_history: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            record_photo_history: false,
        }
    }
}

impl ClientConfig {
    /// Returns the platform config file location, if the platform has one
    pub fn default_config_path() -> Option<PathBuf> {
        // 1. Platform-specific config directory
        if let Some(config_dir) = dirs::config_dir() {
            return Some(config_dir.join("emotion-detector").join("config.toml"));
        }

        // 2. Fallback to the user's home directory
        dirs::home_dir().map(|home| home.join(".config").join("emotion-detector").join("config.toml"))
    }

    /// Parses a TOML config file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)
            .map_err(|e| DetectorError::ConfigError(format!("failed to read {:?}: {}", path, e)))?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolves the full configuration: file (explicit or default location) then environment.
    ///
    /// An explicit path must exist; the default location is skipped when absent.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self, DetectorError> {
        let base = match explicit_path {
            Some(path) => Self::load(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        base.apply_env_overrides()
    }

    /// Applies the process environment on top of this configuration
    pub fn apply_env_overrides(self) -> Result<Self, DetectorError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, DetectorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV) {
            if url.trim().is_empty() {
                return Err(DetectorError::ConfigError(format!("{} is set but empty", BASE_URL_ENV)));
            }
            log::info!("Using base URL from {}: {}", BASE_URL_ENV, url);
            self.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                DetectorError::ConfigError(format!("{} must be a whole number of seconds, got {:?}: {}", TIMEOUT_ENV, raw, e))
            })?;
            self.timeout_secs = Some(secs);
        }

        Ok(self)
    }

    /// Returns the configured request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
