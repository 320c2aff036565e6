use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the directory holding the config and preferences files.
    ///
    /// Uses `~/.config/quicktranslate` on Unix/macOS, or the equivalent on
    /// other platforms via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quicktranslate")
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The translation base URL is an absolute http(s) URL
    /// - The request timeout is non-zero
    /// - Both debounce windows are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.translation.base_url;
        let scheme_ok = Url::parse(base_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !scheme_ok {
            return Err(ConfigError::ValidationError {
                message: format!("Translation base_url '{}' is not an http(s) URL", base_url),
            });
        }

        if self.translation.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.timing.typing_debounce_ms == 0 || self.timing.language_debounce_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "Debounce windows must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Resolved path of the preferences file.
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("preferences.toml"))
    }
}
