use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Translation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Base URL of the translation API (e.g., "https://ftapi.pythonanywhere.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Debounce windows and playback fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Quiet period after typing before auto-translating (default: 600).
    #[serde(default = "default_typing_debounce_ms")]
    pub typing_debounce_ms: u64,
    /// Quiet period after a language change or swap (default: 200).
    #[serde(default = "default_language_debounce_ms")]
    pub language_debounce_ms: u64,
    /// Clip length assumed when the real duration is unknown (default: 2000).
    #[serde(default = "default_audio_fallback_ms")]
    pub audio_fallback_ms: u64,
}

/// Where user preferences are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preferences file. Defaults to `preferences.toml` next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "https://ftapi.pythonanywhere.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_typing_debounce_ms() -> u64 {
    600
}

fn default_language_debounce_ms() -> u64 {
    200
}

fn default_audio_fallback_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TimingConfig {
    pub fn typing_debounce(&self) -> Duration {
        Duration::from_millis(self.typing_debounce_ms)
    }

    pub fn language_debounce(&self) -> Duration {
        Duration::from_millis(self.language_debounce_ms)
    }

    pub fn audio_fallback(&self) -> Duration {
        Duration::from_millis(self.audio_fallback_ms)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_debounce_ms: default_typing_debounce_ms(),
            language_debounce_ms: default_language_debounce_ms(),
            audio_fallback_ms: default_audio_fallback_ms(),
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
