//! Text-to-speech playback boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;
use tokio::sync::Notify;

use crate::language::Language;

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("Invalid audio URL: {0}")]
    InvalidUrl(String),

    #[error("Playback interrupted")]
    Interrupted,
}

/// Plays speech audio from a URL.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Start playback and resolve once it has finished.
    async fn play(&self, url: &str) -> Result<(), AudioError>;

    /// Stop whatever is playing.
    fn stop(&self);
}

/// Speech synthesis endpoint for `text` spoken in `language`.
pub fn tts_url(text: &str, language: Language) -> Result<Url, AudioError> {
    Url::parse_with_params(
        TTS_ENDPOINT,
        &[
            ("ie", "UTF-8"),
            ("client", "tw-ob"),
            ("tl", language.code()),
            ("q", text),
        ],
    )
    .map_err(|e| AudioError::InvalidUrl(e.to_string()))
}

/// Player without an audio device: each clip "plays" for a fixed duration.
///
/// Stands in for real playback where the clip length is unknown.
#[derive(Debug)]
pub struct FixedDurationPlayer {
    duration: Duration,
    stop: Notify,
}

impl FixedDurationPlayer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            stop: Notify::new(),
        }
    }
}

#[async_trait]
impl AudioPlayer for FixedDurationPlayer {
    async fn play(&self, url: &str) -> Result<(), AudioError> {
        tracing::debug!(url, duration_ms = self.duration.as_millis() as u64, "Playing audio");
        tokio::select! {
            _ = tokio::time::sleep(self.duration) => Ok(()),
            _ = self.stop.notified() => Err(AudioError::Interrupted),
        }
    }

    fn stop(&self) {
        self.stop.notify_waiters();
    }
}
