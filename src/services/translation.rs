//! Translation backend client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::config::TranslationConfig;
use crate::error::TranslationError;
use crate::language::Language;

/// Anything that can translate text.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Translate `text` from `source` to `target`.
    ///
    /// Implementations must reject text that is empty after trimming with
    /// [`TranslationError::EmptyInput`] without contacting the backend.
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError>;
}

/// Response body of the `/translate` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TranslationResponse {
    pub source_language: String,
    pub source_text: String,
    pub destination_language: String,
    pub destination_text: String,
    #[serde(default)]
    pub pronunciation: Option<Pronunciation>,
    #[serde(default)]
    pub see_also: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pronunciation {
    #[serde(default)]
    pub source_text_phonetic: Option<String>,
    #[serde(default)]
    pub source_text_audio: Option<String>,
    #[serde(default)]
    pub destination_text_audio: Option<String>,
}

/// Client for the HTTP translation API (`GET {base}/translate?sl=&dl=&text=`).
#[derive(Debug, Clone)]
pub struct HttpTranslationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranslationClient {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| TranslationError::Api(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, text: &str, source: Language, target: Language) -> Result<Url, TranslationError> {
        Url::parse_with_params(
            &format!("{}/translate", self.base_url),
            &[("sl", source.code()), ("dl", target.code()), ("text", text)],
        )
        .map_err(|_| TranslationError::Api("Failed to build URL".to_string()))
    }
}

#[async_trait]
impl TranslationClient for HttpTranslationClient {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let url = self.endpoint(text, source, target)?;
        tracing::debug!(source = source.code(), target = target.code(), chars = text.chars().count(), "Sending translation request");

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Translation request failed");
            transport_error(&e)
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| transport_error(&e))?;
        tracing::trace!(status, bytes = body.len(), "Translation response received");

        match status {
            200 => decode_translation(&body),
            403 => Err(TranslationError::Api("Access forbidden".to_string())),
            429 => Err(TranslationError::RateLimitExceeded),
            400..=499 => Err(TranslationError::Api(format!(
                "Invalid request (Status: {})",
                status
            ))),
            500..=599 => Err(TranslationError::Api("Server error".to_string())),
            other => Err(TranslationError::Api(format!("Unexpected status: {}", other))),
        }
    }
}

fn transport_error(err: &reqwest::Error) -> TranslationError {
    if err.is_timeout() {
        TranslationError::Network("Request timed out".to_string())
    } else if err.is_connect() {
        TranslationError::Network("No connection to translation service".to_string())
    } else {
        TranslationError::Network(err.to_string())
    }
}

/// Extract the translated text from a 200 response body.
///
/// Falls back to a loose lookup of `destination-text` when the body does
/// not match the full response schema.
pub fn decode_translation(body: &[u8]) -> Result<String, TranslationError> {
    match serde_json::from_slice::<TranslationResponse>(body) {
        Ok(response) => {
            if let Some(pronunciation) = &response.pronunciation {
                tracing::trace!(
                    source_audio = pronunciation.source_text_audio.as_deref(),
                    destination_audio = pronunciation.destination_text_audio.as_deref(),
                    "Pronunciation available"
                );
            }
            Ok(response.destination_text)
        }
        Err(err) => {
            tracing::debug!(error = %err, "Strict decode failed, trying loose lookup");
            serde_json::from_slice::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("destination-text")
                        .and_then(|text| text.as_str())
                        .map(str::to_string)
                })
                .ok_or(TranslationError::InvalidResponse)
        }
    }
}
