//! Error taxonomy carried in application state.

use thiserror::Error;

/// Failure of a translation request.
///
/// Values of this type are stored in state and rendered in place of the
/// translation output. They are never raised across the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Transport failure (no connection, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Backend rejected the request or failed.
    #[error("API error: {0}")]
    Api(String),

    /// Backend answered with something we could not decode.
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Nothing to translate.
    #[error("Please enter text to translate")]
    EmptyInput,

    /// Backend does not support the language pair.
    #[error("This language pair is not supported")]
    UnsupportedLanguage,

    /// Backend throttled us.
    #[error("Too many requests. Please try again later")]
    RateLimitExceeded,
}

impl TranslationError {
    /// True for failures worth retrying without changing the input.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimitExceeded)
    }
}
