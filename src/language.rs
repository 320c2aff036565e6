//! Supported languages and related value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TranslationError;

/// A language the translation backend understands.
///
/// Serialized as its ISO 639-1 code; the code is what gets persisted and
/// sent on the wire, so never change an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    /// All variants, in picker order.
    pub const ALL: [Language; 12] = [
        Self::English,
        Self::Spanish,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Portuguese,
        Self::Russian,
        Self::Chinese,
        Self::Japanese,
        Self::Korean,
        Self::Arabic,
        Self::Hindi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::Chinese => "zh",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Arabic => "ar",
            Self::Hindi => "hi",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Portuguese => "Portuguese",
            Self::Russian => "Russian",
            Self::Chinese => "Chinese",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Arabic => "Arabic",
            Self::Hindi => "Hindi",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::English => "\u{1F1EC}\u{1F1E7}",
            Self::Spanish => "\u{1F1EA}\u{1F1F8}",
            Self::French => "\u{1F1EB}\u{1F1F7}",
            Self::German => "\u{1F1E9}\u{1F1EA}",
            Self::Italian => "\u{1F1EE}\u{1F1F9}",
            Self::Portuguese => "\u{1F1F5}\u{1F1F9}",
            Self::Russian => "\u{1F1F7}\u{1F1FA}",
            Self::Chinese => "\u{1F1E8}\u{1F1F3}",
            Self::Japanese => "\u{1F1EF}\u{1F1F5}",
            Self::Korean => "\u{1F1F0}\u{1F1F7}",
            Self::Arabic => "\u{1F1F8}\u{1F1E6}",
            Self::Hindi => "\u{1F1EE}\u{1F1F3}",
        }
    }

    /// Parse from a persisted code. Unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    /// Accepts a code (`"es"`) or a display name (`"spanish"`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s) || lang.display_name().eq_ignore_ascii_case(s))
            .ok_or(TranslationError::UnsupportedLanguage)
    }
}

/// Source/target pair, as persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}

/// Which side's text is currently being spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioPlayback {
    Source,
    Target,
}
