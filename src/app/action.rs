//! Everything that can happen to the translator.

use std::collections::BTreeSet;
use std::fmt;

use crate::app::state::AppState;
use crate::error::TranslationError;
use crate::language::{Language, LanguagePair};
use crate::mvi::Action;

/// All actions that can be dispatched to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Text input
    /// User entered or modified the source text.
    UpdateSourceText(String),
    /// Clear both text fields.
    ClearText,
    /// Copy the translated text to the clipboard.
    CopyTranslation,

    // Translation
    /// Start a translation request.
    Translate,
    /// Translation response from the backend.
    TranslationReceived(Result<String, TranslationError>),

    // Language selection
    SelectSourceLanguage(Language),
    SelectTargetLanguage(Language),
    SwapLanguages,
    ToggleSourceLanguagePicker,
    ToggleTargetLanguagePicker,
    ToggleFavoriteLanguage(Language),
    SetFavoriteLanguages(BTreeSet<Language>),

    // Audio
    PlaySourceAudio,
    PlayTranslatedAudio,
    StopAudio,
    AudioPlaybackCompleted,
    ToggleAudioFeature,

    // Persistence and settings
    SaveLanguagePreferences,
    LoadLanguagePreferences,
    LanguagePreferencesLoaded(LanguagePair),
    SetSettingsPresented(bool),
    SetAutoTranslate(bool),
    LoadUserPreferences,
    UserPreferencesLoaded { auto_translate: bool },

    // Errors
    ClearError,
    SetError(TranslationError),

    // Lifecycle
    AppDidBecomeActive,
    AppWillResignActive,
}

impl Action for AppAction {}

/// Coarse grouping of actions, for logging and analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Input,
    Translation,
    Language,
    Audio,
    Persistence,
    Error,
    Lifecycle,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Translation => "translation",
            Self::Language => "language",
            Self::Audio => "audio",
            Self::Persistence => "persistence",
            Self::Error => "error",
            Self::Lifecycle => "lifecycle",
        }
    }
}

impl AppAction {
    pub fn category(&self) -> ActionCategory {
        match self {
            Self::UpdateSourceText(_) | Self::ClearText | Self::CopyTranslation => {
                ActionCategory::Input
            }
            Self::Translate | Self::TranslationReceived(_) => ActionCategory::Translation,
            Self::SelectSourceLanguage(_)
            | Self::SelectTargetLanguage(_)
            | Self::SwapLanguages
            | Self::ToggleSourceLanguagePicker
            | Self::ToggleTargetLanguagePicker
            | Self::ToggleFavoriteLanguage(_)
            | Self::SetFavoriteLanguages(_) => ActionCategory::Language,
            Self::PlaySourceAudio
            | Self::PlayTranslatedAudio
            | Self::StopAudio
            | Self::AudioPlaybackCompleted
            | Self::ToggleAudioFeature => ActionCategory::Audio,
            Self::SaveLanguagePreferences
            | Self::LoadLanguagePreferences
            | Self::LanguagePreferencesLoaded(_)
            | Self::SetSettingsPresented(_)
            | Self::SetAutoTranslate(_)
            | Self::LoadUserPreferences
            | Self::UserPreferencesLoaded { .. } => ActionCategory::Persistence,
            Self::ClearError | Self::SetError(_) => ActionCategory::Error,
            Self::AppDidBecomeActive | Self::AppWillResignActive => ActionCategory::Lifecycle,
        }
    }

    /// True for actions whose reduction starts I/O.
    pub fn has_side_effects(&self) -> bool {
        matches!(
            self,
            Self::Translate
                | Self::CopyTranslation
                | Self::PlaySourceAudio
                | Self::PlayTranslatedAudio
                | Self::SaveLanguagePreferences
                | Self::LoadLanguagePreferences
                | Self::LoadUserPreferences
                | Self::SetAutoTranslate(_)
        )
    }

    /// Whether the reducer will act on this action in `state`.
    ///
    /// Invalid actions are still dispatched; the reducer ignores them.
    pub fn is_valid_for(&self, state: &AppState) -> bool {
        match self {
            Self::Translate => state.can_translate(),
            Self::SwapLanguages => state.can_swap_languages(),
            Self::CopyTranslation => !state.translated_text.is_empty(),
            Self::PlaySourceAudio => !state.source_text.is_empty() && state.is_audio_enabled,
            Self::PlayTranslatedAudio => {
                !state.translated_text.is_empty() && state.is_audio_enabled
            }
            _ => true,
        }
    }
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 20;
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

impl fmt::Display for AppAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateSourceText(text) => write!(f, "updateSourceText({})", preview(text)),
            Self::TranslationReceived(Ok(text)) => {
                write!(f, "translationReceived(success: {})", preview(text))
            }
            Self::TranslationReceived(Err(err)) => write!(f, "translationReceived(failure: {})", err),
            Self::SelectSourceLanguage(lang) => write!(f, "selectSourceLanguage({})", lang),
            Self::SelectTargetLanguage(lang) => write!(f, "selectTargetLanguage({})", lang),
            Self::ToggleFavoriteLanguage(lang) => write!(f, "toggleFavoriteLanguage({})", lang),
            Self::SetFavoriteLanguages(langs) => {
                write!(f, "setFavoriteLanguages({} languages)", langs.len())
            }
            Self::LanguagePreferencesLoaded(pair) => write!(f, "languagePreferencesLoaded({})", pair),
            Self::SetSettingsPresented(presented) => write!(f, "setSettingsPresented({})", presented),
            Self::SetAutoTranslate(on) => write!(f, "setAutoTranslate({})", on),
            Self::UserPreferencesLoaded { auto_translate } => {
                write!(f, "userPreferencesLoaded(autoTranslate: {})", auto_translate)
            }
            Self::SetError(err) => write!(f, "setError({})", err),
            Self::ClearText => f.write_str("clearText"),
            Self::CopyTranslation => f.write_str("copyTranslation"),
            Self::Translate => f.write_str("translate"),
            Self::SwapLanguages => f.write_str("swapLanguages"),
            Self::ToggleSourceLanguagePicker => f.write_str("toggleSourceLanguagePicker"),
            Self::ToggleTargetLanguagePicker => f.write_str("toggleTargetLanguagePicker"),
            Self::PlaySourceAudio => f.write_str("playSourceAudio"),
            Self::PlayTranslatedAudio => f.write_str("playTranslatedAudio"),
            Self::StopAudio => f.write_str("stopAudio"),
            Self::AudioPlaybackCompleted => f.write_str("audioPlaybackCompleted"),
            Self::ToggleAudioFeature => f.write_str("toggleAudioFeature"),
            Self::SaveLanguagePreferences => f.write_str("saveLanguagePreferences"),
            Self::LoadLanguagePreferences => f.write_str("loadLanguagePreferences"),
            Self::LoadUserPreferences => f.write_str("loadUserPreferences"),
            Self::ClearError => f.write_str("clearError"),
            Self::AppDidBecomeActive => f.write_str("appDidBecomeActive"),
            Self::AppWillResignActive => f.write_str("appWillResignActive"),
        }
    }
}
