//! Application state snapshot.

use std::collections::BTreeSet;

use crate::error::TranslationError;
use crate::language::{AudioPlayback, Language, LanguagePair};
use crate::mvi::State;
use crate::services::preferences::{self, PreferenceError, PreferenceStore};

/// The single source of truth for the translator.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Text entered by the user.
    pub source_text: String,
    /// Translation received from the backend.
    pub translated_text: String,
    pub source_language: Language,
    pub target_language: Language,

    /// A translation request is in flight.
    pub is_loading: bool,
    /// Last failure; shown in place of the translation output.
    pub error: Option<TranslationError>,
    pub is_showing_source_picker: bool,
    pub is_showing_target_picker: bool,
    pub is_settings_presented: bool,

    pub favorite_languages: BTreeSet<Language>,
    /// Pair last written to preferences.
    pub last_used_pair: Option<LanguagePair>,

    pub is_audio_enabled: bool,
    pub playing_audio: Option<AudioPlayback>,
    pub is_auto_translate_enabled: bool,
}

impl State for AppState {}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            translated_text: String::new(),
            source_language: Language::English,
            target_language: Language::Spanish,
            is_loading: false,
            error: None,
            is_showing_source_picker: false,
            is_showing_target_picker: false,
            is_settings_presented: false,
            favorite_languages: BTreeSet::new(),
            last_used_pair: None,
            is_audio_enabled: true,
            playing_audio: None,
            is_auto_translate_enabled: true,
        }
    }
}

impl AppState {
    /// Initial state seeded from persisted preferences.
    pub fn from_preferences(store: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        let mut state = Self::default();
        if let Some(pair) = preferences::read_language_pair(store)? {
            state.source_language = pair.source;
            state.target_language = pair.target;
            state.last_used_pair = Some(pair);
        }
        if let Some(favorites) = preferences::read_favorites(store)? {
            state.favorite_languages = favorites;
        }
        if let Some(auto_translate) = preferences::read_auto_translate(store)? {
            state.is_auto_translate_enabled = auto_translate;
        }
        Ok(state)
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language, self.target_language)
    }

    pub fn can_translate(&self) -> bool {
        !self.source_text.is_empty() && !self.is_loading && self.source_language != self.target_language
    }

    pub fn can_swap_languages(&self) -> bool {
        !self.is_loading
    }

    /// Favorites sorted by display name.
    pub fn sorted_favorite_languages(&self) -> Vec<Language> {
        let mut favorites: Vec<_> = self.favorite_languages.iter().copied().collect();
        favorites.sort_by_key(|lang| lang.display_name());
        favorites
    }

    /// Languages not marked as favorite, in picker order.
    pub fn non_favorite_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| !self.favorite_languages.contains(lang))
            .collect()
    }

    /// What the output area shows: the error if one is set, else the translation.
    pub fn displayed_output(&self) -> String {
        match &self.error {
            Some(err) => err.to_string(),
            None => self.translated_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::preferences::{keys, MemoryPreferences, PreferenceValue};

    #[test]
    fn defaults_match_first_launch() {
        let state = AppState::default();
        assert_eq!(state.language_pair(), LanguagePair::new(Language::English, Language::Spanish));
        assert!(state.is_audio_enabled);
        assert!(state.is_auto_translate_enabled);
        assert!(!state.can_translate());
    }

    #[test]
    fn can_translate_requires_distinct_languages() {
        let state = AppState {
            source_text: "Hello".into(),
            target_language: Language::English,
            ..AppState::default()
        };
        assert!(!state.can_translate());
    }

    #[test]
    fn favorites_partition_languages() {
        let state = AppState {
            favorite_languages: BTreeSet::from([Language::Spanish, Language::Arabic, Language::German]),
            ..AppState::default()
        };
        assert_eq!(
            state.sorted_favorite_languages(),
            vec![Language::Arabic, Language::German, Language::Spanish]
        );
        let rest = state.non_favorite_languages();
        assert_eq!(rest.len(), Language::ALL.len() - 3);
        assert!(!rest.contains(&Language::Spanish));
    }

    #[test]
    fn error_replaces_output() {
        let mut state = AppState {
            translated_text: "Hola".into(),
            ..AppState::default()
        };
        assert_eq!(state.displayed_output(), "Hola");
        state.error = Some(TranslationError::RateLimitExceeded);
        assert_eq!(state.displayed_output(), "Too many requests. Please try again later");
    }

    #[test]
    fn seeded_from_preferences() {
        let store = MemoryPreferences::new();
        store.set(keys::SOURCE_LANGUAGE, PreferenceValue::Text("de".into())).unwrap();
        store.set(keys::TARGET_LANGUAGE, PreferenceValue::Text("ja".into())).unwrap();
        store.set(keys::AUTO_TRANSLATE_ENABLED, PreferenceValue::Flag(false)).unwrap();
        store
            .set(keys::FAVORITE_LANGUAGES, PreferenceValue::List(vec!["fr".into()]))
            .unwrap();

        let state = AppState::from_preferences(&store).unwrap();
        assert_eq!(state.source_language, Language::German);
        assert_eq!(state.target_language, Language::Japanese);
        assert_eq!(state.last_used_pair, Some(LanguagePair::new(Language::German, Language::Japanese)));
        assert!(!state.is_auto_translate_enabled);
        assert_eq!(state.favorite_languages, BTreeSet::from([Language::French]));
    }
}
