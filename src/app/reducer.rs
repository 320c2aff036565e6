//! State transitions for the translator.

use std::sync::Arc;
use std::time::Duration;

use crate::app::action::AppAction;
use crate::app::environment::Environment;
use crate::app::state::AppState;
use crate::effect::Effect;
use crate::language::{AudioPlayback, Language, LanguagePair};
use crate::mvi::Reducer;
use crate::services::preferences::{self, keys, PreferenceError, PreferenceValue};
use crate::services::{tts_url, AudioError};

/// Debounce keys. One pending auto-translate per key.
pub mod debounce_keys {
    pub const TYPING: &str = "autoTranslate.typing";
    pub const LANGUAGE_CHANGE: &str = "autoTranslate.languageChange";
    pub const SWAP: &str = "autoTranslate.swap";
    pub const AUTO_TRANSLATE_TOGGLE: &str = "autoTranslate";
}

/// Shorter input is never sent to the backend.
pub const MIN_TRANSLATE_CHARS: usize = 2;

/// Reducer for [`AppState`].
///
/// Pure: all I/O is described as effects that capture clones of the
/// environment's services.
#[derive(Debug, Clone)]
pub struct AppReducer {
    env: Environment,
}

impl AppReducer {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    fn translate(&self, state: &AppState) -> Effect<AppAction> {
        let translator = Arc::clone(&self.env.translator);
        let text = state.source_text.clone();
        let (source, target) = (state.source_language, state.target_language);
        Effect::task(
            async move { translator.translate(&text, source, target).await },
            |translation| AppAction::TranslationReceived(Ok(translation)),
            |err| AppAction::TranslationReceived(Err(err)),
        )
    }

    fn auto_translate(&self, state: &AppState, key: &'static str, after: Duration) -> Effect<AppAction> {
        if state.is_auto_translate_enabled && !state.source_text.is_empty() {
            Effect::debounce(key, after, || AppAction::Translate)
        } else {
            Effect::none()
        }
    }

    fn speak(&self, text: String, language: Language) -> Effect<AppAction> {
        let audio = Arc::clone(&self.env.audio);
        Effect::task(
            async move {
                let url = tts_url(&text, language)?;
                audio.play(url.as_str()).await
            },
            |()| AppAction::AudioPlaybackCompleted,
            |err: AudioError| {
                tracing::debug!(error = %err, "Audio playback ended early");
                AppAction::AudioPlaybackCompleted
            },
        )
    }

    fn save_languages(&self, state: &AppState, pair: LanguagePair) -> Effect<AppAction> {
        let store = Arc::clone(&self.env.preferences);
        let favorites = state.favorite_languages.clone();
        Effect::fire_and_forget(async move {
            preferences::write_languages(store.as_ref(), pair, &favorites)
        })
    }

    fn load_languages(&self) -> Effect<AppAction> {
        let store = Arc::clone(&self.env.preferences);
        Effect::sequence(async move {
            // Pair first: a favorites update triggers a save of the current pair.
            let mut loaded = Vec::with_capacity(2);
            if let Some(pair) = preferences::read_language_pair(store.as_ref())? {
                loaded.push(AppAction::LanguagePreferencesLoaded(pair));
            }
            if let Some(favorites) = preferences::read_favorites(store.as_ref())? {
                loaded.push(AppAction::SetFavoriteLanguages(favorites));
            }
            Ok::<_, PreferenceError>(loaded)
        })
    }

    fn save_auto_translate(&self, enabled: bool) -> Effect<AppAction> {
        let store = Arc::clone(&self.env.preferences);
        Effect::fire_and_forget(async move {
            store.set(keys::AUTO_TRANSLATE_ENABLED, PreferenceValue::Flag(enabled))
        })
    }

    fn load_user_preferences(&self) -> Effect<AppAction> {
        let store = Arc::clone(&self.env.preferences);
        Effect::future(async move {
            let auto_translate = preferences::read_auto_translate(store.as_ref())?;
            Ok::<_, PreferenceError>(
                auto_translate.map(|auto_translate| AppAction::UserPreferencesLoaded { auto_translate }),
            )
        })
    }

    fn copy(&self, text: String) -> Effect<AppAction> {
        let clipboard = Arc::clone(&self.env.clipboard);
        Effect::fire_and_forget(async move { clipboard.set_text(&text) })
    }

    fn stop_audio(&self) -> Effect<AppAction> {
        let audio = Arc::clone(&self.env.audio);
        Effect::fire_and_forget(async move {
            audio.stop();
            Ok::<(), AudioError>(())
        })
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;

    fn reduce(&self, mut state: AppState, action: AppAction) -> (AppState, Effect<AppAction>) {
        let timing = self.env.timing;

        let effect = match action {
            AppAction::UpdateSourceText(text) => {
                state.source_text = text;
                state.error = None;
                // The in-flight request is not cancelled, only forgotten.
                state.is_loading = false;

                if state.source_text.is_empty() {
                    state.translated_text.clear();
                    Effect::none()
                } else {
                    self.auto_translate(&state, debounce_keys::TYPING, timing.typing_debounce)
                }
            }
            AppAction::ClearText => {
                state.source_text.clear();
                state.translated_text.clear();
                state.error = None;
                Effect::none()
            }
            AppAction::CopyTranslation => {
                if state.translated_text.is_empty() {
                    Effect::none()
                } else {
                    self.copy(state.translated_text.clone())
                }
            }

            AppAction::Translate => {
                // A debounce may fire after the input became invalid.
                // Counts chars, not grapheme clusters: a multi-codepoint emoji passes.
                if !state.can_translate() || state.source_text.chars().count() < MIN_TRANSLATE_CHARS {
                    return (state, Effect::none());
                }
                state.is_loading = true;
                state.error = None;
                self.translate(&state)
            }
            AppAction::TranslationReceived(result) => {
                state.is_loading = false;
                match result {
                    Ok(translation) => {
                        state.translated_text = translation;
                        state.error = None;
                    }
                    Err(err) => {
                        state.error = Some(err);
                        state.translated_text.clear();
                    }
                }
                Effect::none()
            }

            AppAction::SelectSourceLanguage(language) => {
                state.source_language = language;
                state.is_showing_source_picker = false;
                state.translated_text.clear();
                Effect::batch([
                    Effect::immediate(AppAction::SaveLanguagePreferences),
                    self.auto_translate(&state, debounce_keys::LANGUAGE_CHANGE, timing.language_debounce),
                ])
            }
            AppAction::SelectTargetLanguage(language) => {
                state.target_language = language;
                state.is_showing_target_picker = false;
                state.translated_text.clear();
                Effect::batch([
                    Effect::immediate(AppAction::SaveLanguagePreferences),
                    self.auto_translate(&state, debounce_keys::LANGUAGE_CHANGE, timing.language_debounce),
                ])
            }
            AppAction::SwapLanguages => {
                std::mem::swap(&mut state.source_language, &mut state.target_language);
                if !state.translated_text.is_empty() {
                    std::mem::swap(&mut state.source_text, &mut state.translated_text);
                }
                tracing::trace!(pair = %state.language_pair(), "Languages swapped");
                Effect::batch([
                    Effect::immediate(AppAction::SaveLanguagePreferences),
                    self.auto_translate(&state, debounce_keys::SWAP, timing.language_debounce),
                ])
            }
            AppAction::ToggleSourceLanguagePicker => {
                state.is_showing_source_picker = !state.is_showing_source_picker;
                state.is_showing_target_picker = false;
                Effect::none()
            }
            AppAction::ToggleTargetLanguagePicker => {
                state.is_showing_target_picker = !state.is_showing_target_picker;
                state.is_showing_source_picker = false;
                Effect::none()
            }
            AppAction::ToggleFavoriteLanguage(language) => {
                if !state.favorite_languages.remove(&language) {
                    state.favorite_languages.insert(language);
                }
                Effect::immediate(AppAction::SaveLanguagePreferences)
            }
            AppAction::SetFavoriteLanguages(languages) => {
                state.favorite_languages = languages;
                Effect::immediate(AppAction::SaveLanguagePreferences)
            }

            AppAction::PlaySourceAudio => {
                if state.source_text.is_empty() || !state.is_audio_enabled {
                    return (state, Effect::none());
                }
                state.playing_audio = Some(AudioPlayback::Source);
                self.speak(state.source_text.clone(), state.source_language)
            }
            AppAction::PlayTranslatedAudio => {
                if state.translated_text.is_empty() || !state.is_audio_enabled {
                    return (state, Effect::none());
                }
                state.playing_audio = Some(AudioPlayback::Target);
                self.speak(state.translated_text.clone(), state.target_language)
            }
            AppAction::StopAudio => {
                state.playing_audio = None;
                self.stop_audio()
            }
            AppAction::AudioPlaybackCompleted => {
                state.playing_audio = None;
                Effect::none()
            }
            AppAction::ToggleAudioFeature => {
                state.is_audio_enabled = !state.is_audio_enabled;
                if !state.is_audio_enabled {
                    state.playing_audio = None;
                }
                Effect::none()
            }

            AppAction::SaveLanguagePreferences => {
                let pair = state.language_pair();
                state.last_used_pair = Some(pair);
                self.save_languages(&state, pair)
            }
            AppAction::LoadLanguagePreferences => self.load_languages(),
            AppAction::LanguagePreferencesLoaded(pair) => {
                state.source_language = pair.source;
                state.target_language = pair.target;
                state.last_used_pair = Some(pair);
                Effect::none()
            }
            AppAction::SetSettingsPresented(presented) => {
                state.is_settings_presented = presented;
                Effect::none()
            }
            AppAction::SetAutoTranslate(enabled) => {
                state.is_auto_translate_enabled = enabled;
                Effect::batch([
                    self.save_auto_translate(enabled),
                    self.auto_translate(
                        &state,
                        debounce_keys::AUTO_TRANSLATE_TOGGLE,
                        timing.language_debounce,
                    ),
                ])
            }
            AppAction::LoadUserPreferences => self.load_user_preferences(),
            AppAction::UserPreferencesLoaded { auto_translate } => {
                state.is_auto_translate_enabled = auto_translate;
                Effect::none()
            }

            AppAction::ClearError => {
                state.error = None;
                Effect::none()
            }
            AppAction::SetError(err) => {
                state.error = Some(err);
                state.is_loading = false;
                Effect::none()
            }

            AppAction::AppDidBecomeActive => Effect::batch([
                Effect::immediate(AppAction::LoadLanguagePreferences),
                Effect::immediate(AppAction::LoadUserPreferences),
            ]),
            AppAction::AppWillResignActive => Effect::immediate(AppAction::SaveLanguagePreferences),
        };

        (state, effect)
    }
}
