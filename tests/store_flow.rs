mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use common::{test_env, TestServices, AUDIO_CLIP};
use parking_lot::Mutex;
use quicktranslate::app::{build_store, Analytics, AppAction, AppState, AppStore};
use quicktranslate::error::TranslationError;
use quicktranslate::language::{AudioPlayback, Language};
use quicktranslate::services::preferences::keys;
use quicktranslate::services::{PreferenceStore, PreferenceValue};

fn start(initial: AppState) -> (AppStore, TestServices, Arc<Analytics>) {
    let (env, services) = test_env();
    let analytics = Arc::new(Analytics::new());
    let store = build_store(env, initial, Arc::clone(&analytics));
    (store, services, analytics)
}

#[tokio::test(start_paused = true)]
async fn typing_hello_translates_to_hola() {
    let (store, services, analytics) = start(AppState::default());

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    store.settled().await;

    let state = store.state();
    assert_eq!(state.translated_text, "Hola");
    assert!(!state.is_loading);
    assert_eq!(state.error, None);

    let calls = services.translator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "Hello");
    assert_eq!(calls[0].source, Language::English);
    assert_eq!(calls[0].target, Language::Spanish);

    let counters = analytics.counters();
    assert_eq!(counters.translations_requested, 1);
    assert_eq!(counters.translations_succeeded, 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_translates_once_after_last_keystroke() {
    let (store, services, _) = start(AppState::default());

    store.dispatch(AppAction::UpdateSourceText("H".into()));
    tokio::time::sleep(Duration::from_millis(300)).await;
    store.dispatch(AppAction::UpdateSourceText("He".into()));
    tokio::time::sleep(Duration::from_millis(300)).await;
    store.dispatch(AppAction::UpdateSourceText("Hel".into()));

    tokio::time::sleep(Duration::from_millis(599)).await;
    assert_eq!(services.translator.call_count(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(services.translator.call_count(), 1);

    store.settled().await;
    assert_eq!(services.translator.call_count(), 1);
    assert_eq!(services.translator.calls()[0].text, "Hel");
    assert_eq!(store.state().translated_text, "[es] Hel");
}

#[tokio::test(start_paused = true)]
async fn failure_is_shown_until_next_success() {
    let (store, services, analytics) = start(AppState::default());
    services
        .translator
        .script(Err(TranslationError::RateLimitExceeded));

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    store.settled().await;

    let state = store.state();
    assert_eq!(state.error, Some(TranslationError::RateLimitExceeded));
    assert!(state.translated_text.is_empty());
    assert!(!state.is_loading);
    assert_eq!(state.displayed_output(), "Too many requests. Please try again later");
    assert_eq!(analytics.counters().translations_failed, 1);
    assert_eq!(analytics.counters().transient_failures, 1);

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    store.settled().await;
    assert_eq!(store.state().error, None);
    assert_eq!(store.state().displayed_output(), "Hola");
}

#[tokio::test(start_paused = true)]
async fn swap_retranslates_swapped_text() {
    let (store, services, _) = start(AppState::default());
    services.translator.learn("Hola", "Hello");

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    store.settled().await;
    store.dispatch(AppAction::SwapLanguages);
    store.settled().await;

    let state = store.state();
    assert_eq!(state.source_language, Language::Spanish);
    assert_eq!(state.source_text, "Hola");
    assert_eq!(state.translated_text, "Hello");
    assert_eq!(services.translator.call_count(), 2);

    assert_eq!(
        services.preferences.get(keys::SOURCE_LANGUAGE).unwrap(),
        Some(PreferenceValue::Text("es".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn becoming_active_restores_preferences() {
    let (env, services) = test_env();
    services
        .preferences
        .set(keys::SOURCE_LANGUAGE, PreferenceValue::Text("de".into()))
        .unwrap();
    services
        .preferences
        .set(keys::TARGET_LANGUAGE, PreferenceValue::Text("ja".into()))
        .unwrap();
    services
        .preferences
        .set(
            keys::FAVORITE_LANGUAGES,
            PreferenceValue::List(vec!["fr".into(), "ko".into()]),
        )
        .unwrap();
    services
        .preferences
        .set(keys::AUTO_TRANSLATE_ENABLED, PreferenceValue::Flag(false))
        .unwrap();
    let store = build_store(env, AppState::default(), Arc::new(Analytics::new()));

    store.dispatch(AppAction::AppDidBecomeActive);
    store.settled().await;

    let state = store.state();
    assert_eq!(state.source_language, Language::German);
    assert_eq!(state.target_language, Language::Japanese);
    assert_eq!(
        state.favorite_languages,
        BTreeSet::from([Language::French, Language::Korean])
    );
    assert!(!state.is_auto_translate_enabled);

    // Restoring favorites saves again; the restored pair must survive it.
    assert_eq!(
        services.preferences.get(keys::SOURCE_LANGUAGE).unwrap(),
        Some(PreferenceValue::Text("de".into()))
    );
    assert_eq!(
        services.preferences.get(keys::TARGET_LANGUAGE).unwrap(),
        Some(PreferenceValue::Text("ja".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn settings_are_persisted() {
    let (store, services, _) = start(AppState::default());

    store.dispatch(AppAction::SetAutoTranslate(false));
    store.dispatch(AppAction::SelectTargetLanguage(Language::Portuguese));
    store.dispatch(AppAction::ToggleFavoriteLanguage(Language::Arabic));
    store.dispatch(AppAction::AppWillResignActive);
    store.settled().await;

    let saved = services.preferences.snapshot();
    assert_eq!(
        saved.get(keys::AUTO_TRANSLATE_ENABLED),
        Some(&PreferenceValue::Flag(false))
    );
    assert_eq!(
        saved.get(keys::TARGET_LANGUAGE),
        Some(&PreferenceValue::Text("pt".into()))
    );
    assert_eq!(
        saved.get(keys::FAVORITE_LANGUAGES),
        Some(&PreferenceValue::List(vec!["ar".into()]))
    );
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_auto_translate() {
    let (store, services, _) = start(AppState::default());

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.runner().debounce().len(), 1);

    store.reset(AppState::default());
    store.settled().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(services.translator.call_count(), 0);
    assert_eq!(store.state(), AppState::default());
}

#[tokio::test(start_paused = true)]
async fn copy_writes_clipboard() {
    let (store, services, _) = start(AppState {
        source_text: "Hello".into(),
        translated_text: "Hola".into(),
        ..AppState::default()
    });

    store.dispatch(AppAction::CopyTranslation);
    store.settled().await;
    assert_eq!(services.clipboard.contents().as_deref(), Some("Hola"));
}

#[tokio::test(start_paused = true)]
async fn playback_completes_after_clip() {
    let (store, _, _) = start(AppState {
        source_text: "Hello".into(),
        translated_text: "Hola".into(),
        ..AppState::default()
    });

    store.dispatch(AppAction::PlayTranslatedAudio);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.state().playing_audio, Some(AudioPlayback::Target));

    tokio::time::sleep(AUDIO_CLIP).await;
    store.settled().await;
    assert_eq!(store.state().playing_audio, None);
}

#[tokio::test(start_paused = true)]
async fn stop_interrupts_playback() {
    let (store, _, _) = start(AppState {
        source_text: "Hello".into(),
        ..AppState::default()
    });
    let started = tokio::time::Instant::now();

    store.dispatch(AppAction::PlaySourceAudio);
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.dispatch(AppAction::StopAudio);
    store.settled().await;

    assert_eq!(store.state().playing_audio, None);
    assert!(started.elapsed() < AUDIO_CLIP);
}

#[tokio::test(start_paused = true)]
async fn observers_see_loading_then_result() {
    let (store, services, _) = start(AppState::default());
    services.translator.set_delay(Duration::from_millis(500));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state: &AppState| {
        sink.lock().push((state.is_loading, state.translated_text.clone()));
    });

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    store.settled().await;

    let seen = seen.lock().clone();
    assert!(seen.contains(&(true, String::new())));
    assert_eq!(seen.last(), Some(&(false, "Hola".to_string())));
}

#[tokio::test(start_paused = true)]
async fn dispatch_after_shutdown_is_dropped() {
    let (store, _, _) = start(AppState::default());
    store.shutdown();
    store.settled().await;
    assert!(store.is_closed());

    store.dispatch(AppAction::UpdateSourceText("Hello".into()));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.state(), AppState::default());
}
