//! Shared test utilities and mock services.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use async_trait::async_trait;
use parking_lot::Mutex;
use quicktranslate::app::{Environment, Timing};
use quicktranslate::error::TranslationError;
use quicktranslate::language::Language;
use quicktranslate::services::{
    FixedDurationPlayer, MemoryClipboard, MemoryPreferences, TranslationClient,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// A recorded call to [`MockTranslator::translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateCall {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

/// Translation client with canned answers.
///
/// Scripted results are returned first, in order. After that, known phrases
/// come from the dictionary and anything else is echoed as `[code] text`.
#[derive(Debug, Default)]
pub struct MockTranslator {
    dictionary: Mutex<HashMap<String, String>>,
    scripted: Mutex<VecDeque<Result<String, TranslationError>>>,
    calls: Mutex<Vec<TranslateCall>>,
    delay: Mutex<Duration>,
}

impl MockTranslator {
    pub fn new() -> Self {
        let translator = Self::default();
        translator.learn("Hello", "Hola");
        translator
    }

    pub fn learn(&self, text: &str, translation: &str) {
        self.dictionary
            .lock()
            .insert(text.to_string(), translation.to_string());
    }

    pub fn script(&self, result: Result<String, TranslationError>) {
        self.scripted.lock().push_back(result);
    }

    /// Every call now takes `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> Vec<TranslateCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TranslationClient for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        self.calls.lock().push(TranslateCall {
            text: text.to_string(),
            source,
            target,
        });

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(result) = self.scripted.lock().pop_front() {
            return result;
        }
        let known = self.dictionary.lock().get(text).cloned();
        Ok(known.unwrap_or_else(|| format!("[{}] {}", target.code(), text)))
    }
}

/// Handles to the in-memory services behind a test [`Environment`].
pub struct TestServices {
    pub translator: Arc<MockTranslator>,
    pub preferences: Arc<MemoryPreferences>,
    pub clipboard: Arc<MemoryClipboard>,
    pub audio: Arc<FixedDurationPlayer>,
}

/// Clip length of the test audio player.
pub const AUDIO_CLIP: Duration = Duration::from_millis(2000);

/// Environment backed entirely by in-memory services, with default timings.
pub fn test_env() -> (Environment, TestServices) {
    let services = TestServices {
        translator: Arc::new(MockTranslator::new()),
        preferences: Arc::new(MemoryPreferences::new()),
        clipboard: Arc::new(MemoryClipboard::new()),
        audio: Arc::new(FixedDurationPlayer::new(AUDIO_CLIP)),
    };
    let env = Environment {
        translator: services.translator.clone(),
        preferences: services.preferences.clone(),
        audio: services.audio.clone(),
        clipboard: services.clipboard.clone(),
        timing: Timing::default(),
    };
    (env, services)
}
