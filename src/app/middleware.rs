//! Logging and analytics hooks for the app store.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::app::action::AppAction;
use crate::app::state::AppState;
use crate::store::Middleware;

/// Traces every action with its category.
#[derive(Debug, Default)]
pub struct ActionLogger;

impl Middleware<AppState, AppAction> for ActionLogger {
    fn observe(&self, action: &AppAction, state: &AppState) {
        tracing::debug!(
            category = action.category().as_str(),
            side_effects = action.has_side_effects(),
            "{}",
            action
        );
        if !action.is_valid_for(state) {
            tracing::trace!(action = %action, "Action will be ignored in current state");
        }
    }
}

/// Snapshot of the analytics counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsCounters {
    pub translations_requested: u64,
    pub translations_succeeded: u64,
    pub translations_failed: u64,
    /// Failures that a plain retry may fix.
    pub transient_failures: u64,
    pub swaps: u64,
}

/// Counts user-facing events and reports them at info level.
#[derive(Debug, Default)]
pub struct Analytics {
    translations_requested: AtomicU64,
    translations_succeeded: AtomicU64,
    translations_failed: AtomicU64,
    transient_failures: AtomicU64,
    swaps: AtomicU64,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> AnalyticsCounters {
        AnalyticsCounters {
            translations_requested: self.translations_requested.load(Ordering::Relaxed),
            translations_succeeded: self.translations_succeeded.load(Ordering::Relaxed),
            translations_failed: self.translations_failed.load(Ordering::Relaxed),
            transient_failures: self.transient_failures.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
        }
    }
}

impl Middleware<AppState, AppAction> for Analytics {
    fn observe(&self, action: &AppAction, state: &AppState) {
        match action {
            // Only requests the reducer will act on.
            AppAction::Translate if action.is_valid_for(state) => {
                self.translations_requested.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    source = state.source_language.code(),
                    target = state.target_language.code(),
                    chars = state.source_text.chars().count(),
                    "Translation requested"
                );
            }
            AppAction::TranslationReceived(Ok(_)) => {
                self.translations_succeeded.fetch_add(1, Ordering::Relaxed);
            }
            AppAction::TranslationReceived(Err(err)) => {
                self.translations_failed.fetch_add(1, Ordering::Relaxed);
                if err.is_transient() {
                    self.transient_failures.fetch_add(1, Ordering::Relaxed);
                }
                tracing::info!(error = %err, transient = err.is_transient(), "Translation failed");
            }
            AppAction::SwapLanguages => {
                self.swaps.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    from = %state.language_pair(),
                    "Languages swapped"
                );
            }
            _ => {}
        }
    }
}
