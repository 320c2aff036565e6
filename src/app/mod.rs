//! Translator state machine: actions, state, reducer and store wiring.

pub mod action;
pub mod environment;
pub mod middleware;
pub mod reducer;
pub mod state;

use std::sync::Arc;

pub use action::{ActionCategory, AppAction};
pub use environment::{Environment, Timing};
pub use middleware::{ActionLogger, Analytics, AnalyticsCounters};
pub use reducer::{debounce_keys, AppReducer, MIN_TRANSLATE_CHARS};
pub use state::AppState;

use crate::mvi::Logged;
use crate::store::{Middleware, Store};

/// Store running the app reducer.
pub type AppStore = Store<Logged<AppReducer>>;

/// Start the app store with the standard middleware.
///
/// `analytics` is shared so callers can read its counters.
pub fn build_store(env: Environment, initial: AppState, analytics: Arc<Analytics>) -> AppStore {
    let logger: Arc<dyn Middleware<AppState, AppAction>> = Arc::new(ActionLogger);
    let analytics: Arc<dyn Middleware<AppState, AppAction>> = analytics;
    let middleware = vec![logger, analytics];
    Store::with_middleware(Logged::new(AppReducer::new(env), "app"), initial, middleware)
}
