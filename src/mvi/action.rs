//! Base trait for actions in MVI architecture.

use std::fmt;

/// Marker trait for action objects.
///
/// Actions represent:
/// - User input (typing, button presses)
/// - Async completions (API responses, timers)
/// - Lifecycle signals
///
/// Actions are processed by reducers to produce new states.
pub trait Action: Clone + fmt::Debug + Send + 'static {}
