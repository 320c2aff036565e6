//! Base trait for state snapshots in MVI architecture.

use std::fmt;

/// Marker trait for state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (all data needed to render and decide behavior)
/// - Comparable (PartialEq for detecting changes)
/// - Shareable (published to readers on other threads)
pub trait State: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}
