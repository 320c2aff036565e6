//! Debounce registry: at most one pending timer per key.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

/// Opaque identity of a debounced operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DebounceKey(Cow<'static, str>);

impl DebounceKey {
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for DebounceKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

impl From<String> for DebounceKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl fmt::Display for DebounceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Default)]
struct Timers {
    entries: HashMap<DebounceKey, Timer>,
    next_generation: u64,
}

/// Table of pending debounce timers.
///
/// Cloning yields another handle to the same table. Every store owns its
/// own registry, so independent stores never cancel each other's timers.
#[derive(Clone, Default)]
pub struct DebounceRegistry {
    timers: Arc<Mutex<Timers>>,
}

impl DebounceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer under `key`, cancelling any timer already armed for it.
    ///
    /// `fire` runs once `after` has elapsed, unless the timer was replaced
    /// or cancelled first. It runs while the table is locked, so it must
    /// not call back into this registry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: DebounceKey, after: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut timers = self.timers.lock();
        if let Some(previous) = timers.entries.remove(&key) {
            previous.handle.abort();
            tracing::trace!(key = %key, "Debounce timer superseded");
        }

        timers.next_generation += 1;
        let generation = timers.next_generation;
        let registry = self.clone();
        let fire_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            registry.fire(&fire_key, generation, fire);
        })
        .abort_handle();

        timers.entries.insert(key, Timer { generation, handle });
    }

    /// Cancel the timer under `key`. Returns true if one was pending.
    pub fn cancel(&self, key: &DebounceKey) -> bool {
        match self.timers.lock().entries.remove(key) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer. Returns how many were pending.
    pub fn cancel_all(&self) -> usize {
        let mut timers = self.timers.lock();
        let count = timers.entries.len();
        for (_, timer) in timers.entries.drain() {
            timer.handle.abort();
        }
        count
    }

    pub fn is_pending(&self, key: &DebounceKey) -> bool {
        self.timers.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.timers.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fire<F: FnOnce()>(&self, key: &DebounceKey, generation: u64, fire: F) {
        let mut timers = self.timers.lock();
        // A replaced timer can wake after its successor was armed.
        let current = timers
            .entries
            .get(key)
            .is_some_and(|timer| timer.generation == generation);
        if !current {
            return;
        }
        timers.entries.remove(key);
        tracing::trace!(key = %key, "Debounce timer fired");
        fire();
    }
}

impl fmt::Debug for DebounceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timers = self.timers.lock();
        f.debug_set().entries(timers.entries.keys()).finish()
    }
}
