//! Effect runner: executes effects and tracks in-flight work.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::{AbortHandle, JoinSet};
use uuid::Uuid;

use super::{BoxFuture, DebounceRegistry, Effect, EffectError};

/// Identity of one independently cancellable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(Uuid);

impl EffectId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback used by effects to feed actions back into the store.
pub struct Dispatcher<A> {
    send: Arc<dyn Fn(A) + Send + Sync>,
}

impl<A> Dispatcher<A> {
    pub fn new<F>(send: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            send: Arc::new(send),
        }
    }

    pub fn dispatch(&self, action: A) {
        (self.send)(action)
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            send: Arc::clone(&self.send),
        }
    }
}

struct Tracking {
    tasks: Mutex<HashMap<EffectId, AbortHandle>>,
    idle: Notify,
}

/// Executes [`Effect`] values on the tokio runtime.
///
/// Every non-empty effect becomes one tracked task. Failures and panics
/// are logged and the task is dropped from the table; they never reach
/// the caller.
pub struct EffectRunner<A> {
    tracking: Arc<Tracking>,
    debounce: DebounceRegistry,
    _action: PhantomData<fn(A)>,
}

impl<A> Clone for EffectRunner<A> {
    fn clone(&self) -> Self {
        Self {
            tracking: Arc::clone(&self.tracking),
            debounce: self.debounce.clone(),
            _action: PhantomData,
        }
    }
}

impl<A: Send + 'static> Default for EffectRunner<A> {
    fn default() -> Self {
        Self::new(DebounceRegistry::new())
    }
}

impl<A: Send + 'static> EffectRunner<A> {
    pub fn new(debounce: DebounceRegistry) -> Self {
        Self {
            tracking: Arc::new(Tracking {
                tasks: Mutex::new(HashMap::new()),
                idle: Notify::new(),
            }),
            debounce,
            _action: PhantomData,
        }
    }

    /// Start executing `effect`. Returns `None` when nothing is left to
    /// track: [`Effect::None`], or an effect made only of debounces.
    ///
    /// Debounce timers, including those nested in a batch, are armed before
    /// this returns, in the order they appear. Everything else runs on a
    /// spawned task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, effect: Effect<A>, dispatcher: &Dispatcher<A>) -> Option<EffectId> {
        let effect = self.arm_debounces(effect, dispatcher);
        if effect.is_none() {
            return None;
        }

        let id = EffectId::new();
        let dispatcher = dispatcher.clone();
        let registry = self.debounce.clone();
        let tracker = self.clone();

        // Hold the table across spawn so the task cannot finish before it
        // is registered.
        let mut tasks = self.tracking.tasks.lock();
        let handle = tokio::spawn(async move {
            let _finish = scopeguard::guard(tracker, move |tracker| {
                if std::thread::panicking() {
                    tracing::warn!(effect = %id, "Effect panicked");
                }
                tracker.finish(id);
            });
            if let Err(err) = execute(effect, dispatcher, registry).await {
                tracing::warn!(effect = %id, error = %err, "Effect failed");
            }
        });
        tasks.insert(id, handle.abort_handle());
        tracing::trace!(effect = %id, in_flight = tasks.len(), "Effect started");
        Some(id)
    }

    /// Abort one unit of work. Returns true if it was still running.
    pub fn cancel(&self, id: EffectId) -> bool {
        let removed = self.tracking.tasks.lock().remove(&id);
        match removed {
            Some(handle) => {
                handle.abort();
                self.notify_if_idle();
                true
            }
            None => false,
        }
    }

    /// Abort all tracked work and every pending debounce timer.
    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.tracking.tasks.lock().drain().collect();
        for (_, handle) in &drained {
            handle.abort();
        }
        let timers = self.debounce.cancel_all();
        if !drained.is_empty() || timers > 0 {
            tracing::debug!(
                effects = drained.len(),
                timers,
                "Cancelled outstanding effects"
            );
        }
        self.tracking.idle.notify_waiters();
    }

    /// Number of tracked units of work still running.
    pub fn in_flight(&self) -> usize {
        self.tracking.tasks.lock().len()
    }

    pub fn is_running(&self, id: EffectId) -> bool {
        self.tracking.tasks.lock().contains_key(&id)
    }

    pub fn debounce(&self) -> &DebounceRegistry {
        &self.debounce
    }

    /// Wait until no tracked work remains. Pending debounce timers are not
    /// tracked work.
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking to avoid missing a wakeup
            // between the check and the await.
            let notified = self.tracking.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Schedule every debounce in `effect` and return the remainder.
    fn arm_debounces(&self, effect: Effect<A>, dispatcher: &Dispatcher<A>) -> Effect<A> {
        match effect {
            Effect::Debounce { key, after, action } => {
                let dispatcher = dispatcher.clone();
                self.debounce
                    .schedule(key, after, move || dispatcher.dispatch(action()));
                Effect::None
            }
            Effect::Batch(effects) => Effect::batch(
                effects
                    .into_iter()
                    .map(|child| self.arm_debounces(child, dispatcher)),
            ),
            other => other,
        }
    }

    fn finish(&self, id: EffectId) {
        if self.tracking.tasks.lock().remove(&id).is_some() {
            tracing::trace!(effect = %id, "Effect finished");
        }
        self.notify_if_idle();
    }

    fn notify_if_idle(&self) {
        if self.tracking.tasks.lock().is_empty() {
            self.tracking.idle.notify_waiters();
        }
    }
}

fn execute<A: Send + 'static>(
    effect: Effect<A>,
    dispatcher: Dispatcher<A>,
    registry: DebounceRegistry,
) -> BoxFuture<Result<(), EffectError>> {
    Box::pin(async move {
        match effect {
            Effect::None => {}
            Effect::Immediate(action) => dispatcher.dispatch(action),
            Effect::Delayed { action, after } => {
                tokio::time::sleep(after).await;
                dispatcher.dispatch(action);
            }
            Effect::Batch(effects) => {
                let mut children = JoinSet::new();
                for child in effects {
                    children.spawn(execute(child, dispatcher.clone(), registry.clone()));
                }
                while let Some(joined) = children.join_next().await {
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => tracing::warn!(error = %err, "Batched effect failed"),
                        Err(err) if err.is_panic() => {
                            let err = EffectError::Panicked(err.to_string());
                            tracing::warn!(error = %err, "Batched effect panicked");
                        }
                        Err(_) => {}
                    }
                }
            }
            Effect::Debounce { key, after, action } => {
                registry.schedule(key, after, move || dispatcher.dispatch(action()));
            }
            Effect::Task(work) => {
                for action in work.await? {
                    dispatcher.dispatch(action);
                }
            }
        }
        Ok(())
    })
}
