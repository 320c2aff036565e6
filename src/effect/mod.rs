//! Effects: descriptions of deferred work produced by a state transition.
//!
//! A reducer never performs I/O. It returns an [`Effect`] value and the
//! [`EffectRunner`] executes it after the new state has been published.
//! Executing an effect may dispatch follow-up actions back into the store.

mod debounce;
mod runner;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use debounce::{DebounceKey, DebounceRegistry};
pub use runner::{Dispatcher, EffectId, EffectRunner};

/// Boxed `Send` future used for task effects.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Deferred constructor for a debounced action.
pub type ActionThunk<A> = Box<dyn FnOnce() -> A + Send + 'static>;

/// Errors reported by effect execution. They are logged by the runner and
/// never reach the store.
#[derive(Debug, Error)]
pub enum EffectError {
    /// A fire-and-forget operation failed.
    #[error("Effect operation failed: {0}")]
    Failed(String),

    /// A unit of work panicked.
    #[error("Effect panicked: {0}")]
    Panicked(String),
}

impl EffectError {
    pub fn failed(err: impl fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Deferred work described by a reducer.
pub enum Effect<A> {
    /// No work.
    None,

    /// Feed the action back into the store.
    Immediate(A),

    /// Sleep, then dispatch the action.
    Delayed { action: A, after: Duration },

    /// Run every effect concurrently; complete when all have completed.
    Batch(Vec<Effect<A>>),

    /// Replace any pending timer under `key`; dispatch when it fires.
    Debounce {
        key: DebounceKey,
        after: Duration,
        action: ActionThunk<A>,
    },

    /// Await an operation and dispatch the actions it resolves to, in order.
    Task(BoxFuture<Result<Vec<A>, EffectError>>),
}

impl<A: Send + 'static> Effect<A> {
    pub fn none() -> Self {
        Self::None
    }

    pub fn immediate(action: A) -> Self {
        Self::Immediate(action)
    }

    pub fn delayed(action: A, after: Duration) -> Self {
        Self::Delayed { action, after }
    }

    /// Combine effects. Empty effects are dropped; a single survivor is
    /// returned unwrapped.
    pub fn batch(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::None,
            1 => effects.remove(0),
            _ => Self::Batch(effects),
        }
    }

    pub fn debounce<F>(key: impl Into<DebounceKey>, after: Duration, action: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Self::Debounce {
            key: key.into(),
            after,
            action: Box::new(action),
        }
    }

    /// Run `operation`; dispatch `on_success(value)` or `on_failure(error)`.
    pub fn task<T, E, Fut, S, F>(operation: Fut, on_success: S, on_failure: F) -> Self
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        S: FnOnce(T) -> A + Send + 'static,
        F: FnOnce(E) -> A + Send + 'static,
    {
        Self::Task(Box::pin(async move {
            let action = match operation.await {
                Ok(value) => on_success(value),
                Err(err) => on_failure(err),
            };
            Ok(vec![action])
        }))
    }

    /// Run an operation that may or may not produce an action. Errors are
    /// reported to the runner's log.
    pub fn future<Fut, E>(operation: Fut) -> Self
    where
        Fut: Future<Output = Result<Option<A>, E>> + Send + 'static,
        E: fmt::Display,
    {
        Self::Task(Box::pin(async move {
            operation
                .await
                .map(|action| action.into_iter().collect())
                .map_err(EffectError::failed)
        }))
    }

    /// Run an operation that resolves to several actions. They are
    /// dispatched in order, so the store reduces them in that order.
    pub fn sequence<Fut, E>(operation: Fut) -> Self
    where
        Fut: Future<Output = Result<Vec<A>, E>> + Send + 'static,
        E: fmt::Display,
    {
        Self::Task(Box::pin(async move { operation.await.map_err(EffectError::failed) }))
    }

    /// Run an operation that dispatches nothing.
    pub fn fire_and_forget<Fut, E>(operation: Fut) -> Self
    where
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display,
    {
        Self::future(async move { operation.await.map(|()| None) })
    }

    /// Convert the action type carried by this effect.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B: Send + 'static>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B> {
        match self {
            Self::None => Effect::None,
            Self::Immediate(action) => Effect::Immediate(f(action)),
            Self::Delayed { action, after } => Effect::Delayed {
                action: f(action),
                after,
            },
            Self::Batch(effects) => Effect::Batch(
                effects
                    .into_iter()
                    .map(|effect| effect.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Self::Debounce { key, after, action } => Effect::Debounce {
                key,
                after,
                action: Box::new(move || f(action())),
            },
            Self::Task(work) => Effect::Task(Box::pin(async move {
                work.await
                    .map(|actions| actions.into_iter().map(|a| f(a)).collect())
            })),
        }
    }
}

impl<A> Effect<A> {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl<A: Clone> Effect<A> {
    /// Structural summary of this effect, comparable with `==`.
    ///
    /// Closures and futures cannot be compared, so debounce thunks and task
    /// bodies are reduced to their position in the tree.
    pub fn describe(&self) -> EffectShape<A> {
        match self {
            Self::None => EffectShape::None,
            Self::Immediate(action) => EffectShape::Immediate(action.clone()),
            Self::Delayed { action, after } => EffectShape::Delayed {
                action: action.clone(),
                after: *after,
            },
            Self::Batch(effects) => EffectShape::Batch(effects.iter().map(Effect::describe).collect()),
            Self::Debounce { key, after, .. } => EffectShape::Debounce {
                key: key.clone(),
                after: *after,
            },
            Self::Task(_) => EffectShape::Task,
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Immediate(action) => f.debug_tuple("Immediate").field(action).finish(),
            Self::Delayed { action, after } => f
                .debug_struct("Delayed")
                .field("action", action)
                .field("after", after)
                .finish(),
            Self::Batch(effects) => f.debug_tuple("Batch").field(effects).finish(),
            Self::Debounce { key, after, .. } => f
                .debug_struct("Debounce")
                .field("key", key)
                .field("after", after)
                .finish_non_exhaustive(),
            Self::Task(_) => f.write_str("Task(..)"),
        }
    }
}

/// Comparable shape of an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectShape<A> {
    None,
    Immediate(A),
    Delayed { action: A, after: Duration },
    Batch(Vec<EffectShape<A>>),
    Debounce { key: DebounceKey, after: Duration },
    Task,
}

impl<A> EffectShape<A> {
    /// True if this shape, or any batched child, is a debounce under `key`.
    pub fn debounces(&self, key: &str) -> bool {
        match self {
            Self::Debounce { key: k, .. } => k.as_str() == key,
            Self::Batch(children) => children.iter().any(|child| child.debounces(key)),
            _ => false,
        }
    }

    /// Number of task effects in this tree.
    pub fn task_count(&self) -> usize {
        match self {
            Self::Task => 1,
            Self::Batch(children) => children.iter().map(EffectShape::task_count).sum(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_of_nothing_is_none() {
        let effect: Effect<u8> = Effect::batch(vec![Effect::none(), Effect::none()]);
        assert!(effect.is_none());
    }

    #[test]
    fn batch_unwraps_single_survivor() {
        let effect = Effect::batch(vec![Effect::none(), Effect::immediate(7u8)]);
        assert_eq!(effect.describe(), EffectShape::Immediate(7));
    }

    #[test]
    fn describe_hides_closures() {
        let effect = Effect::batch(vec![
            Effect::debounce("typing", Duration::from_millis(600), || 1u8),
            Effect::fire_and_forget(async { Ok::<(), EffectError>(()) }),
        ]);
        let shape = effect.describe();
        assert!(shape.debounces("typing"));
        assert!(!shape.debounces("swap"));
        assert_eq!(shape.task_count(), 1);
    }

    #[test]
    fn map_converts_nested_actions() {
        let effect = Effect::batch(vec![
            Effect::immediate(1u8),
            Effect::delayed(2u8, Duration::from_secs(1)),
        ]);
        let mapped = effect.map(|n| u32::from(n) * 10);
        assert_eq!(
            mapped.describe(),
            EffectShape::Batch(vec![
                EffectShape::Immediate(10),
                EffectShape::Delayed {
                    action: 20,
                    after: Duration::from_secs(1),
                },
            ])
        );
    }

    #[tokio::test]
    async fn map_applies_to_task_and_debounce_output() {
        let Effect::Task(work) = Effect::task(async { Ok::<u8, ()>(4) }, |n| n, |_| 0).map(|n| n + 1)
        else {
            panic!("expected task");
        };
        assert_eq!(work.await.unwrap(), vec![5]);

        let Effect::Debounce { action, .. } =
            Effect::debounce("k", Duration::ZERO, || 2u8).map(|n| n * 3)
        else {
            panic!("expected debounce");
        };
        assert_eq!(action(), 6);
    }

    #[test]
    fn debug_output_names_variants() {
        let effect = Effect::batch(vec![
            Effect::immediate("a"),
            Effect::debounce("typing", Duration::from_millis(5), || "b"),
        ]);
        let rendered = format!("{:?}", effect);
        assert!(rendered.contains("Immediate"));
        assert!(rendered.contains("typing"));
    }
}
