//! Reducer trait for MVI architecture.

use super::action::Action;
use super::state::State;
use crate::effect::Effect;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> (State, Effect).
/// Any asynchronous or stateful work is described by the returned
/// [`Effect`] and performed later by the effect runner.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: State;

    /// The action type this reducer handles.
    type Action: Action;

    /// Process an action and return the new state plus follow-up work.
    ///
    /// This should be a pure function with no side effects.
    fn reduce(&self, state: Self::State, action: Self::Action) -> (Self::State, Effect<Self::Action>);
}

/// Boxed reducer over a fixed state/action pair.
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A>>;

/// Ordered list of reducers folded left-to-right.
///
/// Every reducer sees the state produced by the one before it. Their
/// effects are combined with [`Effect::batch`].
pub struct Combined<S, A> {
    reducers: Vec<BoxedReducer<S, A>>,
}

/// Combine several reducers into one.
pub fn combine<S: State, A: Action>(reducers: Vec<BoxedReducer<S, A>>) -> Combined<S, A> {
    Combined { reducers }
}

impl<S: State, A: Action> Reducer for Combined<S, A> {
    type State = S;
    type Action = A;

    fn reduce(&self, state: S, action: A) -> (S, Effect<A>) {
        let mut effects = Vec::with_capacity(self.reducers.len());
        let state = self.reducers.iter().fold(state, |state, reducer| {
            let (next, effect) = reducer.reduce(state, action.clone());
            effects.push(effect);
            next
        });
        (state, Effect::batch(effects))
    }
}

/// Wraps a reducer and traces every transition.
pub struct Logged<R> {
    inner: R,
    name: &'static str,
}

impl<R> Logged<R> {
    pub fn new(inner: R, name: &'static str) -> Self {
        Self { inner, name }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Reducer> Reducer for Logged<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: Self::State, action: Self::Action) -> (Self::State, Effect<Self::Action>) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return self.inner.reduce(state, action);
        }

        let before = state.clone();
        let label = format!("{:?}", action);
        let (after, effect) = self.inner.reduce(state, action);
        tracing::debug!(
            reducer = self.name,
            action = %label,
            changed = before != after,
            effect = ?effect,
            "Reduced action"
        );
        (after, effect)
    }
}
