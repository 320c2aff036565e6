//! The store: serialized owner of state.
//!
//! A single background task drains the dispatch queue. For every action it
//! runs middleware, reduces, publishes the new state and hands the effect
//! to the [`EffectRunner`]. Effects dispatch follow-up actions through the
//! same queue, so reductions never interleave.

mod middleware;

pub use middleware::Middleware;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::effect::{Dispatcher, EffectRunner};
use crate::mvi::Reducer;

const SETTLE_POLL: Duration = Duration::from_millis(5);

type Observer<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Command<S, A> {
    Dispatch(A),
    Reset(S),
    Shutdown,
}

/// Everything the dispatch loop shares with store handles.
struct Core<S, A> {
    state: watch::Sender<S>,
    observers: Mutex<Vec<(SubscriptionId, Observer<S>)>>,
    next_subscription: AtomicU64,
    runner: EffectRunner<A>,
    /// Commands enqueued but not yet fully processed.
    pending: Arc<AtomicUsize>,
    /// Bumped on every enqueue, so a settle check can tell work moved
    /// between its reads.
    enqueued: Arc<AtomicU64>,
    closed: AtomicBool,
}

impl<S: Clone, A: Send + 'static> Core<S, A> {
    fn publish(&self, next: S) {
        self.state.send_replace(next.clone());
        let observers: Vec<_> = self
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.runner.cancel_all();
    }
}

/// Cheap, cloneable handle to a running store.
///
/// Dropping every handle closes the dispatch queue and stops the loop.
pub struct Store<R: Reducer> {
    sender: mpsc::UnboundedSender<Command<R::State, R::Action>>,
    core: Arc<Core<R::State, R::Action>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            core: Arc::clone(&self.core),
        }
    }
}

impl<R: Reducer> Store<R> {
    /// Start a store with no middleware. Must be called inside a tokio runtime.
    pub fn new(reducer: R, initial: R::State) -> Self {
        Self::with_middleware(reducer, initial, Vec::new())
    }

    /// Start a store whose middleware runs, in order, before each reduction.
    pub fn with_middleware(
        reducer: R,
        initial: R::State,
        middleware: Vec<Arc<dyn Middleware<R::State, R::Action>>>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(initial);
        let core = Arc::new(Core {
            state,
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            runner: EffectRunner::default(),
            pending: Arc::new(AtomicUsize::new(0)),
            enqueued: Arc::new(AtomicU64::new(0)),
            closed: AtomicBool::new(false),
        });

        // Effects hold a weak sender so in-flight work never keeps the loop alive.
        let weak = sender.downgrade();
        let pending = Arc::clone(&core.pending);
        let enqueued = Arc::clone(&core.enqueued);
        let dispatcher = Dispatcher::new(move |action| {
            let Some(sender) = weak.upgrade() else {
                tracing::trace!("Store dropped, discarding effect action");
                return;
            };
            pending.fetch_add(1, Ordering::SeqCst);
            enqueued.fetch_add(1, Ordering::SeqCst);
            if sender.send(Command::Dispatch(action)).is_err() {
                pending.fetch_sub(1, Ordering::SeqCst);
            }
        });

        tokio::spawn(dispatch_loop(
            reducer,
            middleware,
            receiver,
            Arc::clone(&core),
            dispatcher,
        ));
        tracing::debug!("Store started");

        Self { sender, core }
    }

    /// Enqueue an action. Returns immediately.
    pub fn dispatch(&self, action: R::Action) {
        self.send(Command::Dispatch(action));
    }

    /// Latest published state.
    pub fn state(&self) -> R::State {
        self.core.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn watch(&self) -> watch::Receiver<R::State> {
        self.core.state.subscribe()
    }

    /// Register a callback invoked with each published state.
    ///
    /// Callbacks run on the dispatch loop and must return quickly.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&R::State) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.core.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.core.observers.lock().push((id, Arc::new(observer)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.core.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Cancel all outstanding effects and debounce timers, then replace the state.
    ///
    /// Actions already queued ahead of the reset are still reduced first.
    pub fn reset(&self, state: R::State) {
        self.core.runner.cancel_all();
        self.send(Command::Reset(state));
    }

    /// Cancel everything and stop the dispatch loop.
    pub fn shutdown(&self) {
        self.core.runner.cancel_all();
        self.send(Command::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.core.closed.load(Ordering::SeqCst)
    }

    /// Effect runner, for diagnostics.
    pub fn runner(&self) -> &EffectRunner<R::Action> {
        &self.core.runner
    }

    /// Wait until the queue is drained, no effect is running and no debounce
    /// timer is armed. Returns immediately once the store is closed.
    pub async fn settled(&self) {
        while !self.is_settled() {
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }

    fn is_settled(&self) -> bool {
        if self.is_closed() {
            return true;
        }
        // A firing timer or finishing task enqueues before it leaves its
        // table, so any hand-off between these reads bumps `enqueued`.
        let before = self.core.enqueued.load(Ordering::SeqCst);
        let idle = self.core.pending.load(Ordering::SeqCst) == 0
            && self.core.runner.in_flight() == 0
            && self.core.runner.debounce().is_empty();
        idle && self.core.enqueued.load(Ordering::SeqCst) == before
    }

    fn send(&self, command: Command<R::State, R::Action>) {
        self.core.pending.fetch_add(1, Ordering::SeqCst);
        self.core.enqueued.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(command).is_err() {
            self.core.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!("Store is closed, command dropped");
        }
    }
}

impl<R: Reducer> fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.core.state.borrow())
            .field("pending", &self.core.pending.load(Ordering::Relaxed))
            .field("in_flight", &self.core.runner.in_flight())
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn dispatch_loop<R: Reducer>(
    reducer: R,
    middleware: Vec<Arc<dyn Middleware<R::State, R::Action>>>,
    mut commands: mpsc::UnboundedReceiver<Command<R::State, R::Action>>,
    core: Arc<Core<R::State, R::Action>>,
    dispatcher: Dispatcher<R::Action>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Dispatch(action) => {
                let current = core.state.borrow().clone();
                for hook in &middleware {
                    hook.observe(&action, &current);
                }
                let (next, effect) = reducer.reduce(current, action);
                core.publish(next);
                core.runner.run(effect, &dispatcher);
            }
            Command::Reset(state) => {
                core.runner.cancel_all();
                core.publish(state);
                tracing::debug!("Store reset");
            }
            Command::Shutdown => {
                core.pending.fetch_sub(1, Ordering::SeqCst);
                break;
            }
        }
        core.pending.fetch_sub(1, Ordering::SeqCst);
    }

    commands.close();
    core.close();
    tracing::debug!("Store stopped");
}
