//! Read-only hooks run before every reduction.

/// Observes each action together with the state it is about to be applied to.
///
/// Middleware cannot change either value; it exists for logging and
/// analytics.
pub trait Middleware<S, A>: Send + Sync {
    fn observe(&self, action: &A, state: &S);
}

impl<S, A, F> Middleware<S, A> for F
where
    F: Fn(&A, &S) + Send + Sync,
{
    fn observe(&self, action: &A, state: &S) {
        self(action, state)
    }
}
