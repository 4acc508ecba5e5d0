use super::capability::Resolve;
use super::outcome::Outcome;

use std::fmt;

/// A continuation attached to a promise.
///
/// The job receives the settled result exactly once, inside a microtask.
/// Reactions created by chaining close over the resolving capability of
/// the derived promise, so whatever the handler produces settles it.
pub(crate) struct Reaction<T, E> {
    job: Box<dyn FnOnce(Result<T, E>)>,
}

impl<T, E> Reaction<T, E> {
    /// Wraps a raw settlement callback.
    pub(crate) fn new<F>(job: F) -> Self
    where
        F: FnOnce(Result<T, E>) + 'static,
    {
        Self { job: Box::new(job) }
    }

    /// Builds the reaction record for a chaining operation: `handler` maps
    /// the upstream result to an outcome that settles `derived`.
    pub(crate) fn derive<U, H>(derived: Resolve<U, E>, handler: H) -> Self
    where
        T: 'static,
        U: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        H: FnOnce(Result<T, E>) -> Outcome<U, E> + 'static,
    {
        Self::new(move |settled| {
            derived.settle(handler(settled));
        })
    }

    /// Runs the job with the settled result.
    pub(crate) fn run(self, settled: Result<T, E>) {
        (self.job)(settled)
    }
}
