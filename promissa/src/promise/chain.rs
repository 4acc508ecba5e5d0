use super::Promise;
use super::outcome::{IntoOutcome, Outcome};
use super::reaction::Reaction;

use std::fmt;

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Runs `on_fulfilled` with the value once this promise fulfills.
    ///
    /// The returned promise settles with whatever the callback produces,
    /// adopting it if it is a promise. A rejection skips the callback and
    /// passes through unchanged.
    pub fn then<U, R, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        R: IntoOutcome<U, E>,
        F: FnOnce(T) -> R + 'static,
    {
        self.derive(move |settled| match settled {
            Ok(value) => on_fulfilled(value).into_outcome(),
            Err(error) => Outcome::Error(error),
        })
    }

    /// Runs `on_fulfilled` or `on_rejected`, depending on how this promise
    /// settles. Exactly one of them is called.
    pub fn then_else<U, R, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Promise<U, E>
    where
        U: Clone + 'static,
        R: IntoOutcome<U, E>,
        F: FnOnce(T) -> R + 'static,
        G: FnOnce(E) -> R + 'static,
    {
        self.derive(move |settled| match settled {
            Ok(value) => on_fulfilled(value).into_outcome(),
            Err(error) => on_rejected(error).into_outcome(),
        })
    }

    /// Runs `on_rejected` with the error once this promise rejects.
    ///
    /// A fulfillment passes through unchanged. Returning `Err` from the
    /// handler rejects the derived promise again.
    pub fn catch<R, G>(&self, on_rejected: G) -> Promise<T, E>
    where
        R: IntoOutcome<T, E>,
        G: FnOnce(E) -> R + 'static,
    {
        self.derive(move |settled| match settled {
            Ok(value) => Outcome::Value(value),
            Err(error) => on_rejected(error).into_outcome(),
        })
    }

    /// Runs `on_settled` once this promise settles, whichever way.
    ///
    /// The original result passes through, after the promise returned by
    /// `on_settled` (if any) has settled. If `on_settled` fails, or returns
    /// a promise that rejects, that error replaces the original result.
    pub fn finally<R, F>(&self, on_settled: F) -> Promise<T, E>
    where
        R: IntoOutcome<(), E>,
        F: FnOnce() -> R + 'static,
    {
        let scheduler = self.scheduler().clone();

        self.derive(move |settled| {
            let cleanup = Promise::<(), E>::from_outcome(&scheduler, on_settled());
            Outcome::Promise(cleanup.then(move |()| settled))
        })
    }

    /// Attaches a reaction whose handler settles a fresh derived promise.
    fn derive<U, H>(&self, handler: H) -> Promise<U, E>
    where
        U: Clone + 'static,
        H: FnOnce(Result<T, E>) -> Outcome<U, E> + 'static,
    {
        let (derived, resolve, _reject) = Promise::with_resolvers(self.scheduler());
        self.cell.add_reaction(Reaction::derive(resolve, handler));
        derived
    }
}
