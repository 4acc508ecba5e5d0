use super::Promise;
use super::cell::PromiseCell;
use super::outcome::{IntoOutcome, Outcome};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Creates a fresh pair of settlement capabilities for `cell`.
///
/// Both capabilities share one `already_resolved` flag: whichever is
/// called first wins, and every later call to either is ignored.
pub(crate) fn resolving_functions<T, E>(cell: &Rc<PromiseCell<T, E>>) -> (Resolve<T, E>, Reject<T, E>) {
    let already_resolved = Rc::new(Cell::new(false));

    let resolve = Resolve {
        cell: cell.clone(),
        already_resolved: already_resolved.clone(),
    };
    let reject = Reject {
        cell: cell.clone(),
        already_resolved,
    };

    (resolve, reject)
}

/// One-shot capability that resolves a promise.
///
/// Handed to executors, producers and foreign thenables. Cloning it does
/// not create a new capability: all clones share the same first-call-wins
/// flag with the matching [`Reject`].
pub struct Resolve<T, E> {
    cell: Rc<PromiseCell<T, E>>,
    already_resolved: Rc<Cell<bool>>,
}

impl<T, E> Resolve<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Fulfills the promise with `value`.
    ///
    /// Returns `false` if this capability pair was already used.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Outcome::Value(value))
    }

    /// Resolves the promise with any outcome.
    ///
    /// A promise or thenable is adopted: the promise stays pending until
    /// the adopted value settles, then takes its result. Returns `false` if
    /// this capability pair was already used.
    pub fn settle(&self, outcome: impl IntoOutcome<T, E>) -> bool {
        if self.already_resolved.replace(true) {
            tracing::trace!(promise = %self.cell.id(), "resolve ignored, already resolved");
            return false;
        }

        self.cell.resolve(outcome.into_outcome());
        true
    }

    /// Returns `true` once either capability of the pair has been used.
    pub fn is_spent(&self) -> bool {
        self.already_resolved.get()
    }

    /// The promise this capability settles.
    pub fn promise(&self) -> Promise<T, E> {
        Promise {
            cell: self.cell.clone(),
        }
    }
}

/// One-shot capability that rejects a promise.
///
/// Shares its first-call-wins flag with the matching [`Resolve`].
pub struct Reject<T, E> {
    cell: Rc<PromiseCell<T, E>>,
    already_resolved: Rc<Cell<bool>>,
}

impl<T, E> Reject<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Rejects the promise with `error`.
    ///
    /// Returns `false` if this capability pair was already used.
    pub fn reject(&self, error: E) -> bool {
        if self.already_resolved.replace(true) {
            tracing::trace!(promise = %self.cell.id(), "reject ignored, already resolved");
            return false;
        }

        self.cell.reject(error);
        true
    }

    /// Returns `true` once either capability of the pair has been used.
    pub fn is_spent(&self) -> bool {
        self.already_resolved.get()
    }
}

impl<T, E> Clone for Resolve<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            already_resolved: self.already_resolved.clone(),
        }
    }
}

impl<T, E> Clone for Reject<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            already_resolved: self.already_resolved.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolve<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("spent", &self.already_resolved.get())
            .finish_non_exhaustive()
    }
}

impl<T, E> fmt::Debug for Reject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("spent", &self.already_resolved.get())
            .finish_non_exhaustive()
    }
}
