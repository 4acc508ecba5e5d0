//! Promises: values that settle exactly once.
//!
//! This module defines the [`Promise`] handle and everything needed to
//! produce and consume one:
//! - the one-shot settlement capabilities [`Resolve`] and [`Reject`],
//! - [`Outcome`] and [`IntoOutcome`], describing what a callback produced,
//! - the [`Thenable`] trait used to adopt foreign promise-like values,
//! - chaining with [`then`](Promise::then), [`catch`](Promise::catch) and
//!   [`finally`](Promise::finally),
//! - [`PromiseFuture`], which lets routines `.await` a promise.
//!
//! A promise never runs callbacks synchronously. Every reaction goes
//! through the microtask queue of the [`Scheduler`] the promise was
//! created with.

pub(crate) mod cell;
pub(crate) mod reaction;

mod capability;
mod chain;
mod future;
mod outcome;

pub use capability::{Reject, Resolve};
pub use future::PromiseFuture;
pub use outcome::{IntoOutcome, Outcome, Thenable};

use crate::scheduler::Scheduler;
use cell::PromiseCell;
use reaction::Reaction;

use std::fmt;
use std::future::IntoFuture;
use std::rc::Rc;

/// Identifier of a promise, unique within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(pub(crate) u64);

impl PromiseId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise({})", self.0)
    }
}

/// The settlement state of a promise.
///
/// Once a promise leaves `Pending` it never changes state again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseState<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> PromiseState<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, PromiseState::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, PromiseState::Rejected(_))
    }

    /// Converts a settled state into a `Result`. Returns `None` while pending.
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Ok(value)),
            PromiseState::Rejected(error) => Some(Err(error)),
        }
    }
}

impl<T, E> fmt::Display for PromiseState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        };
        f.write_str(name)
    }
}

/// A value of type `T`, or an error of type `E`, available later.
///
/// `Promise` is a cheap handle: clones refer to the same underlying cell.
/// Values and errors are cloned for every reaction, so both must be
/// `Clone`. Errors must also be `Debug` so unhandled rejections can be
/// reported.
///
/// # Examples
///
/// ```rust,ignore
/// let scheduler = Scheduler::new();
///
/// let promise = Promise::<i32, String>::new(&scheduler, |resolve, _reject| {
///     resolve.resolve(1);
///     Ok(())
/// });
///
/// let doubled = promise.then(|v| Ok(v * 2));
/// scheduler.drain();
///
/// assert_eq!(doubled.state(), PromiseState::Fulfilled(2));
/// ```
pub struct Promise<T, E> {
    pub(crate) cell: Rc<PromiseCell<T, E>>,
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Creates a pending promise and runs `executor` synchronously with its
    /// settlement capabilities.
    ///
    /// The first capability call settles the promise; later calls are
    /// ignored. If the executor returns `Err`, the promise is rejected with
    /// that error, unless a capability was already called.
    pub fn new<F>(scheduler: &Scheduler, executor: F) -> Self
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E>,
    {
        let (promise, resolve, reject) = Self::with_resolvers(scheduler);

        if let Err(error) = executor(resolve, reject.clone()) {
            tracing::trace!(promise = %promise.id(), "executor failed");
            reject.reject(error);
        }

        promise
    }

    /// Creates a pending promise together with its settlement capabilities.
    ///
    /// This is the entry point for producers that settle from their own
    /// completion callbacks, such as timers or I/O.
    pub fn with_resolvers(scheduler: &Scheduler) -> (Self, Resolve<T, E>, Reject<T, E>) {
        let cell = PromiseCell::new(scheduler);
        let (resolve, reject) = capability::resolving_functions(&cell);

        (Self { cell }, resolve, reject)
    }

    /// Creates a promise that is already fulfilled with `value`.
    pub fn resolve(scheduler: &Scheduler, value: T) -> Self {
        let cell = PromiseCell::new(scheduler);
        cell.fulfill(value);
        Self { cell }
    }

    /// Creates a promise that is already rejected with `error`.
    pub fn reject(scheduler: &Scheduler, error: E) -> Self {
        let cell = PromiseCell::new(scheduler);
        cell.reject(error);
        Self { cell }
    }

    /// Turns any outcome into a promise.
    ///
    /// A promise is returned as is. Plain values and errors produce
    /// already-settled promises, and thenables are adopted.
    pub fn from_outcome(scheduler: &Scheduler, outcome: impl IntoOutcome<T, E>) -> Self {
        match outcome.into_outcome() {
            Outcome::Value(value) => Self::resolve(scheduler, value),
            Outcome::Error(error) => Self::reject(scheduler, error),
            Outcome::Promise(promise) => promise,
            Outcome::Thenable(thenable) => {
                let (promise, resolve, _reject) = Self::with_resolvers(scheduler);
                resolve.settle(Outcome::Thenable(thenable));
                promise
            }
        }
    }

    pub fn id(&self) -> PromiseId {
        self.cell.id()
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> PromiseState<T, E> {
        self.cell.state()
    }

    pub fn is_pending(&self) -> bool {
        self.cell.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.state().is_fulfilled()
    }

    pub fn is_rejected(&self) -> bool {
        self.state().is_rejected()
    }

    /// The scheduler this promise enqueues its reactions on.
    pub fn scheduler(&self) -> &Scheduler {
        self.cell.scheduler()
    }

    /// Attaches a raw reaction that observes the settlement without
    /// producing a derived promise.
    pub(crate) fn subscribe<F>(&self, callback: F)
    where
        F: FnOnce(Result<T, E>) + 'static,
    {
        self.cell.add_reaction(Reaction::new(callback));
    }

    /// Returns the settled result, or `None` while pending.
    pub(crate) fn settled(&self) -> Option<Result<T, E>> {
        self.state().into_result()
    }

    /// Marks the promise as observed without attaching a reaction.
    pub(crate) fn mark_handled(&self) {
        self.cell.mark_handled();
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E>
where
    T: Clone + fmt::Debug + 'static,
    E: Clone + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = PromiseFuture<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        PromiseFuture::new(self)
    }
}
