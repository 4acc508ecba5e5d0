use crate::promise::{Promise, Reject, Resolve};
use crate::scheduler::Scheduler;

use std::fmt;

/// What a step function asks the driver to do next.
pub enum Step<A, T, E> {
    /// Suspend until the promise settles, then call the step function
    /// again with its result.
    Await(Promise<A, E>),

    /// Finish the routine, fulfilling its promise.
    Return(T),

    /// Finish the routine, rejecting its promise.
    Throw(E),
}

/// Runs a routine written as an explicit state machine.
///
/// `step_fn` is called with `None` first, then with the result of every
/// promise it awaited. Each resumption runs in the reaction microtask of
/// the awaited promise.
///
/// # Examples
///
/// ```rust,ignore
/// let mut stage = 0;
/// let promise = run_steps(&scheduler, move |input: Option<Result<i32, String>>| {
///     stage += 1;
///     match input {
///         None => Step::Await(Promise::resolve(&scheduler, 1)),
///         Some(Ok(v)) => Step::Return(v + 1),
///         Some(Err(e)) => Step::Throw(e),
///     }
/// });
/// ```
pub fn run_steps<A, T, E, F>(scheduler: &Scheduler, step_fn: F) -> Promise<T, E>
where
    A: Clone + 'static,
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    F: FnMut(Option<Result<A, E>>) -> Step<A, T, E> + 'static,
{
    let (promise, resolve, reject) = Promise::with_resolvers(scheduler);
    advance(step_fn, None, resolve, reject);
    promise
}

fn advance<A, T, E, F>(mut step_fn: F, input: Option<Result<A, E>>, resolve: Resolve<T, E>, reject: Reject<T, E>)
where
    A: Clone + 'static,
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    F: FnMut(Option<Result<A, E>>) -> Step<A, T, E> + 'static,
{
    match step_fn(input) {
        Step::Await(awaited) => {
            tracing::trace!(promise = %awaited.id(), "step routine suspended");
            awaited.subscribe(move |settled| advance(step_fn, Some(settled), resolve, reject));
        }
        Step::Return(value) => {
            resolve.resolve(value);
        }
        Step::Throw(error) => {
            reject.reject(error);
        }
    }
}
