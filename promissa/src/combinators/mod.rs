//! Combinators aggregating several promises into one.
//!
//! Every combinator accepts an ordered collection of inputs implementing
//! [`IntoOutcome`]: promises, or plain `Ok`/`Err` values which are treated
//! as already-settled promises. Results are always reported in input
//! order, whatever the order of settlement.
//!
//! | combinator      | fulfills when            | rejects when              |
//! |-----------------|--------------------------|---------------------------|
//! | [`all`]         | every input fulfilled    | the first input rejects   |
//! | [`all_settled`] | every input settled      | never                     |
//! | [`race`]        | the first input fulfills | the first input rejects   |
//! | [`any`]         | the first input fulfills | every input rejected      |
//!
//! On empty input, `all` and `all_settled` fulfill with an empty vector,
//! `any` rejects with an empty [`AggregateError`](crate::AggregateError),
//! and `race` stays pending forever.
//!
//! Combinators observe their inputs through raw reactions rather than
//! `then_else`. Ordering is the same as chaining (one microtask per input
//! settlement), without allocating a derived promise per input. Inputs
//! count as handled as soon as they are passed in.

mod all;
mod all_settled;
mod any;
mod race;

pub use all::all;
pub use all_settled::all_settled;
pub use any::any;
pub use race::race;

use crate::promise::{IntoOutcome, Promise};
use crate::scheduler::Scheduler;

use std::fmt;

/// The outcome of one input of [`all_settled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettledResult<T, E> {
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> SettledResult<T, E> {
    /// `"fulfilled"` or `"rejected"`.
    pub fn status(&self) -> &'static str {
        match self {
            SettledResult::Fulfilled(_) => "fulfilled",
            SettledResult::Rejected(_) => "rejected",
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, SettledResult::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SettledResult::Rejected(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SettledResult::Fulfilled(value) => Some(value),
            SettledResult::Rejected(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&E> {
        match self {
            SettledResult::Fulfilled(_) => None,
            SettledResult::Rejected(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            SettledResult::Fulfilled(value) => Ok(value),
            SettledResult::Rejected(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for SettledResult<T, E> {
    fn from(settled: Result<T, E>) -> Self {
        match settled {
            Ok(value) => SettledResult::Fulfilled(value),
            Err(error) => SettledResult::Rejected(error),
        }
    }
}

/// Turns every input into a promise bound to `scheduler`.
fn collect_inputs<T, E, I>(scheduler: &Scheduler, inputs: impl IntoIterator<Item = I>) -> Vec<Promise<T, E>>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoOutcome<T, E>,
{
    inputs
        .into_iter()
        .map(|input| Promise::from_outcome(scheduler, input))
        .collect()
}
