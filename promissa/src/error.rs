use crate::promise::PromiseId;

use std::time::Duration;
use thiserror::Error;

/// Errors reported by the event loop while driving promises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `block_on` ran out of microtasks and macrotasks while the promise
    /// was still pending. Nothing left can ever settle it.
    #[error("{promise} can never settle: no work left ({suspended_tasks} suspended routines)")]
    Stalled {
        promise: PromiseId,
        suspended_tasks: usize,
    },

    /// A single drain hit the configured microtask budget.
    #[error("microtask budget of {budget} exceeded in a single drain")]
    MicrotaskBudgetExceeded { budget: usize },
}

/// Rejection reason of [`any`](crate::any) when every input rejected.
///
/// Reasons are kept in input order, not settlement order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all promises were rejected ({} reasons)", .errors.len())]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    #[must_use]
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Rejection reason of [`timeout`](crate::time::timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError<E> {
    /// The deadline passed before the promise settled.
    #[error("deadline of {0:?} elapsed")]
    Elapsed(Duration),

    /// The promise rejected before the deadline.
    #[error("promise rejected before the deadline: {0:?}")]
    Rejected(E),
}

impl<E> TimeoutError<E> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed(_))
    }

    /// Returns the inner rejection reason, if the promise rejected.
    pub fn into_rejection(self) -> Option<E> {
        match self {
            TimeoutError::Elapsed(_) => None,
            TimeoutError::Rejected(error) => Some(error),
        }
    }
}
