//! Retry utilities for promise-producing operations.
//!
//! This module provides helpers that re-run a fallible operation until it
//! succeeds or the retry limit is reached, with an optional delay between
//! attempts.
//!
//! The operation is given as a factory closure returning anything that
//! implements [`IntoOutcome`](crate::IntoOutcome): a fresh promise, or a
//! plain `Result`.

mod retry;

#[doc(inline)]
pub use retry::{retry, retry_with_interval};
