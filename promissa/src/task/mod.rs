//! Async routines driven by promise settlement.
//!
//! A routine is a computation that can suspend on a promise and resume
//! once it settles. Two forms are supported:
//! - native Rust `async` blocks, run with [`spawn_async`],
//! - explicit step functions, run with [`run_steps`].
//!
//! Both return a [`Promise`](crate::Promise) for the routine's result.
//! A routine runs synchronously until its first suspension, and is only
//! ever resumed from a microtask: never from inside the code that settled
//! the promise it awaits.

pub(crate) mod state;

mod driver;
mod steps;
mod yield_now;

pub(crate) use driver::TaskSlot;

pub use driver::spawn_async;
pub use steps::{Step, run_steps};
pub use yield_now::yield_now;

use std::fmt;

/// Identifier of a suspended routine in its scheduler's arena.
///
/// The generation tells apart routines that reused the same slot, so a
/// stale resumption never polls the wrong routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.generation)
    }
}
