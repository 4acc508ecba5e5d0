//! The reference host event loop.
//!
//! The promise core never drains its microtask queue on its own. This
//! module provides a host that does: an [`EventLoop`](crate::EventLoop)
//! owning a [`Scheduler`](crate::Scheduler), a queue of macrotasks (plain
//! tasks and timers) and a clock.
//!
//! It is responsible for:
//! - draining every microtask before and after each macrotask,
//! - firing timers in deadline order,
//! - driving a promise to completion with `block_on`,
//! - releasing queued work when the loop is dropped.

pub(crate) mod builder;
pub(crate) mod clock;
pub(crate) mod core;
pub(crate) mod macrotask;
