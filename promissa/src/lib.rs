//! # Promissa
//!
//! **Promissa** is a single-threaded promise runtime for Rust, built as the deterministic
//! continuation layer of the **Nebula** ecosystem.
//!
//! A [`Promise`] is a value container that settles exactly once. Callbacks attached to it are
//! never run synchronously: they are queued on an explicitly owned [`Scheduler`] (the microtask
//! queue) and run in a fixed order whenever the host drains it. On top of that core sit the
//! usual combinators, a driver that runs `async` routines by awaiting promises, and a small
//! reference host loop with timers.
//!
//! - **Single settlement**: the first call to a settlement capability wins, later calls are no-ops
//! - **Deterministic ordering**: reactions run in attachment order, microtasks in FIFO order,
//!   and every queued microtask runs before the next macrotask
//! - **Flattening**: resolving with a promise or a foreign [`Thenable`] adopts its outcome
//! - **Diagnostics**: rejections nobody observed are reported once per drain
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use promissa::{EventLoopBuilder, Promise};
//!
//! let event_loop = EventLoopBuilder::new().build();
//! let scheduler = event_loop.scheduler();
//!
//! let doubled = Promise::<i32, String>::resolve(scheduler, 21).then(|v| Ok(v * 2));
//!
//! assert_eq!(event_loop.block_on(&doubled).unwrap(), Ok(42));
//! ```
//!
//! ## Modules
//!
//! - [`promise`]: The promise cell, capabilities, and chaining
//! - [`scheduler`]: The microtask queue and unhandled-rejection tracking
//! - [`combinators`]: `all`, `all_settled`, `race`, `any`
//! - [`task`]: Async routines driven by promise settlement
//! - [`time`]: Promise-based `sleep`, `timeout` and `instrumented`
//! - [`tools`]: Utilities like retry mechanisms

mod error;
mod runtime;
mod utils;

pub mod combinators;
pub mod promise;
pub mod scheduler;
pub mod task;
pub mod time;
pub mod tools;

pub use combinators::{SettledResult, all, all_settled, any, race};
pub use error::{AggregateError, RuntimeError, TimeoutError};
pub use promise::{
    IntoOutcome, Outcome, Promise, PromiseFuture, PromiseId, PromiseState, Reject, Resolve,
    Thenable,
};
pub use runtime::builder::{ClockMode, EventLoopBuilder};
pub use runtime::core::{EventLoop, LoopHandle, Turn};
pub use runtime::macrotask::{MacrotaskSource, TimerId};
pub use scheduler::{DrainReport, RejectionEvent, Scheduler};
pub use task::{spawn_async, yield_now};

pub use promissa_macros::*;
