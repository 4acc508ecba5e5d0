//! Promise-based time utilities.
//!
//! This module provides time-related helpers built on the timers of an
//! [`EventLoop`](crate::EventLoop).
//!
//! It includes:
//! - [`sleep`] for promises that fulfill after a delay,
//! - [`timeout`] for bounding how long a promise may stay pending,
//! - [`instrumented`] for measuring how long a promise took to settle.
//!
//! Durations are measured on the loop's clock, so with a virtual clock
//! they are exact and nothing actually sleeps.

mod instrumented;
mod sleep;
mod timeout;

#[doc(inline)]
pub use instrumented::instrumented;

#[doc(inline)]
pub use sleep::sleep;

#[doc(inline)]
pub use timeout::timeout;
