use super::builder::ClockMode;

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

/// Time source of an event loop, measured from the loop's creation.
pub(crate) enum Clock {
    /// Current virtual time.
    Virtual(Cell<Duration>),

    /// Creation instant of the loop.
    Real(Instant),
}

impl Clock {
    pub(crate) fn new(mode: ClockMode) -> Self {
        match mode {
            ClockMode::Virtual => Clock::Virtual(Cell::new(Duration::ZERO)),
            ClockMode::Real => Clock::Real(Instant::now()),
        }
    }

    pub(crate) fn now(&self) -> Duration {
        match self {
            Clock::Virtual(now) => now.get(),
            Clock::Real(origin) => origin.elapsed(),
        }
    }

    /// Moves time forward to `deadline`.
    ///
    /// A virtual clock jumps; a real clock blocks the thread. Deadlines in
    /// the past leave the clock untouched.
    pub(crate) fn advance_to(&self, deadline: Duration) {
        let now = self.now();
        if deadline <= now {
            return;
        }

        match self {
            Clock::Virtual(current) => current.set(deadline),
            Clock::Real(_) => thread::sleep(deadline - now),
        }
    }
}
