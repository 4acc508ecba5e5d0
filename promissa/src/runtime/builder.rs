use super::core::EventLoop;

/// Time source of an event loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockMode {
    /// Time only advances when the loop runs a timer, jumping straight to
    /// its deadline. Runs are deterministic and never sleep.
    #[default]
    Virtual,

    /// Wall-clock time. The loop sleeps until the next timer is due.
    Real,
}

/// Builder for configuring and creating an event loop.
///
/// # Examples
///
/// ```rust,ignore
/// let event_loop = EventLoopBuilder::new()
///     .clock(ClockMode::Real)
///     .microtask_budget(10_000)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct EventLoopBuilder {
    /// Time source used for timers.
    clock: ClockMode,

    /// Maximum number of microtasks per drain, if any.
    microtask_budget: Option<usize>,
}

impl EventLoopBuilder {
    /// Creates a builder with a virtual clock and no microtask budget.
    pub fn new() -> Self {
        Self {
            clock: ClockMode::Virtual,
            microtask_budget: None,
        }
    }

    /// Sets the time source of the loop.
    pub fn clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    /// Caps the number of microtasks a single drain may run.
    ///
    /// A drain that hits the cap makes the loop return
    /// [`RuntimeError::MicrotaskBudgetExceeded`](crate::RuntimeError::MicrotaskBudgetExceeded)
    /// instead of spinning forever on a self-requeuing chain.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn microtask_budget(mut self, n: usize) -> Self {
        assert!(n > 0, "microtask_budget must be > 0");

        self.microtask_budget = Some(n);
        self
    }

    /// Builds the event loop with the configured options.
    pub fn build(self) -> EventLoop {
        EventLoop::new(self.clock, self.microtask_budget)
    }
}

impl Default for EventLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
