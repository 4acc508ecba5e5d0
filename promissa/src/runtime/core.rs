use super::builder::ClockMode;
use super::clock::Clock;
use super::macrotask::{MacrotaskQueue, MacrotaskSource, TimerId};
use crate::error::RuntimeError;
use crate::promise::Promise;
use crate::scheduler::{DrainReport, Scheduler};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Host-side state shared by an event loop and its handles.
struct Host {
    clock: Clock,
    macrotasks: RefCell<MacrotaskQueue>,
}

/// Cheap handle to an event loop, for code that schedules host work.
///
/// Handles can be cloned into callbacks and routines. They stay valid
/// after the loop is dropped, but work queued through them then never
/// runs.
#[derive(Clone)]
pub struct LoopHandle {
    scheduler: Scheduler,
    host: Rc<Host>,
}

impl LoopHandle {
    /// The microtask scheduler of the loop.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Time elapsed on the loop's clock since it was created.
    pub fn now(&self) -> Duration {
        self.host.clock.now()
    }

    /// Queues a macrotask that runs after every microtask queued so far,
    /// and after every macrotask already due.
    pub fn queue_task<F>(&self, task: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let deadline = self.now();
        let id = self
            .host
            .macrotasks
            .borrow_mut()
            .push_task(deadline, Box::new(task));

        tracing::trace!(task = %id, "macrotask queued");
        id
    }

    /// Schedules `callback` to run as a macrotask once `delay` has elapsed.
    ///
    /// Timers due at the same instant fire in registration order.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let deadline = self.now() + delay;
        let id = self
            .host
            .macrotasks
            .borrow_mut()
            .push_timer(deadline, Box::new(callback));

        tracing::trace!(timer = %id, ?deadline, "timer set");
        id
    }

    /// Cancels a pending timer or task.
    ///
    /// Returns `false` if it already ran or was already cancelled.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let cancelled = self.host.macrotasks.borrow_mut().cancel(id);

        if cancelled {
            tracing::trace!(timer = %id, "timer cleared");
        }
        cancelled
    }

    /// Number of macrotasks waiting to run.
    pub fn pending_macrotasks(&self) -> usize {
        self.host.macrotasks.borrow().len()
    }
}

impl From<LoopHandle> for Scheduler {
    fn from(handle: LoopHandle) -> Self {
        handle.scheduler
    }
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopHandle")
            .field("now", &self.now())
            .field("pending_macrotasks", &self.pending_macrotasks())
            .finish_non_exhaustive()
    }
}

/// What a single [`EventLoop::turn`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// A macrotask ran, followed by a full microtask drain.
    Ran(MacrotaskSource),

    /// Only microtasks ran: no macrotask was left.
    Idle,
}

/// A single-threaded host event loop.
///
/// `EventLoop` is responsible for:
/// - owning the microtask [`Scheduler`] promises enqueue on,
/// - running macrotasks (queued tasks and timers) one at a time,
/// - draining every microtask before the next macrotask begins,
/// - providing a synchronous entry point via [`block_on`](Self::block_on).
///
/// Dropping the loop releases every queued microtask, macrotask and
/// suspended routine without running them.
///
/// # Examples
///
/// ```rust,ignore
/// let event_loop = EventLoopBuilder::new().build();
/// let delayed = time::sleep::<String>(&event_loop.handle(), Duration::from_secs(5));
///
/// event_loop.block_on(&delayed).unwrap().unwrap();
/// assert_eq!(event_loop.now(), Duration::from_secs(5));
/// ```
pub struct EventLoop {
    handle: LoopHandle,

    /// Microtask budget per drain, reported in errors.
    budget: Option<usize>,
}

impl EventLoop {
    /// Creates an event loop.
    ///
    /// # Arguments
    ///
    /// * `clock` - Time source for timers.
    /// * `budget` - Optional cap on microtasks per drain.
    pub(crate) fn new(clock: ClockMode, budget: Option<usize>) -> Self {
        let scheduler = Scheduler::new();
        scheduler.set_microtask_budget(budget);

        tracing::debug!(?clock, ?budget, "event loop created");

        Self {
            handle: LoopHandle {
                scheduler,
                host: Rc::new(Host {
                    clock: Clock::new(clock),
                    macrotasks: RefCell::new(MacrotaskQueue::new()),
                }),
            },
            budget,
        }
    }

    /// The microtask scheduler of the loop.
    pub fn scheduler(&self) -> &Scheduler {
        &self.handle.scheduler
    }

    /// A cloneable handle for scheduling host work from callbacks.
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// See [`LoopHandle::now`].
    pub fn now(&self) -> Duration {
        self.handle.now()
    }

    /// See [`LoopHandle::queue_task`].
    pub fn queue_task<F>(&self, task: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        self.handle.queue_task(task)
    }

    /// See [`LoopHandle::set_timeout`].
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        self.handle.set_timeout(delay, callback)
    }

    /// See [`LoopHandle::clear_timeout`].
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.handle.clear_timeout(id)
    }

    /// Returns `true` while microtasks or macrotasks are queued.
    pub fn has_pending_work(&self) -> bool {
        !self.scheduler().is_idle() || !self.handle.host.macrotasks.borrow().is_empty()
    }

    /// Drains the microtask queue, runs the next macrotask if any, then
    /// drains again.
    ///
    /// With a virtual clock, running a timer moves time to its deadline.
    /// With a real clock, the call sleeps until the timer is due.
    pub fn turn(&self) -> Result<Turn, RuntimeError> {
        self.drain()?;

        match self.run_macrotask() {
            Some(source) => {
                self.drain()?;
                Ok(Turn::Ran(source))
            }
            None => Ok(Turn::Idle),
        }
    }

    /// Runs turns until no work is left.
    pub fn run(&self) -> Result<(), RuntimeError> {
        while let Turn::Ran(_) = self.turn()? {}

        tracing::debug!(now = ?self.now(), "event loop ran out of work");
        Ok(())
    }

    /// Runs the loop until `promise` settles and returns its result.
    ///
    /// The promise counts as observed: its rejection is returned here and
    /// never reported as unhandled.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stalled`] if the loop runs out of work while
    /// the promise is still pending, and
    /// [`RuntimeError::MicrotaskBudgetExceeded`] if a drain hits the
    /// configured budget.
    pub fn block_on<T, E>(&self, promise: &Promise<T, E>) -> Result<Result<T, E>, RuntimeError>
    where
        T: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
    {
        promise.mark_handled();

        loop {
            self.drain()?;

            if let Some(settled) = promise.settled() {
                return Ok(settled);
            }

            if self.run_macrotask().is_none() {
                let suspended_tasks = self.scheduler().suspended_tasks();
                tracing::warn!(promise = %promise.id(), suspended_tasks, "event loop stalled");

                return Err(RuntimeError::Stalled {
                    promise: promise.id(),
                    suspended_tasks,
                });
            }
        }
    }

    /// Drains until the microtask queue stays empty.
    ///
    /// Rejection hooks run at the end of a drain and may queue more
    /// microtasks, so a single drain is not enough.
    fn drain(&self) -> Result<DrainReport, RuntimeError> {
        let mut total = DrainReport::default();

        loop {
            let report = self.scheduler().drain();

            if let Some(budget) = self.budget.filter(|_| report.budget_exhausted) {
                return Err(RuntimeError::MicrotaskBudgetExceeded { budget });
            }

            total.ran += report.ran;
            total.unhandled_rejections += report.unhandled_rejections;

            // A nested drain reports nothing; the outer one owns the queue.
            if self.scheduler().is_idle() || report == DrainReport::default() {
                return Ok(total);
            }
        }
    }

    /// Runs the earliest macrotask, advancing the clock to its deadline.
    fn run_macrotask(&self) -> Option<MacrotaskSource> {
        let host = &self.handle.host;

        let deadline = host.macrotasks.borrow_mut().next_deadline()?;
        host.clock.advance_to(deadline);

        // The queue borrow must end before the callback runs.
        let task = host.macrotasks.borrow_mut().pop()?;

        tracing::debug!(source = ?task.source, now = ?host.clock.now(), "running macrotask");
        (task.callback)();

        Some(task.source)
    }
}

impl Drop for EventLoop {
    /// Shuts down the loop.
    ///
    /// Queued microtasks and suspended routines are released first, then
    /// pending macrotasks. Released work holds promise handles, so this
    /// breaks the reference cycles between them and the scheduler.
    fn drop(&mut self) {
        self.scheduler().shutdown();

        let macrotasks = self.handle.host.macrotasks.borrow_mut().clear();
        drop(macrotasks);
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("scheduler", self.scheduler())
            .field("handle", &self.handle)
            .field("budget", &self.budget)
            .finish()
    }
}
