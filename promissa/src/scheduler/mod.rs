//! The microtask scheduler.
//!
//! A [`Scheduler`] owns the FIFO queue of ready callbacks that every
//! promise enqueues its reactions on, the arena of suspended routines,
//! and the unhandled-rejection tracker.
//!
//! The scheduler never runs anything on its own. A host (the bundled
//! [`EventLoop`](crate::EventLoop), or any other driver) calls
//! [`drain`](Scheduler::drain) at the boundary between its own units of
//! work: after the current synchronous code and before the next timer,
//! I/O callback or event.

pub(crate) mod context;
pub(crate) mod queue;
pub(crate) mod rejection;

pub use rejection::RejectionEvent;

use crate::promise::PromiseId;
use crate::task::TaskSlot;
use crate::utils::slab::Slab;
use queue::MicrotaskQueue;
use rejection::{RejectionTracker, TrackedRejection};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Summary of a single [`Scheduler::drain`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of microtasks executed.
    pub ran: usize,

    /// Number of unhandled rejections reported at the end of the drain.
    pub unhandled_rejections: usize,

    /// Whether the drain stopped early because the configured microtask
    /// budget was used up while tasks were still queued.
    pub budget_exhausted: bool,
}

/// Handle to a microtask scheduler.
///
/// Cloning the handle is cheap and every clone refers to the same queue.
/// The scheduler is single-threaded: handles are neither `Send` nor `Sync`.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

struct Inner {
    /// Ready callbacks, in enqueue order.
    queue: RefCell<MicrotaskQueue>,

    /// Set while a drain is in progress.
    draining: Cell<bool>,

    /// Maximum number of microtasks a single drain may run.
    budget: Cell<Option<usize>>,

    /// Rejected promises waiting for the end-of-drain check.
    rejections: RefCell<RejectionTracker>,

    /// Arena of suspended routines, indexed by task id.
    tasks: RefCell<Slab<TaskSlot>>,

    /// Next promise identifier.
    next_promise_id: Cell<u64>,

    /// Next routine generation, used to tell reused arena slots apart.
    next_task_generation: Cell<u64>,
}

/// Resets the draining flag even if a microtask panics.
struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Scheduler {
    /// Creates a scheduler with an empty queue and no microtask budget.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                queue: RefCell::new(MicrotaskQueue::new()),
                draining: Cell::new(false),
                budget: Cell::new(None),
                rejections: RefCell::new(RejectionTracker::new()),
                tasks: RefCell::new(Slab::new(16)),
                next_promise_id: Cell::new(0),
                next_task_generation: Cell::new(0),
            }),
        }
    }

    /// Appends a callback to the back of the microtask queue.
    ///
    /// The callback runs during the next [`drain`](Self::drain), after every
    /// task that was enqueued before it.
    pub fn enqueue_microtask<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        let seq = self.inner.queue.borrow_mut().push(Box::new(task));
        tracing::trace!(seq, "microtask enqueued");
    }

    /// Runs queued microtasks until the queue is empty.
    ///
    /// Tasks enqueued while draining run in the same drain. Once the queue
    /// is empty, promises rejected without any attached reaction are
    /// reported through the unhandled-rejection hook. A drain cut short by
    /// the microtask budget reports nothing: pending rejections wait for
    /// the drain that empties the queue.
    ///
    /// Calling `drain` from inside a running microtask does nothing: the
    /// outer drain already picks up everything that is queued.
    pub fn drain(&self) -> DrainReport {
        if self.inner.draining.replace(true) {
            tracing::trace!("nested drain ignored");
            return DrainReport::default();
        }
        let _guard = DrainGuard(&self.inner.draining);

        let budget = self.inner.budget.get();
        let mut report = DrainReport::default();

        loop {
            if budget.is_some_and(|limit| report.ran >= limit)
                && !self.inner.queue.borrow().is_empty()
            {
                report.budget_exhausted = true;
                tracing::warn!(
                    budget = report.ran,
                    pending = self.pending_microtasks(),
                    "microtask budget exhausted"
                );
                break;
            }

            // The queue borrow must end before the task runs.
            let next = self.inner.queue.borrow_mut().pop();
            let Some(task) = next else {
                break;
            };

            tracing::trace!(seq = task.seq, "running microtask");
            (task.run)();
            report.ran += 1;
        }

        if !report.budget_exhausted {
            report.unhandled_rejections = self.report_unhandled();
        }

        if report.ran > 0 {
            tracing::debug!(
                ran = report.ran,
                unhandled = report.unhandled_rejections,
                "microtask queue drained"
            );
        }

        report
    }

    /// Number of microtasks waiting in the queue.
    pub fn pending_microtasks(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Number of microtasks ever enqueued on this scheduler.
    pub fn total_enqueued(&self) -> u64 {
        self.inner.queue.borrow().total_enqueued()
    }

    /// Returns `true` if no microtask is queued.
    pub fn is_idle(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    /// Number of routines currently suspended on an `await`.
    pub fn suspended_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Installs the hook invoked for every rejection that is still
    /// unhandled at the end of the drain in which it happened.
    ///
    /// Without a hook, unhandled rejections are logged at `warn` level.
    pub fn on_unhandled_rejection<F>(&self, hook: F)
    where
        F: Fn(&RejectionEvent) + 'static,
    {
        self.inner
            .rejections
            .borrow_mut()
            .set_unhandled_hook(Rc::new(hook));
    }

    /// Installs the hook invoked when a reaction is attached to a promise
    /// whose rejection was already reported as unhandled.
    pub fn on_rejection_handled<F>(&self, hook: F)
    where
        F: Fn(&RejectionEvent) + 'static,
    {
        self.inner
            .rejections
            .borrow_mut()
            .set_handled_hook(Rc::new(hook));
    }

    /// Drops every queued microtask, suspended routine and pending
    /// rejection without running anything.
    ///
    /// Promises still waiting on dropped work never settle.
    ///
    /// A routine awaiting a promise nobody can settle any more stays in the
    /// arena until this is called. [`EventLoop`](crate::EventLoop) calls it
    /// on drop; a host driving a bare `Scheduler` has to call it itself.
    pub fn shutdown(&self) {
        let microtasks = self.inner.queue.borrow_mut().take_all();
        let tasks = self.inner.tasks.borrow_mut().drain();
        let rejections = self.inner.rejections.borrow_mut().clear();

        tracing::debug!(
            microtasks = microtasks.len(),
            tasks = tasks.len(),
            "scheduler shut down"
        );

        // Dropped here, after every borrow is released: destructors may
        // touch the scheduler again.
        drop(microtasks);
        drop(tasks);
        drop(rejections);
    }

    pub(crate) fn set_microtask_budget(&self, budget: Option<usize>) {
        self.inner.budget.set(budget);
    }

    pub(crate) fn next_promise_id(&self) -> PromiseId {
        let id = self.inner.next_promise_id.get();
        self.inner.next_promise_id.set(id + 1);
        PromiseId(id)
    }

    pub(crate) fn next_task_generation(&self) -> u64 {
        let generation = self.inner.next_task_generation.get();
        self.inner.next_task_generation.set(generation + 1);
        generation
    }

    pub(crate) fn tasks(&self) -> &RefCell<Slab<TaskSlot>> {
        &self.inner.tasks
    }

    /// Parks a freshly rejected, unobserved promise until the end of the
    /// current drain.
    pub(crate) fn track_rejection(&self, rejection: Rc<dyn TrackedRejection>) {
        self.inner.rejections.borrow_mut().track(rejection);
    }

    /// Notifies the host that a previously reported rejection got a handler.
    pub(crate) fn rejection_handled(&self, event: RejectionEvent) {
        let hook = self.inner.rejections.borrow().handled_hook();

        match hook {
            Some(hook) => hook(&event),
            None => tracing::info!(
                promise = %event.promise,
                "previously unhandled rejection was handled"
            ),
        }
    }

    fn report_unhandled(&self) -> usize {
        let unhandled = self.inner.rejections.borrow_mut().take_unhandled();
        if unhandled.is_empty() {
            return 0;
        }

        let hook = self.inner.rejections.borrow().unhandled_hook();

        for rejection in &unhandled {
            rejection.mark_reported();

            let event = RejectionEvent {
                promise: rejection.promise_id(),
                reason: rejection.reason(),
            };

            match &hook {
                Some(hook) => hook(&event),
                None => tracing::warn!(
                    promise = %event.promise,
                    reason = %event.reason,
                    "unhandled promise rejection"
                ),
            }
        }

        unhandled.len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending_microtasks", &self.pending_microtasks())
            .field("suspended_tasks", &self.suspended_tasks())
            .field("total_enqueued", &self.total_enqueued())
            .finish()
    }
}
