use crate::scheduler::Scheduler;
use crate::task::TaskId;

use std::cell::RefCell;

/// A routine that is currently being polled on this thread.
#[derive(Clone)]
pub(crate) struct CurrentTask {
    /// Scheduler owning the routine's arena slot.
    pub(crate) scheduler: Scheduler,

    /// Slot of the routine in the scheduler's task arena.
    pub(crate) id: TaskId,
}

impl CurrentTask {
    /// Asks the scheduler to poll the routine again.
    pub(crate) fn resume(&self) {
        self.scheduler.resume_task(self.id);
    }

    /// Queues a resumption of the routine as a fresh microtask.
    pub(crate) fn resume_later(&self) {
        let task = self.clone();
        self.scheduler.enqueue_microtask(move || task.resume());
    }
}

thread_local! {
    /// The routine being polled right now, if any.
    ///
    /// Set by the task driver around every poll so that promise futures
    /// can register a resumption for the routine that awaits them without
    /// going through a waker.
    static CURRENT_TASK: RefCell<Option<CurrentTask>> = const { RefCell::new(None) };
}

/// Runs `f` with `task` installed as the current routine.
///
/// The previous value is restored afterwards, so routines spawned from
/// inside another routine nest correctly.
pub(crate) fn enter_task<R>(task: CurrentTask, f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_TASK.with(|cell| cell.replace(Some(task)));

    let out = f();

    CURRENT_TASK.with(|cell| cell.replace(prev));

    out
}

/// Returns the routine currently being polled on this thread.
pub(crate) fn current_task() -> Option<CurrentTask> {
    CURRENT_TASK.with(|cell| cell.borrow().clone())
}
