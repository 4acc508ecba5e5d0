use super::TaskId;
use super::state::TaskState;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::scheduler::context::{self, CurrentTask};

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

type BoxedRoutine = Pin<Box<dyn Future<Output = ()>>>;

/// A routine stored in the scheduler's task arena.
pub(crate) struct TaskSlot {
    /// Distinguishes this routine from earlier occupants of the slot.
    generation: u64,

    state: TaskState,

    /// The routine itself. Taken out of the slot while it is polled, so
    /// the arena is never borrowed across user code.
    future: Option<BoxedRoutine>,
}

impl Scheduler {
    /// Stores a routine in the arena without polling it.
    pub(crate) fn insert_task(&self, future: BoxedRoutine) -> TaskId {
        let generation = self.next_task_generation();

        let index = self.tasks().borrow_mut().insert(TaskSlot {
            generation,
            state: TaskState::Idle,
            future: Some(future),
        });

        TaskId { index, generation }
    }

    /// Polls a routine once.
    ///
    /// Resumptions of a routine that already completed, or of a slot now
    /// owned by another routine, are ignored. A resumption that arrives
    /// while the routine is being polled is deferred to a fresh microtask.
    pub(crate) fn resume_task(&self, id: TaskId) {
        let mut future = {
            let mut tasks = self.tasks().borrow_mut();

            let Some(slot) = tasks
                .get_mut(id.index)
                .filter(|slot| slot.generation == id.generation)
            else {
                tracing::trace!(task = %id, "stale resumption ignored");
                return;
            };

            match slot.state {
                TaskState::Idle => {}
                TaskState::Running => {
                    slot.state = TaskState::Notified;
                    return;
                }
                TaskState::Notified => return,
            }

            let Some(future) = slot.future.take() else {
                return;
            };

            slot.state = TaskState::Running;
            future
        };

        tracing::trace!(task = %id, "resuming routine");

        let current = CurrentTask {
            scheduler: self.clone(),
            id,
        };
        let mut cx = Context::from_waker(Waker::noop());
        let poll = context::enter_task(current, || future.as_mut().poll(&mut cx));

        match poll {
            Poll::Ready(()) => {
                let removed = self.take_slot(id);
                tracing::trace!(task = %id, "routine completed");

                // Released after the arena borrow ends.
                drop(future);
                drop(removed);
            }
            Poll::Pending => {
                let notified = {
                    let mut tasks = self.tasks().borrow_mut();

                    match tasks
                        .get_mut(id.index)
                        .filter(|slot| slot.generation == id.generation)
                    {
                        Some(slot) => {
                            let notified = slot.state == TaskState::Notified;
                            slot.state = TaskState::Idle;
                            slot.future = Some(future);
                            Some(notified)
                        }
                        None => None,
                    }
                };

                match notified {
                    Some(true) => {
                        let scheduler = self.clone();
                        self.enqueue_microtask(move || scheduler.resume_task(id));
                    }
                    Some(false) => {}
                    // The arena was cleared by a shutdown during the poll.
                    None => tracing::trace!(task = %id, "routine dropped during poll"),
                }
            }
        }
    }

    fn take_slot(&self, id: TaskId) -> Option<TaskSlot> {
        let mut tasks = self.tasks().borrow_mut();

        let owned = tasks
            .get_mut(id.index)
            .is_some_and(|slot| slot.generation == id.generation);

        if owned { tasks.remove(id.index) } else { None }
    }
}

/// Runs a native `async` routine and returns a promise for its result.
///
/// The routine starts immediately and runs synchronously until its first
/// `.await` on a pending promise. Each awaited promise resumes it from
/// inside the reaction microtask, one tick after settlement, just like a
/// `then` callback would run.
///
/// `Ok` fulfills the returned promise and `Err` rejects it, so `?` inside
/// the routine behaves like rethrowing.
///
/// A routine awaiting a promise whose capabilities were all dropped can
/// never resume. It stays in the scheduler's arena, counted by
/// [`Scheduler::suspended_tasks`], until [`Scheduler::shutdown`] runs.
///
/// # Examples
///
/// ```rust,ignore
/// let scheduler = Scheduler::new();
/// let input = Promise::<i32, String>::resolve(&scheduler, 20);
///
/// let output = spawn_async(&scheduler, async move {
///     let v = input.await?;
///     Ok::<_, String>(v + 1)
/// });
///
/// scheduler.drain();
/// assert_eq!(output.state(), PromiseState::Fulfilled(21));
/// ```
pub fn spawn_async<T, E, F>(scheduler: &Scheduler, routine: F) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    F: Future<Output = Result<T, E>> + 'static,
{
    let (promise, resolve, reject) = Promise::with_resolvers(scheduler);

    let wrapped = async move {
        match routine.await {
            Ok(value) => resolve.resolve(value),
            Err(error) => reject.reject(error),
        };
    };

    let id = scheduler.insert_task(Box::pin(wrapped));
    tracing::trace!(task = %id, promise = %promise.id(), "routine spawned");

    scheduler.resume_task(id);
    promise
}
