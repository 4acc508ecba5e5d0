use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::time::Duration;

/// Identifier of a macrotask, returned by
/// [`set_timeout`](crate::EventLoop::set_timeout) for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

/// Where a macrotask came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacrotaskSource {
    /// Queued with [`queue_task`](crate::EventLoop::queue_task).
    Task,

    /// Fired by a timer.
    Timer(TimerId),
}

/// An entry in the macrotask queue.
///
/// Entries are ordered by deadline, then by registration order, so plain
/// tasks and timers due at the same instant run first-in first-out.
pub(crate) struct Macrotask {
    /// Loop time at which the entry becomes runnable.
    pub(crate) deadline: Duration,

    pub(crate) id: TimerId,

    pub(crate) source: MacrotaskSource,

    pub(crate) callback: Box<dyn FnOnce()>,
}

impl Eq for Macrotask {}

impl PartialEq for Macrotask {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Ord for Macrotask {
    /// Reversed so that a `BinaryHeap<Macrotask>` pops the earliest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.id).cmp(&(self.deadline, self.id))
    }
}

impl PartialOrd for Macrotask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of host-level work.
pub(crate) struct MacrotaskQueue {
    heap: BinaryHeap<Macrotask>,

    /// Entries neither run nor cancelled. Cancelled entries stay in the
    /// heap and are skipped when they reach the top.
    live: HashSet<TimerId>,

    next_id: u64,
}

impl MacrotaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
        }
    }

    /// Queues a plain task runnable from `deadline` on.
    pub(crate) fn push_task(&mut self, deadline: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        self.push(deadline, callback, |_| MacrotaskSource::Task)
    }

    /// Queues a timer firing at `deadline`.
    pub(crate) fn push_timer(&mut self, deadline: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        self.push(deadline, callback, MacrotaskSource::Timer)
    }

    fn push(
        &mut self,
        deadline: Duration,
        callback: Box<dyn FnOnce()>,
        source: impl FnOnce(TimerId) -> MacrotaskSource,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.live.insert(id);
        self.heap.push(Macrotask {
            deadline,
            id,
            source: source(id),
            callback,
        });

        id
    }

    /// Cancels an entry. Returns `false` if it already ran or was cancelled.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    /// Deadline of the earliest live entry.
    pub(crate) fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.heap.peek().map(|task| task.deadline)
    }

    /// Removes the earliest live entry.
    pub(crate) fn pop(&mut self) -> Option<Macrotask> {
        self.discard_cancelled();

        let task = self.heap.pop()?;
        self.live.remove(&task.id);
        Some(task)
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Removes every entry without running it.
    pub(crate) fn clear(&mut self) -> Vec<Macrotask> {
        self.live.clear();
        std::mem::take(&mut self.heap).into_vec()
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.live.contains(&top.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
