use std::collections::VecDeque;

/// A unit of work waiting in the microtask queue.
///
/// The sequence number is assigned at enqueue time and only used for
/// tracing; execution order is the queue order.
pub(crate) struct Microtask {
    /// Position of this task in the global enqueue order.
    pub(crate) seq: u64,

    /// The callback to run. Consumed on execution.
    pub(crate) run: Box<dyn FnOnce()>,
}

/// FIFO storage for microtasks.
///
/// Tasks are pushed to the back and popped from the front, so they run
/// in exactly the order they were enqueued, including tasks enqueued by
/// tasks that are already running.
pub(crate) struct MicrotaskQueue {
    /// Pending tasks, oldest first.
    inner: VecDeque<Microtask>,

    /// Number of tasks ever enqueued. Also the next sequence number.
    total_enqueued: u64,
}

impl MicrotaskQueue {
    /// Creates an empty queue.
    pub(crate) fn new() -> Self {
        Self {
            inner: VecDeque::new(),
            total_enqueued: 0,
        }
    }

    /// Appends a task to the back of the queue and returns its sequence number.
    pub(crate) fn push(&mut self, run: Box<dyn FnOnce()>) -> u64 {
        let seq = self.total_enqueued;
        self.total_enqueued += 1;

        self.inner.push_back(Microtask { seq, run });
        seq
    }

    /// Removes the oldest task, if any.
    pub(crate) fn pop(&mut self) -> Option<Microtask> {
        self.inner.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    /// Drops every pending task without running it.
    ///
    /// Returns the tasks so the caller can release them outside of any
    /// borrow of the queue.
    pub(crate) fn take_all(&mut self) -> VecDeque<Microtask> {
        std::mem::take(&mut self.inner)
    }
}
