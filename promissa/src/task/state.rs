/// Execution state of a routine stored in the task arena.
///
/// Completed routines are removed from the arena, so there is no
/// terminal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskState {
    /// Suspended on an `await`, waiting for a resumption.
    Idle,

    /// Currently being polled.
    Running,

    /// Resumed while being polled.
    ///
    /// The routine is queued again once the current poll returns.
    Notified,
}
