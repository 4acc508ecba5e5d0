use crate::promise::PromiseId;

use std::fmt;
use std::rc::Rc;

/// Host-visible notification about a rejected promise.
///
/// Delivered to the hooks installed with
/// [`Scheduler::on_unhandled_rejection`](super::Scheduler::on_unhandled_rejection) and
/// [`Scheduler::on_rejection_handled`](super::Scheduler::on_rejection_handled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionEvent {
    /// The promise that was rejected.
    pub promise: PromiseId,

    /// The rejection reason, rendered with its `Debug` implementation.
    pub reason: String,
}

impl fmt::Display for RejectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected with {}", self.promise, self.reason)
    }
}

/// Type-erased view of a rejected promise cell.
///
/// The scheduler is not generic over value and error types, so the
/// tracker only talks to cells through this trait.
pub(crate) trait TrackedRejection {
    fn promise_id(&self) -> PromiseId;

    /// Whether any reaction has been attached to the promise so far.
    fn is_handled(&self) -> bool;

    /// Records that the unhandled report was delivered.
    fn mark_reported(&self);

    fn reason(&self) -> String;
}

pub(crate) type RejectionHook = Rc<dyn Fn(&RejectionEvent)>;

/// Bookkeeping for unhandled-rejection detection.
///
/// Promises rejected with no reaction attached are parked here until the
/// end of the current drain. Those still unhandled at that point are
/// reported exactly once.
pub(crate) struct RejectionTracker {
    /// Rejected promises awaiting the end-of-drain check.
    pending: Vec<Rc<dyn TrackedRejection>>,

    /// Hook for rejections still unhandled at the end of a drain.
    unhandled_hook: Option<RejectionHook>,

    /// Hook for rejections handled after they were reported.
    handled_hook: Option<RejectionHook>,
}

impl RejectionTracker {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::new(),
            unhandled_hook: None,
            handled_hook: None,
        }
    }

    pub(crate) fn track(&mut self, rejection: Rc<dyn TrackedRejection>) {
        self.pending.push(rejection);
    }

    pub(crate) fn set_unhandled_hook(&mut self, hook: RejectionHook) {
        self.unhandled_hook = Some(hook);
    }

    pub(crate) fn set_handled_hook(&mut self, hook: RejectionHook) {
        self.handled_hook = Some(hook);
    }

    pub(crate) fn unhandled_hook(&self) -> Option<RejectionHook> {
        self.unhandled_hook.clone()
    }

    pub(crate) fn handled_hook(&self) -> Option<RejectionHook> {
        self.handled_hook.clone()
    }

    /// Takes every parked rejection that is still unhandled.
    ///
    /// Rejections that got a reaction in the meantime are dropped silently.
    pub(crate) fn take_unhandled(&mut self) -> Vec<Rc<dyn TrackedRejection>> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.retain(|rejection| !rejection.is_handled());
        pending
    }

    pub(crate) fn clear(&mut self) -> Vec<Rc<dyn TrackedRejection>> {
        std::mem::take(&mut self.pending)
    }
}
