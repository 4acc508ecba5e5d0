use super::capability;
use super::outcome::{Outcome, Thenable};
use super::reaction::Reaction;
use super::{PromiseId, PromiseState};
use crate::scheduler::Scheduler;
use crate::scheduler::rejection::{RejectionEvent, TrackedRejection};

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// The shared state behind a [`Promise`](super::Promise) handle.
///
/// All mutation happens on the scheduler's thread, one step at a time,
/// so a `RefCell` is enough. Borrows never outlive a method: reactions
/// are taken out of the cell before anything is scheduled.
pub(crate) struct PromiseCell<T, E> {
    id: PromiseId,

    /// Queue that receives this promise's reaction jobs.
    scheduler: Scheduler,

    inner: RefCell<CellState<T, E>>,
}

struct CellState<T, E> {
    state: PromiseState<T, E>,

    /// Reactions attached while pending, in attachment order.
    reactions: Vec<Reaction<T, E>>,

    /// Set once any reaction has been attached.
    handled: bool,

    /// Set once the rejection was reported as unhandled.
    reported: bool,
}

impl<T, E> PromiseCell<T, E> {
    pub(crate) fn id(&self) -> PromiseId {
        self.id
    }
}

impl<T, E> PromiseCell<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Creates a pending cell bound to `scheduler`.
    pub(crate) fn new(scheduler: &Scheduler) -> Rc<Self> {
        Rc::new(Self {
            id: scheduler.next_promise_id(),
            scheduler: scheduler.clone(),
            inner: RefCell::new(CellState {
                state: PromiseState::Pending,
                reactions: Vec::new(),
                handled: false,
                reported: false,
            }),
        })
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub(crate) fn state(&self) -> PromiseState<T, E> {
        self.inner.borrow().state.clone()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.inner.borrow().state.is_pending()
    }

    /// Settles the cell as fulfilled and schedules every reaction.
    ///
    /// Does nothing if the cell is already settled.
    pub(crate) fn fulfill(self: &Rc<Self>, value: T) {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.is_pending() {
                return;
            }

            inner.state = PromiseState::Fulfilled(value.clone());
            mem::take(&mut inner.reactions)
        };

        tracing::trace!(promise = %self.id, reactions = reactions.len(), "promise fulfilled");

        for reaction in reactions {
            self.schedule(reaction, Ok(value.clone()));
        }
    }

    /// Settles the cell as rejected and schedules every reaction.
    ///
    /// A rejection nobody reacted to yet is handed to the scheduler's
    /// rejection tracker. Does nothing if the cell is already settled.
    pub(crate) fn reject(self: &Rc<Self>, error: E) {
        let (reactions, handled) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.is_pending() {
                return;
            }

            inner.state = PromiseState::Rejected(error.clone());
            (mem::take(&mut inner.reactions), inner.handled)
        };

        tracing::trace!(promise = %self.id, reactions = reactions.len(), "promise rejected");

        if !handled {
            let tracked: Rc<dyn TrackedRejection> = self.clone();
            self.scheduler.track_rejection(tracked);
        }

        for reaction in reactions {
            self.schedule(reaction, Err(error.clone()));
        }
    }

    /// Resolves the cell with an outcome, flattening promises and thenables.
    ///
    /// Adopting a promise or thenable happens in a microtask, so the cell
    /// stays pending at least until the next drain.
    pub(crate) fn resolve(self: &Rc<Self>, outcome: Outcome<T, E>) {
        match outcome {
            Outcome::Value(value) => self.fulfill(value),
            Outcome::Error(error) => self.reject(error),
            Outcome::Promise(promise) => {
                if Rc::ptr_eq(&promise.cell, self) {
                    tracing::error!(promise = %self.id, "promise resolved with itself; it will never settle");
                    return;
                }
                self.adopt(Box::new(promise));
            }
            Outcome::Thenable(thenable) => self.adopt(thenable),
        }
    }

    /// Attaches a reaction.
    ///
    /// A pending cell stores it; a settled cell schedules it right away.
    pub(crate) fn add_reaction(self: &Rc<Self>, reaction: Reaction<T, E>) {
        let (settled, late_handler) = {
            let mut inner = self.inner.borrow_mut();
            let was_handled = mem::replace(&mut inner.handled, true);

            let settled = match &inner.state {
                PromiseState::Pending => None,
                PromiseState::Fulfilled(value) => Some((Ok(value.clone()), false)),
                PromiseState::Rejected(error) => {
                    Some((Err(error.clone()), !was_handled && inner.reported))
                }
            };

            match settled {
                Some(settled) => settled,
                None => {
                    inner.reactions.push(reaction);
                    return;
                }
            }
        };

        if late_handler {
            self.notify_handled();
        }

        self.schedule(reaction, settled);
    }

    /// Marks the cell as observed, as if a reaction had been attached.
    pub(crate) fn mark_handled(&self) {
        let late_handler = {
            let mut inner = self.inner.borrow_mut();
            let was_handled = mem::replace(&mut inner.handled, true);
            !was_handled && inner.reported
        };

        if late_handler {
            self.notify_handled();
        }
    }

    fn notify_handled(&self) {
        self.scheduler.rejection_handled(RejectionEvent {
            promise: self.id,
            reason: TrackedRejection::reason(self),
        });
    }

    fn schedule(&self, reaction: Reaction<T, E>, settled: Result<T, E>) {
        self.scheduler
            .enqueue_microtask(move || reaction.run(settled));
    }

    /// Queues a job that hands fresh resolving functions to `thenable`.
    fn adopt(self: &Rc<Self>, thenable: Box<dyn Thenable<T, E>>) {
        let cell = self.clone();

        self.scheduler.enqueue_microtask(move || {
            let (resolve, reject) = capability::resolving_functions(&cell);

            if let Err(error) = thenable.then(resolve, reject.clone()) {
                reject.reject(error);
            }
        });
    }
}

impl<T, E> TrackedRejection for PromiseCell<T, E>
where
    E: fmt::Debug,
{
    fn promise_id(&self) -> PromiseId {
        self.id
    }

    fn is_handled(&self) -> bool {
        self.inner.borrow().handled
    }

    fn mark_reported(&self) {
        self.inner.borrow_mut().reported = true;
    }

    fn reason(&self) -> String {
        match &self.inner.borrow().state {
            PromiseState::Rejected(error) => format!("{error:?}"),
            _ => String::new(),
        }
    }
}
