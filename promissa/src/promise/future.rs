use super::Promise;
use crate::scheduler::context;

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Future returned by `.await`ing a [`Promise`].
///
/// The first poll attaches a reaction to the promise. When the promise
/// settles, the reaction stores the result and resumes the routine that
/// awaits it from inside the reaction microtask. Outside the task driver
/// the context's waker is used instead.
///
/// Awaiting always suspends at least once, even for a promise that is
/// already settled.
pub struct PromiseFuture<T, E> {
    promise: Promise<T, E>,

    /// Filled by the reaction once the promise settles.
    slot: Rc<RefCell<Option<Result<T, E>>>>,

    /// Whether the reaction has been attached.
    subscribed: bool,
}

impl<T, E> PromiseFuture<T, E> {
    pub(crate) fn new(promise: Promise<T, E>) -> Self {
        Self {
            promise,
            slot: Rc::new(RefCell::new(None)),
            subscribed: false,
        }
    }
}

impl<T, E> Future for PromiseFuture<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(settled) = this.slot.borrow_mut().take() {
            return Poll::Ready(settled);
        }

        if !this.subscribed {
            this.subscribed = true;

            let slot = this.slot.clone();
            let task = context::current_task();
            let waker = cx.waker().clone();

            this.promise.subscribe(move |settled| {
                *slot.borrow_mut() = Some(settled);

                match task {
                    Some(task) => task.resume(),
                    None => waker.wake(),
                }
            });
        }

        Poll::Pending
    }
}

impl<T, E> fmt::Debug for PromiseFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseFuture")
            .field("promise", &self.promise.cell.id())
            .field("subscribed", &self.subscribed)
            .finish()
    }
}
