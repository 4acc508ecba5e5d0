use crate::scheduler::context;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that suspends the current routine exactly once.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    /// On the first poll, queues a resumption of the current routine as a
    /// new microtask and returns `Poll::Pending`. On the second poll, the
    /// future completes.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.0 {
            self.0 = true;

            match context::current_task() {
                Some(task) => task.resume_later(),
                None => cx.waker().wake_by_ref(),
            }
            return Poll::Pending;
        }

        Poll::Ready(())
    }
}

/// Suspends the current routine for one microtask hop.
///
/// Microtasks queued before the call run before the routine continues.
///
/// # Examples
///
/// ```rust,ignore
/// spawn_async(&scheduler, async {
///     // Let already-queued reactions run first
///     yield_now().await;
///     Ok::<_, String>(())
/// });
/// ```
pub async fn yield_now() {
    YieldOnce(false).await
}
