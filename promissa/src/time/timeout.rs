use crate::error::TimeoutError;
use crate::promise::Promise;
use crate::runtime::core::LoopHandle;

use std::fmt;
use std::time::Duration;

/// Bounds how long `promise` may stay pending.
///
/// The returned promise adopts the outcome of `promise` if it settles
/// within `duration`, wrapping a rejection in [`TimeoutError::Rejected`].
/// Otherwise it rejects with [`TimeoutError::Elapsed`] when the timer
/// fires. The timer is cleared as soon as `promise` settles.
///
/// The input promise itself is left untouched: it keeps running and may
/// still settle after the deadline.
pub fn timeout<T, E>(handle: &LoopHandle, duration: Duration, promise: &Promise<T, E>) -> Promise<T, TimeoutError<E>>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    let (bounded, resolve, reject) = Promise::with_resolvers(handle.scheduler());

    let timer = {
        let reject = reject.clone();
        let id = promise.id();

        handle.set_timeout(duration, move || {
            if reject.reject(TimeoutError::Elapsed(duration)) {
                tracing::debug!(promise = %id, ?duration, "timeout elapsed");
            }
        })
    };

    let handle = handle.clone();
    promise.subscribe(move |settled| {
        handle.clear_timeout(timer);

        match settled {
            Ok(value) => resolve.resolve(value),
            Err(error) => reject.reject(TimeoutError::Rejected(error)),
        };
    });

    bounded
}
