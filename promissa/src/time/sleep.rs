use crate::promise::Promise;
use crate::runtime::core::LoopHandle;

use std::fmt;
use std::time::Duration;

/// Creates a promise that fulfills once `duration` has elapsed.
///
/// The timer is registered right away on the loop behind `handle`. The
/// error type is only nominal: the promise never rejects.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep::<String>(&handle, Duration::from_millis(10)).await?;
/// ```
pub fn sleep<E>(handle: &LoopHandle, duration: Duration) -> Promise<(), E>
where
    E: Clone + fmt::Debug + 'static,
{
    let (promise, resolve, _reject) = Promise::with_resolvers(handle.scheduler());

    handle.set_timeout(duration, move || {
        resolve.resolve(());
    });

    promise
}
