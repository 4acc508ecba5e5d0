use crate::promise::Promise;
use crate::runtime::core::LoopHandle;

use std::fmt;
use std::time::Duration;

/// Measures how long `promise` takes to settle.
///
/// The returned promise fulfills with a tuple containing:
/// - the result of the wrapped promise,
/// - the time elapsed on the loop's clock since this call.
///
/// It never rejects: a rejection of the wrapped promise is reported as
/// the `Err` half of the tuple.
///
/// # Examples
///
/// ```rust,ignore
/// let (result, elapsed) = instrumented(&handle, &fetch).await?;
/// tracing::info!(?elapsed, ok = result.is_ok(), "fetch settled");
/// ```
pub fn instrumented<T, E>(handle: &LoopHandle, promise: &Promise<T, E>) -> Promise<(Result<T, E>, Duration), E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    let (measured, resolve, _reject) = Promise::with_resolvers(handle.scheduler());

    let start = handle.now();
    let handle = handle.clone();

    promise.subscribe(move |settled| {
        let elapsed = handle.now().saturating_sub(start);
        resolve.resolve((settled, elapsed));
    });

    measured
}
