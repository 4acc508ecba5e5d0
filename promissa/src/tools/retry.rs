use crate::promise::{IntoOutcome, Promise};
use crate::runtime::core::LoopHandle;
use crate::scheduler::Scheduler;
use crate::task::spawn_async;
use crate::time::sleep;

use std::fmt;
use std::time::Duration;

/// Runs the operation produced by `factory`, retrying it up to `times`
/// times while it rejects.
///
/// The operation runs at most `times + 1` times. The returned promise
/// adopts the first fulfillment, or the last rejection once the retries
/// are used up.
///
/// # Examples
///
/// ```rust,ignore
/// let fetched = retry(&scheduler, 3, move || connect(&handle));
/// ```
pub fn retry<T, E, R, G>(scheduler: &Scheduler, times: usize, factory: G) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    R: IntoOutcome<T, E>,
    G: FnMut() -> R + 'static,
{
    run_attempts(scheduler, times, factory, None)
}

/// Like [`retry`], but waits `interval` on the loop's clock between a
/// rejection and the next attempt.
pub fn retry_with_interval<T, E, R, G>(
    handle: &LoopHandle,
    times: usize,
    interval: Duration,
    factory: G,
) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    R: IntoOutcome<T, E>,
    G: FnMut() -> R + 'static,
{
    let delay = (!interval.is_zero()).then(|| (handle.clone(), interval));
    run_attempts(handle.scheduler(), times, factory, delay)
}

fn run_attempts<T, E, R, G>(
    scheduler: &Scheduler,
    times: usize,
    mut factory: G,
    delay: Option<(LoopHandle, Duration)>,
) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    R: IntoOutcome<T, E>,
    G: FnMut() -> R + 'static,
{
    let owner = scheduler.clone();

    spawn_async(scheduler, async move {
        let mut remaining = times;
        let mut attempt = 1;

        loop {
            let outcome = Promise::from_outcome(&owner, factory()).await;

            match outcome {
                Ok(value) => return Ok(value),
                Err(error) if remaining == 0 => {
                    tracing::debug!(attempt, ?error, "last attempt failed, giving up");
                    return Err(error);
                }
                Err(error) => {
                    remaining -= 1;
                    tracing::debug!(attempt, remaining, ?error, "attempt failed, retrying");

                    if let Some((handle, interval)) = &delay {
                        sleep::<E>(handle, *interval).await?;
                    }
                    attempt += 1;
                }
            }
        }
    })
}
