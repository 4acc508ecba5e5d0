use super::collect_inputs;
use crate::promise::{IntoOutcome, Promise};
use crate::scheduler::Scheduler;

use std::fmt;

/// Adopts the outcome of the first input to settle.
///
/// Later settlements are ignored. With no inputs, the returned promise
/// never settles.
pub fn race<T, E, I>(scheduler: &Scheduler, inputs: impl IntoIterator<Item = I>) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoOutcome<T, E>,
{
    let inputs = collect_inputs(scheduler, inputs);
    let (aggregate, resolve, reject) = Promise::with_resolvers(scheduler);

    if inputs.is_empty() {
        tracing::debug!(promise = %aggregate.id(), "race over no inputs never settles");
        return aggregate;
    }

    for input in &inputs {
        let resolve = resolve.clone();
        let reject = reject.clone();

        input.subscribe(move |settled| {
            match settled {
                Ok(value) => resolve.resolve(value),
                Err(error) => reject.reject(error),
            };
        });
    }

    aggregate
}
