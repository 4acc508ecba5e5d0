use super::{SettledResult, collect_inputs};
use crate::promise::{IntoOutcome, Promise};
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct Settled<T, E> {
    results: Vec<Option<SettledResult<T, E>>>,
    remaining: usize,
}

/// Waits for every input to settle, whichever way.
///
/// Always fulfills, with one [`SettledResult`] per input in input order.
/// The error type of the returned promise is only nominal.
pub fn all_settled<T, E, I>(
    scheduler: &Scheduler,
    inputs: impl IntoIterator<Item = I>,
) -> Promise<Vec<SettledResult<T, E>>, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoOutcome<T, E>,
{
    let inputs = collect_inputs(scheduler, inputs);
    let (aggregate, resolve, _reject) = Promise::with_resolvers(scheduler);

    if inputs.is_empty() {
        resolve.resolve(Vec::new());
        return aggregate;
    }

    let settled = Rc::new(RefCell::new(Settled {
        results: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.iter().enumerate() {
        let settled = settled.clone();
        let resolve = resolve.clone();

        input.subscribe(move |result| {
            let done = {
                let mut settled = settled.borrow_mut();
                settled.results[index] = Some(result.into());
                settled.remaining -= 1;

                (settled.remaining == 0).then(|| {
                    settled
                        .results
                        .iter_mut()
                        .filter_map(Option::take)
                        .collect::<Vec<_>>()
                })
            };

            if let Some(results) = done {
                resolve.resolve(results);
            }
        });
    }

    aggregate
}
