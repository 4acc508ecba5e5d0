use super::collect_inputs;
use crate::promise::{IntoOutcome, Promise};
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Values collected so far, by input position.
struct Collected<T> {
    values: Vec<Option<T>>,
    remaining: usize,
}

/// Waits for every input to fulfill.
///
/// Fulfills with the values in input order. Rejects with the first
/// rejection to settle, and ignores every settlement after that.
///
/// # Examples
///
/// ```rust,ignore
/// let joined = all(&scheduler, [a.clone(), b.clone(), c.clone()]);
/// let joined = joined.then(|values: Vec<i32>| Ok(values.iter().sum::<i32>()));
/// ```
pub fn all<T, E, I>(scheduler: &Scheduler, inputs: impl IntoIterator<Item = I>) -> Promise<Vec<T>, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoOutcome<T, E>,
{
    let inputs = collect_inputs(scheduler, inputs);
    let (aggregate, resolve, reject) = Promise::with_resolvers(scheduler);

    if inputs.is_empty() {
        resolve.resolve(Vec::new());
        return aggregate;
    }

    let collected = Rc::new(RefCell::new(Collected {
        values: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.iter().enumerate() {
        let collected = collected.clone();
        let resolve = resolve.clone();
        let reject = reject.clone();

        input.subscribe(move |settled| match settled {
            Ok(value) => {
                let done = {
                    let mut collected = collected.borrow_mut();
                    collected.values[index] = Some(value);
                    collected.remaining -= 1;

                    (collected.remaining == 0).then(|| {
                        collected
                            .values
                            .iter_mut()
                            .filter_map(Option::take)
                            .collect::<Vec<_>>()
                    })
                };

                if let Some(values) = done {
                    resolve.resolve(values);
                }
            }
            Err(error) => {
                reject.reject(error);
            }
        });
    }

    aggregate
}
