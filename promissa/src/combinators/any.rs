use super::collect_inputs;
use crate::error::AggregateError;
use crate::promise::{IntoOutcome, Promise};
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Rejection reasons collected so far, by input position.
struct Rejections<E> {
    errors: Vec<Option<E>>,
    remaining: usize,
}

/// Fulfills with the first input to fulfill.
///
/// Rejections are collected; once every input has rejected, the returned
/// promise rejects with an [`AggregateError`] holding every reason in
/// input order. With no inputs, it rejects right away with an empty
/// `AggregateError`.
pub fn any<T, E, I>(scheduler: &Scheduler, inputs: impl IntoIterator<Item = I>) -> Promise<T, AggregateError<E>>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
    I: IntoOutcome<T, E>,
{
    let inputs = collect_inputs(scheduler, inputs);
    let (aggregate, resolve, reject) = Promise::with_resolvers(scheduler);

    if inputs.is_empty() {
        reject.reject(AggregateError::new(Vec::new()));
        return aggregate;
    }

    let rejections = Rc::new(RefCell::new(Rejections {
        errors: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.iter().enumerate() {
        let rejections = rejections.clone();
        let resolve = resolve.clone();
        let reject = reject.clone();

        input.subscribe(move |settled| match settled {
            Ok(value) => {
                resolve.resolve(value);
            }
            Err(error) => {
                let done = {
                    let mut rejections = rejections.borrow_mut();
                    rejections.errors[index] = Some(error);
                    rejections.remaining -= 1;

                    (rejections.remaining == 0).then(|| {
                        rejections
                            .errors
                            .iter_mut()
                            .filter_map(Option::take)
                            .collect::<Vec<_>>()
                    })
                };

                if let Some(errors) = done {
                    reject.reject(AggregateError::new(errors));
                }
            }
        });
    }

    aggregate
}
