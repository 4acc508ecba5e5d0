use promissa::{
    AggregateError, EventLoop, EventLoopBuilder, Promise, PromiseState, RuntimeError, Scheduler,
    SettledResult, all, all_settled, any, race,
};

use std::time::Duration;

/// A promise settled by a timer after `delay_ms`.
fn delayed(event_loop: &EventLoop, delay_ms: u64, outcome: Result<i32, String>) -> Promise<i32, String> {
    let (promise, resolve, reject) = Promise::with_resolvers(event_loop.scheduler());

    event_loop.set_timeout(Duration::from_millis(delay_ms), move || {
        match outcome {
            Ok(value) => resolve.resolve(value),
            Err(error) => reject.reject(error),
        };
    });

    promise
}

/// Inputs settling at t1 < t2 < t3 with outcomes (ok, fail, ok).
fn staggered(event_loop: &EventLoop) -> Vec<Promise<i32, String>> {
    vec![
        delayed(event_loop, 10, Ok(1)),
        delayed(event_loop, 20, Err("fail".to_string())),
        delayed(event_loop, 30, Ok(3)),
    ]
}

#[test]
fn test_all_rejects_with_first_failure() {
    let event_loop = EventLoopBuilder::new().build();
    let joined = all(event_loop.scheduler(), staggered(&event_loop));

    let result = event_loop.block_on(&joined).unwrap();

    assert_eq!(result, Err("fail".to_string()));
    assert_eq!(event_loop.now(), Duration::from_millis(20), "Should not wait for t3");
}

#[test]
fn test_all_keeps_input_order() {
    let event_loop = EventLoopBuilder::new().build();

    let joined = all(
        event_loop.scheduler(),
        [
            delayed(&event_loop, 30, Ok(1)),
            delayed(&event_loop, 10, Ok(2)),
            delayed(&event_loop, 20, Ok(3)),
        ],
    );

    assert_eq!(event_loop.block_on(&joined).unwrap(), Ok(vec![1, 2, 3]));
}

#[test]
fn test_all_ignores_later_settlements() {
    let event_loop = EventLoopBuilder::new().build();

    let joined = all(
        event_loop.scheduler(),
        [
            delayed(&event_loop, 10, Err("first".to_string())),
            delayed(&event_loop, 20, Err("second".to_string())),
        ],
    );

    event_loop.run().unwrap();

    assert_eq!(joined.state(), PromiseState::Rejected("first".to_string()));
}

#[test]
fn test_all_settled_reports_every_input() {
    let event_loop = EventLoopBuilder::new().build();
    let settled = all_settled(event_loop.scheduler(), staggered(&event_loop));

    let results = event_loop.block_on(&settled).unwrap().unwrap();

    assert_eq!(
        results,
        vec![
            SettledResult::Fulfilled(1),
            SettledResult::Rejected("fail".to_string()),
            SettledResult::Fulfilled(3),
        ]
    );
    assert_eq!(
        results.iter().map(SettledResult::status).collect::<Vec<_>>(),
        vec!["fulfilled", "rejected", "fulfilled"]
    );
    assert_eq!(event_loop.now(), Duration::from_millis(30));
}

#[test]
fn test_race_adopts_first_settlement() {
    let event_loop = EventLoopBuilder::new().build();
    let winner = race(event_loop.scheduler(), staggered(&event_loop));

    assert_eq!(event_loop.block_on(&winner).unwrap(), Ok(1));
    assert_eq!(event_loop.now(), Duration::from_millis(10));
}

#[test]
fn test_race_adopts_first_rejection() {
    let event_loop = EventLoopBuilder::new().build();

    let winner = race(
        event_loop.scheduler(),
        [
            delayed(&event_loop, 10, Ok(1)),
            delayed(&event_loop, 5, Err("early".to_string())),
        ],
    );

    assert_eq!(event_loop.block_on(&winner).unwrap(), Err("early".to_string()));
}

#[test]
fn test_any_adopts_first_fulfillment() {
    let event_loop = EventLoopBuilder::new().build();
    let first = any(event_loop.scheduler(), staggered(&event_loop));

    assert_eq!(event_loop.block_on(&first).unwrap(), Ok(1));
}

#[test]
fn test_any_skips_rejections() {
    let event_loop = EventLoopBuilder::new().build();

    let first = any(
        event_loop.scheduler(),
        [
            delayed(&event_loop, 5, Err("a".to_string())),
            delayed(&event_loop, 10, Ok(2)),
        ],
    );

    assert_eq!(event_loop.block_on(&first).unwrap(), Ok(2));
}

#[test]
fn test_any_aggregates_in_input_order() {
    let event_loop = EventLoopBuilder::new().build();

    let first = any(
        event_loop.scheduler(),
        [
            delayed(&event_loop, 30, Err("a".to_string())),
            delayed(&event_loop, 10, Err("b".to_string())),
        ],
    );

    let error = event_loop.block_on(&first).unwrap().unwrap_err();

    assert_eq!(error.errors(), ["a".to_string(), "b".to_string()]);
    assert_eq!(error.to_string(), "all promises were rejected (2 reasons)");
}

#[test]
fn test_plain_values_as_inputs() {
    let scheduler = Scheduler::new();

    let joined = all(&scheduler, vec![Ok::<i32, String>(1), Ok(2)]);
    let mixed = all_settled(&scheduler, vec![Ok::<i32, String>(1), Err("e".to_string())]);

    scheduler.drain();

    assert_eq!(joined.state(), PromiseState::Fulfilled(vec![1, 2]));
    assert_eq!(
        mixed.state(),
        PromiseState::Fulfilled(vec![
            SettledResult::Fulfilled(1),
            SettledResult::Rejected("e".to_string())
        ])
    );
}

#[test]
fn test_empty_inputs() {
    let event_loop = EventLoopBuilder::new().build();
    let scheduler = event_loop.scheduler();

    let joined = all(scheduler, Vec::<Promise<i32, String>>::new());
    let settled = all_settled(scheduler, Vec::<Promise<i32, String>>::new());
    let first = any(scheduler, Vec::<Promise<i32, String>>::new());
    let winner = race(scheduler, Vec::<Promise<i32, String>>::new());

    assert_eq!(joined.state(), PromiseState::Fulfilled(Vec::new()));
    assert_eq!(settled.state(), PromiseState::Fulfilled(Vec::new()));
    assert_eq!(
        event_loop.block_on(&first).unwrap(),
        Err(AggregateError::new(Vec::new()))
    );

    assert_eq!(
        event_loop.block_on(&winner),
        Err(RuntimeError::Stalled {
            promise: winner.id(),
            suspended_tasks: 0,
        }),
        "An empty race never settles"
    );
}
