use promissa::time::sleep;
use promissa::tools::{retry, retry_with_interval};
use promissa::{EventLoopBuilder, Promise};

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_retry_succeeds_after_failures() {
    let event_loop = EventLoopBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry(event_loop.scheduler(), 3, move || {
        a.set(a.get() + 1);

        if a.get() < 3 { Err("not yet".to_string()) } else { Ok(a.get()) }
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Ok(3));
    assert_eq!(attempts.get(), 3);
}

#[test]
fn test_retry_gives_up_with_last_error() {
    let event_loop = EventLoopBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry(event_loop.scheduler(), 3, move || {
        a.set(a.get() + 1);
        Err::<i32, _>(format!("attempt {}", a.get()))
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Err("attempt 4".to_string()));
    assert_eq!(attempts.get(), 4, "One try plus three retries");
}

#[test]
fn test_retry_zero_times_runs_once() {
    let event_loop = EventLoopBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry(event_loop.scheduler(), 0, move || {
        a.set(a.get() + 1);
        Err::<i32, _>("failed".to_string())
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Err("failed".to_string()));
    assert_eq!(attempts.get(), 1);
}

#[test]
fn test_retry_with_interval_waits_between_attempts() {
    let event_loop = EventLoopBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry_with_interval(&event_loop.handle(), 5, Duration::from_millis(20), move || {
        a.set(a.get() + 1);

        if a.get() < 3 { Err("not yet".to_string()) } else { Ok("done") }
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Ok("done"));
    assert_eq!(event_loop.now(), Duration::from_millis(40), "Two waits before the third attempt");
}

#[test]
fn test_retry_with_promise_factory() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry(event_loop.scheduler(), 2, move || {
        a.set(a.get() + 1);
        let attempt = a.get();

        sleep::<String>(&handle, Duration::from_millis(10)).then(move |()| {
            if attempt == 2 { Ok(attempt * 100) } else { Err(format!("attempt {attempt}")) }
        })
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Ok(200));
    assert_eq!(event_loop.now(), Duration::from_millis(20));
}

#[test]
fn test_retry_rejected_attempts_are_not_reported() {
    let event_loop = EventLoopBuilder::new().build();
    let unhandled = Rc::new(Cell::new(0));

    let u = unhandled.clone();
    event_loop
        .scheduler()
        .on_unhandled_rejection(move |_| u.set(u.get() + 1));

    let scheduler = event_loop.scheduler().clone();
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let result = retry(event_loop.scheduler(), 1, move || {
        a.set(a.get() + 1);

        if a.get() == 1 {
            Promise::reject(&scheduler, "first".to_string())
        } else {
            Promise::resolve(&scheduler, a.get())
        }
    });

    assert_eq!(event_loop.block_on(&result).unwrap(), Ok(2));
    assert_eq!(unhandled.get(), 0);
}
