use promissa::time::{instrumented, sleep, timeout};
use promissa::{EventLoopBuilder, Promise, TimeoutError, spawn_async};

use std::time::Duration;

#[test]
fn test_sleep() {
    let event_loop = EventLoopBuilder::new().build();

    let delay = Duration::from_millis(50);
    let slept = sleep::<String>(&event_loop.handle(), delay);

    assert!(slept.is_pending());
    assert_eq!(event_loop.block_on(&slept).unwrap(), Ok(()));
    assert_eq!(event_loop.now(), delay);
}

#[test]
fn test_sleep_inside_routine() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let routine: Promise<_, String> = spawn_async(event_loop.scheduler(), async move {
        sleep::<String>(&handle, Duration::from_millis(10)).await?;
        let first = handle.now();

        sleep::<String>(&handle, Duration::from_millis(15)).await?;
        Ok((first, handle.now()))
    });

    assert_eq!(
        event_loop.block_on(&routine).unwrap(),
        Ok((Duration::from_millis(10), Duration::from_millis(25)))
    );
}

#[test]
fn test_timeout_elapsed() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let slow = sleep::<String>(&handle, Duration::from_millis(100));
    let bounded = timeout(&handle, Duration::from_millis(10), &slow);

    let result = event_loop.block_on(&bounded).unwrap();

    assert_eq!(result, Err(TimeoutError::Elapsed(Duration::from_millis(10))));
    assert!(result.unwrap_err().is_elapsed());
    assert_eq!(event_loop.now(), Duration::from_millis(10));
    assert!(slow.is_pending(), "The input keeps running after the deadline");
}

#[test]
fn test_timeout_ok_clears_timer() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let fast = sleep::<String>(&handle, Duration::from_millis(10))
        .then(|()| Ok(7));
    let bounded = timeout(&handle, Duration::from_millis(100), &fast);

    assert_eq!(event_loop.block_on(&bounded).unwrap(), Ok(7));
    assert_eq!(event_loop.handle().pending_macrotasks(), 0);

    event_loop.run().unwrap();
    assert_eq!(event_loop.now(), Duration::from_millis(10), "The deadline timer was cleared");
}

#[test]
fn test_timeout_wraps_rejection() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let failing = Promise::<i32, String>::reject(event_loop.scheduler(), "refused".to_string());
    let bounded = timeout(&handle, Duration::from_millis(10), &failing);

    let error = event_loop.block_on(&bounded).unwrap().unwrap_err();

    assert_eq!(error, TimeoutError::Rejected("refused".to_string()));
    assert_eq!(error.into_rejection(), Some("refused".to_string()));
}

#[test]
fn test_instrumented() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let work = sleep::<String>(&handle, Duration::from_millis(30)).then(|()| Ok(1));
    let measured = instrumented(&handle, &work);

    assert_eq!(
        event_loop.block_on(&measured).unwrap(),
        Ok((Ok(1), Duration::from_millis(30)))
    );
}

#[test]
fn test_instrumented_reports_rejection() {
    let event_loop = EventLoopBuilder::new().build();
    let handle = event_loop.handle();

    let failing = Promise::<i32, String>::reject(event_loop.scheduler(), "nope".to_string());
    let measured = instrumented(&handle, &failing);

    let (result, elapsed) = event_loop.block_on(&measured).unwrap().unwrap();

    assert_eq!(result, Err("nope".to_string()));
    assert_eq!(elapsed, Duration::ZERO);
}
