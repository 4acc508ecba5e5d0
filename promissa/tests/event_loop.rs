use promissa::{
    ClockMode, EventLoopBuilder, MacrotaskSource, Promise, RuntimeError, Scheduler, Turn, spawn_async,
};

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_microtasks_drain_between_macrotasks() {
    let event_loop = EventLoopBuilder::new().build();
    let log = Rc::new(RefCell::new(Vec::new()));

    let (l, s) = (log.clone(), event_loop.scheduler().clone());
    event_loop.queue_task(move || {
        l.borrow_mut().push("task 1");

        let l = l.clone();
        s.enqueue_microtask(move || l.borrow_mut().push("microtask"));
    });

    let l = log.clone();
    event_loop.queue_task(move || l.borrow_mut().push("task 2"));

    event_loop.run().unwrap();

    assert_eq!(*log.borrow(), vec!["task 1", "microtask", "task 2"]);
}

#[test]
fn test_promise_reactions_run_before_next_task() {
    let event_loop = EventLoopBuilder::new().build();
    let log = Rc::new(RefCell::new(Vec::new()));

    let (l, s) = (log.clone(), event_loop.scheduler().clone());
    event_loop.queue_task(move || {
        let l = l.clone();
        Promise::<(), String>::resolve(&s, ()).then(move |()| {
            l.borrow_mut().push("reaction");
            Ok(())
        });
    });

    let l = log.clone();
    event_loop.queue_task(move || l.borrow_mut().push("next task"));

    event_loop.run().unwrap();

    assert_eq!(*log.borrow(), vec!["reaction", "next task"]);
}

#[test]
fn test_timers_fire_by_deadline_then_registration() {
    let event_loop = EventLoopBuilder::new().build();
    let log = Rc::new(RefCell::new(Vec::new()));

    for (delay, name) in [(20, "b"), (10, "a"), (20, "c")] {
        let l = log.clone();
        event_loop.set_timeout(Duration::from_millis(delay), move || l.borrow_mut().push(name));
    }

    event_loop.run().unwrap();

    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert_eq!(event_loop.now(), Duration::from_millis(20));
}

#[test]
fn test_nested_timers_use_current_time() {
    let event_loop = EventLoopBuilder::new().build();
    let fired_at = Rc::new(RefCell::new(None));

    let (f, handle) = (fired_at.clone(), event_loop.handle());
    event_loop.set_timeout(Duration::from_millis(10), move || {
        let inner = handle.clone();
        handle.set_timeout(Duration::from_millis(10), move || {
            *f.borrow_mut() = Some(inner.now());
        });
    });

    event_loop.run().unwrap();

    assert_eq!(*fired_at.borrow(), Some(Duration::from_millis(20)));
}

#[test]
fn test_clear_timeout() {
    let event_loop = EventLoopBuilder::new().build();
    let fired = Rc::new(RefCell::new(false));

    let f = fired.clone();
    let id = event_loop.set_timeout(Duration::from_millis(10), move || *f.borrow_mut() = true);

    assert!(event_loop.clear_timeout(id));
    assert!(!event_loop.clear_timeout(id), "A timer is cancelled only once");

    event_loop.run().unwrap();

    assert!(!*fired.borrow());
    assert_eq!(event_loop.now(), Duration::ZERO, "Cancelled timers do not move the clock");
}

#[test]
fn test_turn_reports_progress() {
    let event_loop = EventLoopBuilder::new().build();

    let id = event_loop.set_timeout(Duration::from_millis(5), || {});
    event_loop.queue_task(|| {});

    assert_eq!(event_loop.turn().unwrap(), Turn::Ran(MacrotaskSource::Task));
    assert_eq!(event_loop.turn().unwrap(), Turn::Ran(MacrotaskSource::Timer(id)));
    assert_eq!(event_loop.turn().unwrap(), Turn::Idle);
}

#[test]
fn test_has_pending_work() {
    let event_loop = EventLoopBuilder::new().build();
    assert!(!event_loop.has_pending_work());

    event_loop.scheduler().enqueue_microtask(|| {});
    assert!(event_loop.has_pending_work());

    event_loop.turn().unwrap();
    assert!(!event_loop.has_pending_work());

    event_loop.set_timeout(Duration::from_secs(1), || {});
    assert!(event_loop.has_pending_work());
    assert_eq!(event_loop.handle().pending_macrotasks(), 1);

    event_loop.run().unwrap();
    assert!(!event_loop.has_pending_work());
}

#[test]
fn test_block_on_returns_rejection() {
    let event_loop = EventLoopBuilder::new().build();
    let unhandled = Rc::new(RefCell::new(0));

    let u = unhandled.clone();
    event_loop
        .scheduler()
        .on_unhandled_rejection(move |_| *u.borrow_mut() += 1);

    let failed = Promise::<i32, String>::reject(event_loop.scheduler(), "boom".to_string());

    assert_eq!(event_loop.block_on(&failed).unwrap(), Err("boom".to_string()));
    assert_eq!(*unhandled.borrow(), 0, "Blocking on a promise observes it");
}

#[test]
fn test_block_on_stalls_without_work() {
    let event_loop = EventLoopBuilder::new().build();
    let (never, _resolve, _reject) = Promise::<i32, String>::with_resolvers(event_loop.scheduler());

    let waiting = spawn_async(event_loop.scheduler(), async move { never.await });

    assert_eq!(
        event_loop.block_on(&waiting),
        Err(RuntimeError::Stalled {
            promise: waiting.id(),
            suspended_tasks: 1,
        })
    );
}

#[test]
fn test_microtask_budget() {
    fn spin(scheduler: Scheduler) {
        let next = scheduler.clone();
        scheduler.enqueue_microtask(move || spin(next));
    }

    let event_loop = EventLoopBuilder::new().microtask_budget(10).build();
    spin(event_loop.scheduler().clone());

    assert_eq!(
        event_loop.run(),
        Err(RuntimeError::MicrotaskBudgetExceeded { budget: 10 })
    );
}

#[test]
fn test_drop_releases_queued_work() {
    let captured = Rc::new(());

    {
        let event_loop = EventLoopBuilder::new().build();

        let c = captured.clone();
        event_loop.set_timeout(Duration::from_secs(1), move || drop(c));

        let c = captured.clone();
        event_loop.scheduler().enqueue_microtask(move || drop(c));

        let (never, _resolve, _reject) = Promise::<i32, String>::with_resolvers(event_loop.scheduler());
        let c = captured.clone();
        spawn_async(event_loop.scheduler(), async move {
            let _c = c;
            never.await
        });

        assert_eq!(Rc::strong_count(&captured), 4);
    }

    assert_eq!(Rc::strong_count(&captured), 1);
}

#[test]
fn test_real_clock_sleeps_until_deadline() {
    let event_loop = EventLoopBuilder::new().clock(ClockMode::Real).build();
    let fired_at = Rc::new(RefCell::new(Duration::ZERO));

    let (f, handle) = (fired_at.clone(), event_loop.handle());
    event_loop.set_timeout(Duration::from_millis(5), move || *f.borrow_mut() = handle.now());

    event_loop.run().unwrap();

    assert!(*fired_at.borrow() >= Duration::from_millis(5));
}

#[test]
fn test_run_drains_work_queued_by_rejection_hook() {
    let event_loop = EventLoopBuilder::new().build();
    let ran = Rc::new(RefCell::new(false));

    let (r, s) = (ran.clone(), event_loop.scheduler().clone());
    event_loop.scheduler().on_unhandled_rejection(move |_| {
        let r = r.clone();
        s.enqueue_microtask(move || *r.borrow_mut() = true);
    });

    Promise::<i32, String>::reject(event_loop.scheduler(), "boom".to_string());
    event_loop.run().unwrap();

    assert!(*ran.borrow());
    assert!(!event_loop.has_pending_work());
}

#[test]
fn test_block_on_sees_settlement_queued_by_rejection_hook() {
    let event_loop = EventLoopBuilder::new().build();
    let (target, resolve, _) = Promise::<i32, String>::with_resolvers(event_loop.scheduler());

    let s = event_loop.scheduler().clone();
    event_loop.scheduler().on_unhandled_rejection(move |_| {
        let resolve = resolve.clone();
        s.enqueue_microtask(move || {
            resolve.resolve(7);
        });
    });

    Promise::<i32, String>::reject(event_loop.scheduler(), "boom".to_string());

    assert_eq!(event_loop.block_on(&target), Ok(Ok(7)));
}
