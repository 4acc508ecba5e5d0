use promissa::{DrainReport, Promise, Scheduler};

use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_drain_runs_fifo_including_nested() {
    let scheduler = Scheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let (l, s) = (log.clone(), scheduler.clone());
    scheduler.enqueue_microtask(move || {
        l.borrow_mut().push(1);

        let l = l.clone();
        s.enqueue_microtask(move || l.borrow_mut().push(3));
    });

    let l = log.clone();
    scheduler.enqueue_microtask(move || l.borrow_mut().push(2));

    assert_eq!(scheduler.pending_microtasks(), 2);

    let report = scheduler.drain();

    assert_eq!(*log.borrow(), vec![1, 2, 3]);
    assert_eq!(report.ran, 3, "Tasks queued during the drain run in the same drain");
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.total_enqueued(), 3);
}

#[test]
fn test_nested_drain_is_ignored() {
    let scheduler = Scheduler::new();
    let nested = Rc::new(RefCell::new(None));

    let (n, s) = (nested.clone(), scheduler.clone());
    scheduler.enqueue_microtask(move || {
        *n.borrow_mut() = Some(s.drain());
    });
    scheduler.enqueue_microtask(|| {});

    let report = scheduler.drain();

    assert_eq!(report.ran, 2);
    assert_eq!(*nested.borrow(), Some(DrainReport::default()));
}

#[test]
fn test_drain_on_empty_queue() {
    let scheduler = Scheduler::new();

    let report = scheduler.drain();

    assert_eq!(report, DrainReport::default());
    assert!(scheduler.is_idle());
}

#[test]
fn test_host_must_drain() {
    let scheduler = Scheduler::new();
    let ran = Rc::new(RefCell::new(false));

    let r = ran.clone();
    scheduler.enqueue_microtask(move || *r.borrow_mut() = true);

    assert!(!*ran.borrow(), "Nothing runs before the host drains");
    assert!(!scheduler.is_idle());

    scheduler.drain();
    assert!(*ran.borrow());
}

#[test]
fn test_shutdown_drops_pending_work() {
    let scheduler = Scheduler::new();
    let ran = Rc::new(RefCell::new(false));

    let r = ran.clone();
    scheduler.enqueue_microtask(move || *r.borrow_mut() = true);

    let (promise, resolve, _) = Promise::<i32, String>::with_resolvers(&scheduler);
    promise.then(|v| Ok(v + 1));
    resolve.resolve(1);

    scheduler.shutdown();
    let report = scheduler.drain();

    assert_eq!(report.ran, 0);
    assert!(!*ran.borrow());
    assert_eq!(Rc::strong_count(&ran), 1, "Dropped tasks release their captures");
}

#[test]
fn test_promise_ids_are_unique() {
    let scheduler = Scheduler::new();

    let a = Promise::<i32, String>::resolve(&scheduler, 1);
    let b = Promise::<i32, String>::resolve(&scheduler, 2);

    assert_ne!(a.id(), b.id());
    assert!(a.id() < b.id());
}
