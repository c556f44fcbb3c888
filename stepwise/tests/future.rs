mod common;

use stepwise::{Error, Future, FutureState, Promise};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn promise_settles_once() {
    common::init_tracing();

    let promise = Promise::new();
    let future = promise.future();

    assert!(future.is_running());
    promise.set_value(1).unwrap();

    assert!(matches!(promise.set_value(2), Err(Error::AlreadySettled)));
    assert!(matches!(promise.set_error(Error::msg("late")), Err(Error::AlreadySettled)));
    assert!(promise.is_settled());
    assert_eq!(future.state(), FutureState::FinishedWithValue);
    assert_eq!(future.value().unwrap(), 1);
}

#[test]
fn value_set_from_another_thread() {
    let promise = Promise::new();
    let future = promise.future();

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        promise.set_value(String::from("ready")).unwrap();
    });

    assert_eq!(future.value().unwrap(), "ready");
    writer.join().unwrap();
}

#[test]
fn callback_after_settlement_runs_once_synchronously() {
    let future = Future::ready(5);
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    future.add_callback(move |settled| {
        assert_eq!(settled.value().unwrap(), 5);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn callbacks_run_in_registration_order() {
    let promise = Promise::new();
    let future = promise.future();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..5 {
        let order = order.clone();
        future.add_callback(move |_| order.lock().unwrap().push(i));
    }

    promise.set_value(()).unwrap();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn callback_panic_does_not_poison_others() {
    let promise = Promise::new();
    let future = promise.future();
    let calls = Arc::new(AtomicUsize::new(0));

    future.add_callback(|_| panic!("callback exploded"));

    let counter = calls.clone();
    future.add_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    promise.set_value(()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(future.has_value());
}

#[test]
fn dropping_last_promise_breaks_future() {
    let promise = Promise::<u8>::new();
    let future = promise.future();

    let copy = promise.clone();
    drop(promise);
    assert!(future.is_running(), "a clone still holds the promise");

    drop(copy);
    assert!(matches!(future.value(), Err(Error::BrokenPromise)));
}

#[test]
fn error_description_is_reported() {
    let future = Future::<()>::failed(Error::msg("disk on fire"));

    assert!(future.has_error());
    assert_eq!(future.error().as_deref(), Some("disk on fire"));
}

#[test]
fn cancel_without_handler_does_nothing() {
    let promise = Promise::<()>::new();
    let future = promise.future();

    assert!(!future.is_cancelable());
    future.cancel();

    assert!(future.is_cancel_requested());
    assert!(future.is_running());

    promise.set_value(()).unwrap();
    assert!(future.has_value());
}

#[test]
fn cancel_handler_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let promise = Promise::<()>::with_cancel(move |promise| {
        counter.fetch_add(1, Ordering::SeqCst);
        promise.set_canceled().unwrap();
    });
    let future = promise.future();

    assert!(future.is_cancelable());
    future.cancel();
    future.cancel();

    assert!(future.is_canceled());
    assert!(matches!(future.value(), Err(Error::Canceled)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_after_settlement_is_ignored() {
    let future = Future::ready(3);
    future.cancel();

    assert!(future.has_value());
    assert!(!future.is_cancel_requested());
}

#[test]
fn wait_for_reports_running_on_timeout() {
    let promise = Promise::<()>::new();
    let future = promise.future();

    assert_eq!(
        future.wait_for(Duration::from_millis(20)),
        FutureState::Running
    );

    promise.set_canceled().unwrap();
    assert_eq!(future.wait_for(Duration::from_millis(20)), FutureState::Canceled);
}

#[test]
fn then_sees_settled_future() {
    let future = Future::<u8>::failed(Error::msg("nope"));
    let failed = future.then(|settled| settled.has_error());

    assert!(failed.value().unwrap());
}

#[test]
fn then_panic_becomes_error() {
    let future = Future::ready(1);
    let chained = future.then(|_| -> u8 { panic!("Nope") });

    match chained.value() {
        Err(Error::Panicked(message)) => assert!(message.contains("Nope")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn and_then_skips_errors_and_cancellation() {
    let failed = Future::<u8>::failed(Error::msg("upstream"));
    let mapped = failed.and_then(|v| v + 1);
    assert_eq!(mapped.error().as_deref(), Some("upstream"));

    let canceled = Future::<u8>::canceled().and_then(|v| v + 1);
    assert!(canceled.is_canceled());

    let ok = Future::ready(41u8).and_then(|v| v + 1);
    assert_eq!(ok.value().unwrap(), 42);
}

#[test]
fn try_map_failure_propagates() {
    let future = Future::ready("12a").try_map(|s| s.parse::<u32>().map_err(Error::custom));

    let error = future.value().unwrap_err();
    assert!(error.downcast_ref::<std::num::ParseIntError>().is_some());
}

#[test]
fn canceling_chained_future_cancels_source() {
    let promise = Promise::<u8>::with_cancel(|promise| {
        let _ = promise.set_canceled();
    });
    let source = promise.future();
    let chained = source.and_then(|v| v * 2);

    chained.cancel();

    assert!(source.is_canceled());
    assert!(chained.is_canceled());
}

#[test]
fn erased_value_downcasts() {
    let value = Future::ready(String::from("typed")).erase().value().unwrap();

    assert!(value.is::<String>());
    assert_eq!(value.downcast::<String>().unwrap(), "typed");
    assert!(matches!(
        value.downcast::<u32>(),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn thread_local_values_settle_on_one_thread() {
    let promise = Promise::new();
    let future = promise.future();

    promise.set_value(std::rc::Rc::new(5u8)).unwrap();
    drop(promise);

    assert_eq!(*future.value().unwrap(), 5);
    assert!(future.has_value());
}
