mod common;

use stepwise::time::sleep;
use stepwise::{Error, RuntimeBuilder};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[stepwise::test]
fn sleep_waits_at_least_duration() {
    common::init_tracing();

    let start = Instant::now();
    sleep(Duration::from_millis(100)).value().unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_millis(100),
        "Sleep returned too early: {:?}",
        elapsed
    );
}

#[stepwise::test]
fn shorter_sleep_fires_first() {
    let long = sleep(Duration::from_millis(150));
    let short = sleep(Duration::from_millis(20));

    short.wait();
    assert!(long.is_running());

    long.wait();
    assert!(long.has_value());
}

#[test]
fn sleep_outside_runtime_fails() {
    let delay = sleep(Duration::from_millis(10));

    assert!(matches!(delay.value(), Err(Error::NoRuntime)));
}

#[stepwise::test]
fn canceled_sleep_never_fires() {
    let fired = Arc::new(AtomicUsize::new(0));
    let delay = sleep(Duration::from_millis(50));

    let counter = fired.clone();
    delay.add_callback(move |settled| {
        if settled.has_value() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    delay.cancel();
    assert!(delay.is_canceled());

    sleep(Duration::from_millis(120)).wait();

    assert!(delay.is_canceled());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[stepwise::test]
fn cancel_after_elapsing_is_noop() {
    let delay = sleep(Duration::from_millis(10));
    delay.wait();

    delay.cancel();

    assert!(delay.has_value());
}

#[test]
fn handle_sleep_works_without_entering() {
    let runtime = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let start = Instant::now();
    runtime.sleep(Duration::from_millis(30)).value().unwrap();

    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn dropping_runtime_fails_pending_timers() {
    let runtime = RuntimeBuilder::new().worker_threads(1).build().unwrap();
    let delay = runtime.sleep(Duration::from_secs(60));

    drop(runtime);

    assert!(matches!(delay.value(), Err(Error::Shutdown)));
}
