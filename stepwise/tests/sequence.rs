mod common;

use stepwise::time::sleep;
use stepwise::{
    Error, Future, Promise, Resume, Sequence, SequenceBuilder, SiblingPolicy, Step, task,
};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type Log = Arc<Mutex<Vec<&'static str>>>;

/// An operation whose side effect happens as soon as it is requested.
fn record(log: &Log, name: &'static str) -> Future<()> {
    log.lock().unwrap().push(name);
    Future::ready(())
}

#[derive(Debug, thiserror::Error)]
#[error("sensor {0} offline")]
struct SensorOffline(u8);

#[test]
fn explicit_return_carries_value() {
    common::init_tracing();

    let mut stage = 0;
    let sequence = Sequence::start(move |input: Resume| {
        stage += 1;
        match stage {
            1 => Ok(Step::wait(Future::ready(20u32))),
            _ => Ok(Step::Return(input.get::<u32>()? + 22)),
        }
    });

    assert!(sequence.has_value());
    assert_eq!(sequence.value().unwrap(), Some(42));
}

#[test]
fn exhausted_computation_yields_no_value() {
    let mut stage = 0;
    let sequence = Sequence::start(move |input: Resume| {
        input.into_value()?;
        stage += 1;
        match stage {
            1 | 2 => Ok(Step::wait(Future::ready(stage))),
            _ => Ok(Step::<()>::Done),
        }
    });

    assert_eq!(sequence.value().unwrap(), None);
    assert!(sequence.exception().is_none());
}

#[stepwise::test]
fn steps_run_in_yield_order() {
    let log = Log::default();
    let delay = Duration::from_millis(100);

    let steps = log.clone();
    let mut stage = 0;
    let start = Instant::now();
    let sequence = Sequence::start(move |input: Resume| {
        input.into_value()?;
        stage += 1;
        match stage {
            1 => Ok(Step::wait(record(&steps, "op1"))),
            2 => Ok(Step::wait(sleep(delay))),
            3 => Ok(Step::wait(record(&steps, "op2"))),
            _ => Ok(Step::<()>::Done),
        }
    });

    assert_eq!(*log.lock().unwrap(), vec!["op1"]);

    sequence.wait_for(delay / 2);
    assert_eq!(*log.lock().unwrap(), vec!["op1"], "op2 ran before the sleep");

    sequence.value().unwrap();
    assert!(start.elapsed() >= delay);
    assert_eq!(*log.lock().unwrap(), vec!["op1", "op2"]);
}

#[stepwise::test]
fn join_step_waits_for_every_member() {
    let delay = Duration::from_millis(100);
    let timers = vec![sleep(delay), sleep(delay)];
    let watched = timers.clone();

    let start = Instant::now();
    let sequence = Sequence::start(move |input: Resume| {
        if input.is_start() {
            return Ok(Step::join(timers.clone()));
        }

        let values = input.into_values()?;
        Ok(Step::Return(values.len()))
    });

    assert_eq!(sequence.value().unwrap(), Some(2));
    assert!(start.elapsed() >= delay);
    assert!(watched.iter().all(Future::has_value));
}

#[test]
fn step_failure_can_be_handled_locally() {
    let sequence = Sequence::start(move |input: Resume| match input {
        Resume::Start => Ok(Step::wait(Future::<u8>::failed(Error::msg("step failed")))),
        Resume::Error(error) => {
            assert_eq!(error.to_string(), "step failed");
            Ok(Step::Return("recovered"))
        }
        Resume::Value(_) => Ok(Step::Return("unexpected")),
    });

    assert_eq!(sequence.value().unwrap(), Some("recovered"));
}

#[test]
fn escaped_error_fails_sequence_and_keeps_original() {
    let sequence = Sequence::start(move |input: Resume| {
        if input.is_start() {
            let offline = Future::<()>::failed(Error::custom(SensorOffline(3)));
            return Ok(Step::wait(offline));
        }

        input.into_value()?;
        Ok(Step::Return(1))
    });

    assert!(sequence.has_error());
    assert_eq!(sequence.error().as_deref(), Some("sensor 3 offline"));

    let error = sequence.value().unwrap_err();
    assert!(error.downcast_ref::<SensorOffline>().is_some());
    assert!(sequence.exception().is_some());

    assert!(matches!(
        sequence.future().value(),
        Err(Error::Failed(description)) if description == "sensor 3 offline"
    ));
}

#[test]
fn panic_in_first_step_fails_with_its_message() {
    let sequence = Sequence::start(|_input: Resume| -> stepwise::Result<Step<()>> {
        assert_eq!(1 + 1, 3, "Nope");
        Ok(Step::Done)
    });

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    sequence.add_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(sequence.has_error());
    assert!(sequence.error().unwrap().contains("Nope"));
    assert!(matches!(sequence.value(), Err(Error::Panicked(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn panic_after_suspension_runs_callbacks_once() {
    let gate = Promise::<()>::new();
    let step = gate.future();

    let sequence = Sequence::start(move |input: Resume| -> stepwise::Result<Step<()>> {
        if input.is_start() {
            return Ok(Step::wait(step.clone()));
        }

        panic!("Nope");
    });

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    sequence.add_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    gate.set_value(()).unwrap();

    assert!(sequence.error().unwrap().contains("Nope"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[stepwise::test]
fn cancel_keeps_completed_steps_only() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let steps = log.clone();
    let mut stage = 0;
    let sequence = Sequence::start(move |input: Resume| {
        input.into_value()?;
        stage += 1;

        let (steps, n) = (steps.clone(), stage);
        let step = sleep(Duration::from_millis(100))
            .and_then(move |_| steps.lock().unwrap().push(n));

        Ok(Step::<()>::wait(step))
    });

    while log.lock().unwrap().len() < 2 {
        thread::sleep(Duration::from_millis(1));
    }

    sequence.cancel();
    assert!(sequence.is_canceled());

    thread::sleep(Duration::from_millis(250));
    assert_eq!(*log.lock().unwrap(), vec![1, 2]);
}

#[stepwise::test]
fn cancel_reaches_nested_sequences() {
    let inner = Sequence::start(|input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(sleep(Duration::from_secs(10))));
        }
        Ok(Step::<()>::Done)
    });

    let nested = inner.future();
    let outer = Sequence::start(move |input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(nested.clone()));
        }
        Ok(Step::<()>::Done)
    });

    outer.future().cancel();

    assert!(outer.is_canceled());
    assert!(inner.is_canceled());
}

#[stepwise::test]
fn detached_future_ignores_cancel() {
    let sequence = Sequence::start(|input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(sleep(Duration::from_secs(10))));
        }
        Ok(Step::Return(1))
    });

    let detached = sequence.detach();
    assert!(sequence.is_cancelable());

    detached.cancel();
    assert!(sequence.is_running());
    assert!(detached.is_running());

    sequence.future().cancel();
    assert!(sequence.is_canceled());
    assert!(detached.is_canceled());
}

#[test]
fn settling_step_promise_resumes_immediately() {
    let promise = Promise::<u32>::new();
    let step = promise.clone();

    let sequence = Sequence::start(move |input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(step.future()));
        }
        Ok(Step::Return(input.get::<u32>()? * 2))
    });

    assert!(sequence.is_running());

    promise.set_value(21).unwrap();

    assert!(sequence.has_value());
    assert_eq!(sequence.value().unwrap(), Some(42));
}

/// Settling a sequence's own promise is treated like cancellation: the
/// sequence stops and its outstanding step is canceled, but the written
/// outcome is kept instead of `Canceled`.
#[stepwise::test]
fn settling_own_promise_is_treated_as_cancellation() {
    let pending = sleep(Duration::from_secs(10));
    let watched = pending.clone();

    let resumed = Arc::new(AtomicBool::new(false));
    let flag = resumed.clone();

    let sequence = Sequence::start(move |input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(pending.clone()));
        }

        flag.store(true, Ordering::SeqCst);
        Ok(Step::Return(0))
    });

    sequence.promise().set_value(Some(7)).unwrap();

    assert_eq!(sequence.value().unwrap(), Some(7));
    assert!(watched.is_canceled());
    assert!(!resumed.load(Ordering::SeqCst));
}

#[test]
fn ready_steps_do_not_grow_the_stack() {
    let mut left = 100_000u32;

    let sequence = Sequence::start(move |_input: Resume| {
        if left == 0 {
            return Ok(Step::Return("done"));
        }

        left -= 1;
        Ok(Step::wait(Future::ready(left)))
    });

    assert_eq!(sequence.value().unwrap(), Some("done"));
}

#[stepwise::test]
fn join_step_failure_is_injected() {
    let sequence = Sequence::start(|input: Resume| match input {
        Resume::Start => Ok(Step::join(vec![
            sleep(Duration::from_millis(20)).and_then(|_| 1u8),
            Future::failed(Error::msg("member down")),
        ])),
        Resume::Error(error) => Ok(Step::Return(error.to_string())),
        Resume::Value(_) => Ok(Step::Return(String::new())),
    });

    assert_eq!(sequence.value().unwrap().as_deref(), Some("member down"));
}

#[stepwise::test]
fn builder_applies_name_and_policy() {
    let slow = sleep(Duration::from_secs(5));
    let watched = slow.clone();

    let sequence = SequenceBuilder::new()
        .name("fan-out")
        .sibling_policy(SiblingPolicy::CancelRest)
        .start(move |input: Resume| {
            if input.is_start() {
                let failing = Future::<u8>::failed(Error::msg("down"));
                return Ok(Step::Join(vec![slow.erase(), failing.erase()]));
            }

            input.into_value()?;
            Ok(Step::<()>::Done)
        });

    assert_eq!(sequence.name(), Some("fan-out"));
    assert_eq!(sequence.error().as_deref(), Some("down"));
    assert!(watched.is_canceled());
}

#[stepwise::test]
fn steps_resume_on_worker_threads() {
    let mut total = 0u64;
    let mut next = 1u64;

    let sequence = Sequence::start(move |input: Resume| {
        if !input.is_start() {
            total += input.get::<u64>()?;
        }

        if next > 3 {
            return Ok(Step::Return(total));
        }

        let n = next;
        next += 1;
        Ok(Step::wait(task::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            Ok(n * 10)
        })))
    });

    assert_eq!(sequence.value().unwrap(), Some(60));
}

#[stepwise::test]
fn step_settled_from_foreign_thread_keeps_runtime() {
    let gate = Promise::<u32>::new();
    let step = gate.clone();

    let mut received = None;
    let sequence = Sequence::start(move |input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(step.future()));
        }

        match received {
            None => {
                received = Some(input.get::<u32>()?);
                Ok(Step::wait(sleep(Duration::from_millis(10))))
            }
            Some(value) => {
                input.into_value()?;
                Ok(Step::Return(value))
            }
        }
    });

    thread::spawn(move || gate.set_value(1).unwrap())
        .join()
        .unwrap();

    assert_eq!(sequence.value().unwrap(), Some(1));
}

#[stepwise::test]
fn cancel_is_visible_on_the_future() {
    let sequence = Sequence::start(|input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(sleep(Duration::from_secs(10))));
        }
        Ok(Step::<()>::Done)
    });

    let future = sequence.future();
    assert!(!future.is_cancel_requested());

    sequence.cancel();

    assert!(future.is_cancel_requested());
    assert!(future.is_canceled());
}

#[test]
fn wrong_value_type_escapes() {
    let sequence = Sequence::start(|input: Resume| {
        if input.is_start() {
            return Ok(Step::wait(Future::ready("text")));
        }
        Ok(Step::Return(input.get::<u32>()?))
    });

    assert!(matches!(sequence.value(), Err(Error::TypeMismatch { .. })));
}
