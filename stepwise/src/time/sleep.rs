use crate::error::Error;
use crate::future::{Future, Promise};
use crate::reactor::command::Command;
use crate::runtime::handle::Handle;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SendError, Sender};
use std::time::{Duration, Instant};

/// Creates a future that settles with `()` after the given duration.
///
/// The timer is registered with the current runtime's reactor right away.
/// The duration is a lower bound: the future never settles earlier, but
/// may settle later under load.
///
/// Canceling the future before it fires settles it as canceled and
/// disarms the timer. Canceling it afterwards does nothing.
///
/// Outside of a runtime context the future fails with
/// [`Error::NoRuntime`].
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).wait();
/// ```
pub fn sleep(duration: Duration) -> Future<()> {
    match Handle::current() {
        Some(handle) => handle.sleep(duration),
        None => Future::failed(Error::NoRuntime),
    }
}

/// Registers a timer on the reactor behind `timers`.
pub(crate) fn schedule(timers: &Sender<Command>, duration: Duration) -> Future<()> {
    let cancelled = Arc::new(AtomicBool::new(false));

    let flag = cancelled.clone();
    let reactor = timers.clone();
    let promise = Promise::with_cancel(move |promise: &Promise<()>| {
        flag.store(true, Ordering::Release);
        let _ = reactor.send(Command::CancelTimer);
        let _ = promise.set_canceled();
    });
    let future = promise.future();

    let command = Command::SetTimer {
        deadline: Instant::now() + duration,
        promise,
        cancelled,
    };

    if let Err(SendError(Command::SetTimer { promise, .. })) = timers.send(command) {
        let _ = promise.set_error(Error::Shutdown);
    }

    future
}
