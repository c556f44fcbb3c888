//! Operations that complete off the calling thread.
//!
//! [`spawn`] is the crate's stand-in for a remote call: it runs a blocking
//! closure on the worker pool and immediately returns a [`Future`] for its
//! result.

use crate::error::{Error, Result};
use crate::future::{Future, Promise};
use crate::runtime::executor::injector::Runnable;
use crate::runtime::handle::Handle;

use std::panic::{self, AssertUnwindSafe};

/// Runs `operation` on the current runtime's worker pool.
///
/// The returned future settles with the operation's result. Canceling it
/// settles it as canceled right away; an operation that has not started
/// yet is then skipped, one that is already running finishes but its
/// result is discarded.
///
/// Outside of a runtime context the future fails with
/// [`Error::NoRuntime`].
///
/// # Examples
///
/// ```rust,ignore
/// let answer = task::spawn(|| Ok(6 * 7));
/// assert_eq!(answer.value()?, 42);
/// ```
pub fn spawn<T, F>(operation: F) -> Future<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match Handle::current() {
        Some(handle) => spawn_on(&handle, operation),
        None => Future::failed(Error::NoRuntime),
    }
}

pub(crate) fn spawn_on<T, F>(handle: &Handle, operation: F) -> Future<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let promise = Promise::with_cancel(|promise: &Promise<T>| {
        let _ = promise.set_canceled();
    });
    let future = promise.future();

    handle.execute(Box::new(Task { operation, promise }));

    future
}

/// A spawned operation and the promise it settles.
struct Task<T: Send + 'static, F> {
    operation: F,
    promise: Promise<T>,
}

impl<T, F> Runnable for Task<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    fn run(self: Box<Self>) {
        let Task { operation, promise } = *self;

        if promise.is_settled() {
            tracing::trace!("skipping task settled before it started");
            return;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(operation))
            .unwrap_or_else(|payload| Err(Error::from_panic(payload)));

        let _ = match result {
            Ok(value) => promise.set_value(value),
            Err(error) => promise.set_error(error),
        };
    }

    fn abandon(self: Box<Self>) {
        let _ = self.promise.set_error(Error::Shutdown);
    }
}
