//! Sequential composition of asynchronous steps.
//!
//! A [`Sequence`] drives a [`Coroutine`]: a computation that yields a
//! [`Step`] each time it needs to wait on a future, and is resumed with
//! that future's outcome once it settles. The sequence itself exposes a
//! single future that settles when the computation returns, fails, or is
//! canceled.
//!
//! # How a sequence progresses
//!
//! - On construction the computation runs synchronously until its first
//!   step, on the calling thread.
//! - Each later segment runs on whichever thread settles the awaited step.
//! - Steps that are already settled are consumed without suspending.
//! - An error returned from [`Coroutine::resume`] (or a panic inside it)
//!   fails the sequence. The original error stays available through
//!   [`Sequence::exception`].
//! - Canceling the sequence stops the computation and forwards the
//!   request to the step it is suspended on.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stepwise::{Resume, Sequence, Step, time::sleep};
//! use std::time::Duration;
//!
//! let mut stage = 0;
//! let sequence = Sequence::start(move |input: Resume| {
//!     stage += 1;
//!     match stage {
//!         1 => Ok(Step::wait(sleep(Duration::from_millis(50)))),
//!         _ => {
//!             input.into_value()?;
//!             Ok(Step::Return("slept"))
//!         }
//!     }
//! });
//!
//! assert_eq!(sequence.value().unwrap(), Some("slept"));
//! ```

mod builder;
mod coroutine;
mod core;
mod step;

pub use builder::SequenceBuilder;
pub use coroutine::Coroutine;
pub use step::{Resume, Step};

use self::core::SequenceState;
use crate::error::{Error, Result};
use crate::future::{Future, FutureState, Promise};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A running [`Coroutine`] and the future of its result.
///
/// The result is `Some(value)` when the computation yields
/// [`Step::Return`], and `None` when it yields [`Step::Done`].
///
/// A sequence is always cancelable. Settling its promise directly (see
/// [`promise`](Self::promise)) also stops the computation and cancels the
/// step it is suspended on.
pub struct Sequence<T: Clone + Send + Sync + 'static> {
    state: Arc<SequenceState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Starts `coroutine` with default settings.
    ///
    /// See [`SequenceBuilder`] to name the sequence or change how join
    /// steps treat their members after a failure.
    pub fn start<C>(coroutine: C) -> Self
    where
        C: Coroutine<Output = T>,
    {
        SequenceBuilder::new().start(coroutine)
    }

    /// Returns the name given through [`SequenceBuilder::name`].
    pub fn name(&self) -> Option<&str> {
        self.state.name()
    }

    /// Returns the sequence's future.
    ///
    /// Canceling it cancels the sequence.
    pub fn future(&self) -> Future<Option<T>> {
        self.state.promise().future()
    }

    /// Returns a future that mirrors the outcome but ignores cancellation.
    pub fn detach(&self) -> Future<Option<T>> {
        let promise = Promise::new();
        let detached = promise.future();

        self.future().add_callback(move |settled| {
            let _ = promise.complete(settled.outcome());
        });

        detached
    }

    /// Returns the write side of the sequence's future.
    ///
    /// Settling it from outside stops the computation as if it had been
    /// canceled, while keeping the outcome written.
    pub fn promise(&self) -> Promise<Option<T>> {
        self.state.promise().clone()
    }

    /// Returns the error that escaped the computation, if any.
    pub fn exception(&self) -> Option<Error> {
        self.state.exception()
    }

    /// Requests cancellation.
    ///
    /// Same as canceling [`future`](Self::future).
    pub fn cancel(&self) {
        self.future().cancel();
    }

    pub fn state(&self) -> FutureState {
        self.future().state()
    }

    pub fn is_running(&self) -> bool {
        self.future().is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.future().is_finished()
    }

    pub fn has_value(&self) -> bool {
        self.future().has_value()
    }

    pub fn has_error(&self) -> bool {
        self.future().has_error()
    }

    pub fn is_canceled(&self) -> bool {
        self.future().is_canceled()
    }

    /// Always `true`.
    pub fn is_cancelable(&self) -> bool {
        true
    }

    /// Blocks until the sequence settles.
    pub fn wait(&self) {
        self.future().wait();
    }

    /// Blocks for at most `timeout` and returns the state observed.
    pub fn wait_for(&self, timeout: Duration) -> FutureState {
        self.future().wait_for(timeout)
    }

    /// Blocks until settled and returns the result.
    ///
    /// When the computation failed, the error it returned is reported as
    /// is, not its description.
    pub fn value(&self) -> Result<Option<T>> {
        let future = self.future();
        future.wait();

        match self.exception() {
            Some(error) => Err(error),
            None => future.value(),
        }
    }

    /// Blocks until settled and returns the error description, if any.
    pub fn error(&self) -> Option<String> {
        self.future().error()
    }

    /// Registers a callback that receives the settled future.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Future<Option<T>>) + Send + 'static,
    {
        self.future().add_callback(callback);
    }

    /// See [`Future::then`].
    pub fn then<U, F>(&self, callback: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(&Future<Option<T>>) -> U + Send + 'static,
    {
        self.future().then(callback)
    }

    /// See [`Future::and_then`].
    pub fn and_then<U, F>(&self, callback: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(Option<T>) -> U + Send + 'static,
    {
        self.future().and_then(callback)
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> From<&Sequence<T>> for Future<Option<T>> {
    fn from(sequence: &Sequence<T>) -> Self {
        sequence.future()
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}
