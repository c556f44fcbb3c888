use super::core::{Outcome, Shared};
use super::state::FutureState;
use super::{Promise, Value};
use crate::error::{Error, Result};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// A handle to a result that becomes available later.
///
/// `Future` is the read side of a [`Promise`]. It can be cloned freely;
/// every clone observes the same outcome. Completion is observed either
/// by blocking ([`wait`](Self::wait), [`value`](Self::value)), by polling
/// the state ([`is_finished`](Self::is_finished) and friends), or by
/// registering callbacks ([`then`](Self::then),
/// [`and_then`](Self::and_then), [`add_callback`](Self::add_callback)).
///
/// Callbacks registered before settlement run once, in registration
/// order, on the thread that settles the promise. Callbacks registered
/// afterwards run immediately on the registering thread.
///
/// `Future` also implements [`std::future::Future`], resolving to
/// `Result<T, Error>`, so it can be awaited from async code.
pub struct Future<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Future<T> {
    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Returns the current state without blocking.
    pub fn state(&self) -> FutureState {
        self.shared.state()
    }

    /// Returns `true` while the future is not settled.
    pub fn is_running(&self) -> bool {
        self.state() == FutureState::Running
    }

    /// Returns `true` once the future is settled, whatever the outcome.
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Returns `true` if the future settled with a value.
    pub fn has_value(&self) -> bool {
        self.state() == FutureState::FinishedWithValue
    }

    /// Returns `true` if the future settled with an error.
    pub fn has_error(&self) -> bool {
        self.state() == FutureState::FinishedWithError
    }

    /// Returns `true` if the future settled as canceled.
    pub fn is_canceled(&self) -> bool {
        self.state() == FutureState::Canceled
    }

    /// Returns `true` if the promise side handles cancellation requests.
    pub fn is_cancelable(&self) -> bool {
        self.shared.is_cancelable()
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancel_requested(&self) -> bool {
        self.shared.is_cancel_requested()
    }

    /// Blocks the calling thread until the future is settled.
    pub fn wait(&self) {
        drop(self.shared.wait());
    }

    /// Blocks for at most `timeout` and returns the state observed.
    pub fn wait_for(&self, timeout: Duration) -> FutureState {
        self.shared.wait_for(timeout)
    }

    /// Blocks until settled and returns the error description, if any.
    pub fn error(&self) -> Option<String> {
        match self.shared.wait().outcome.as_ref() {
            Some(Outcome::Error(error)) => Some(error.to_string()),
            _ => None,
        }
    }
}

impl<T: Clone> Future<T> {
    /// Blocks until settled and returns the value.
    ///
    /// A failed future returns its error; a canceled one returns
    /// [`Error::Canceled`].
    pub fn value(&self) -> Result<T> {
        self.outcome().into_result()
    }

    /// Blocks until settled and clones the outcome.
    pub(crate) fn outcome(&self) -> Outcome<T> {
        match self.shared.wait().outcome.as_ref() {
            Some(outcome) => outcome.clone(),
            None => Outcome::Error(Error::BrokenPromise),
        }
    }
}

impl<T: Send + 'static> Future<T> {
    /// Returns a future already settled with `value`.
    pub fn ready(value: T) -> Self {
        let promise = Promise::new();
        let _ = promise.set_value(value);
        promise.future()
    }

    /// Returns a future already settled with `error`.
    pub fn failed(error: Error) -> Self {
        let promise = Promise::new();
        let _ = promise.set_error(error);
        promise.future()
    }

    /// Returns a future already settled as canceled.
    pub fn canceled() -> Self {
        let promise = Promise::new();
        let _ = promise.set_canceled();
        promise.future()
    }

    /// Requests cancellation.
    ///
    /// If the promise side registered a cancellation handler, it runs now
    /// and may settle the future as canceled. Otherwise, and once the
    /// future is settled, this does nothing.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Registers a callback that receives the settled future.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Future<T>) + Send + 'static,
    {
        self.shared.subscribe(Box::new(callback));
    }

    /// Registers a callback that receives the settled future and returns a
    /// future of the callback's result.
    ///
    /// If the callback panics, the returned future fails with
    /// [`Error::Panicked`]. Canceling the returned future forwards the
    /// request to `self`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let done = future.then(|f| f.has_error());
    /// ```
    pub fn then<U, F>(&self, callback: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(&Future<T>) -> U + Send + 'static,
    {
        let promise = self.linked_promise();
        let target = promise.future();

        self.add_callback(move |future| {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(future))) {
                Ok(value) => {
                    let _ = promise.set_value(value);
                }
                Err(payload) => {
                    let _ = promise.set_error(Error::from_panic(payload));
                }
            }
        });

        target
    }

    /// Promise whose cancellation is forwarded to `self`.
    fn linked_promise<U: Send + 'static>(&self) -> Promise<U> {
        let source = self.clone();
        Promise::with_cancel(move |_| source.cancel())
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    /// Registers a callback that receives the value on success.
    ///
    /// Errors and cancellation skip the callback and propagate to the
    /// returned future.
    pub fn and_then<U, F>(&self, callback: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok(callback(value)))
    }

    /// Like [`and_then`](Self::and_then), but the callback may fail.
    pub fn try_map<U, F>(&self, callback: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let promise = self.linked_promise();
        let target = promise.future();

        self.add_callback(move |future| {
            let result = match future.outcome() {
                Outcome::Value(value) => {
                    panic::catch_unwind(AssertUnwindSafe(|| callback(value)))
                        .unwrap_or_else(|payload| Err(Error::from_panic(payload)))
                }
                Outcome::Error(error) => Err(error),
                Outcome::Canceled => {
                    let _ = promise.set_canceled();
                    return;
                }
            };

            let _ = match result {
                Ok(value) => promise.set_value(value),
                Err(error) => promise.set_error(error),
            };
        });

        target
    }
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// Converts into a future of [`Value`], keeping the cancel link.
    pub fn erase(&self) -> Future<Value> {
        self.and_then(Value::new)
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Clone + Send + 'static> std::future::Future for Future<T> {
    type Output = Result<T>;

    /// Resolves once the future is settled.
    ///
    /// The waker is registered while the lock is held, so a settlement
    /// racing with this poll cannot be missed. Polling again from the same
    /// task does not register it twice.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.shared.lock();

        if let Some(outcome) = inner.outcome.as_ref() {
            return Poll::Ready(outcome.clone().into_result());
        }

        let waker = cx.waker();
        if !inner.wakers.iter().any(|known| known.will_wake(waker)) {
            inner.wakers.push(waker.clone());
        }

        Poll::Pending
    }
}
