use super::Future;
use super::core::{Outcome, Shared};
use crate::error::{Error, Result};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// The write side of a [`Future`].
///
/// A `Promise` settles its future exactly once, with a value, an error or
/// as canceled. Promises can be cloned and handed to anyone allowed to
/// supply the result; the first writer wins and later writes are rejected
/// with [`Error::AlreadySettled`].
///
/// If every promise handle is dropped while the future is still pending,
/// the future settles with [`Error::BrokenPromise`].
///
/// # Examples
///
/// ```rust,ignore
/// let promise = Promise::new();
/// let future = promise.future();
///
/// std::thread::spawn(move || promise.set_value(42));
///
/// assert_eq!(future.value().unwrap(), 42);
/// ```
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Promise<T> {
    /// Creates a promise whose future ignores cancellation requests.
    pub fn new() -> Self {
        Self::from_shared(Arc::new(Shared::new(None)))
    }

    /// Creates a promise with a cancellation handler.
    ///
    /// `on_cancel` runs the first time [`Future::cancel`] is called on a
    /// pending future. It receives this promise and decides whether to
    /// settle it, typically with [`set_canceled`](Self::set_canceled).
    pub fn with_cancel<F>(on_cancel: F) -> Self
    where
        F: FnOnce(&Promise<T>) + Send + 'static,
    {
        Self::from_shared(Arc::new(Shared::new(Some(Box::new(on_cancel)))))
    }

    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        shared.promises.fetch_add(1, Ordering::AcqRel);
        Self { shared }
    }

    /// Returns the read side of this promise.
    pub fn future(&self) -> Future<T> {
        Future::from_shared(self.shared.clone())
    }

    /// Settles the future with a value.
    pub fn set_value(&self, value: T) -> Result<()> {
        self.complete(Outcome::Value(value))
    }

    /// Settles the future with an error.
    pub fn set_error(&self, error: Error) -> Result<()> {
        self.complete(Outcome::Error(error))
    }

    /// Settles the future as canceled.
    pub fn set_canceled(&self) -> Result<()> {
        self.complete(Outcome::Canceled)
    }

    /// Returns `true` once cancellation was requested on the future.
    pub fn is_cancel_requested(&self) -> bool {
        self.shared.is_cancel_requested()
    }

    /// Returns `true` once the future has been settled by anyone.
    pub fn is_settled(&self) -> bool {
        self.shared.state().is_finished()
    }

    /// Settles the future with an outcome observed elsewhere.
    pub(crate) fn complete(&self, outcome: Outcome<T>) -> Result<()> {
        if self.shared.settle(outcome) {
            Ok(())
        } else {
            Err(Error::AlreadySettled)
        }
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self::from_shared(self.shared.clone())
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Promise<T> {
    /// Breaks the promise when the last writer goes away unsettled.
    fn drop(&mut self) {
        if self.shared.promises.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.settle(Outcome::Error(Error::BrokenPromise));
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.shared.state())
            .finish()
    }
}
