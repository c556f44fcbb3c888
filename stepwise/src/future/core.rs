use super::state::FutureState;
use super::{Future, Promise};
use crate::error::{Error, Result};

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::Waker;
use std::time::Duration;

/// A completion callback registered on a future.
pub(crate) type Callback<T> = Box<dyn FnOnce(&Future<T>) + Send>;

/// Handler invoked the first time cancellation is requested.
pub(crate) type CancelHandler<T> = Box<dyn FnOnce(&Promise<T>) + Send>;

/// The settled outcome of a future.
pub(crate) enum Outcome<T> {
    Value(T),
    Error(Error),
    Canceled,
}

impl<T: Clone> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Value(value) => Outcome::Value(value.clone()),
            Outcome::Error(error) => Outcome::Error(error.clone()),
            Outcome::Canceled => Outcome::Canceled,
        }
    }
}

impl<T> Outcome<T> {
    pub(crate) fn state(&self) -> FutureState {
        match self {
            Outcome::Value(_) => FutureState::FinishedWithValue,
            Outcome::Error(_) => FutureState::FinishedWithError,
            Outcome::Canceled => FutureState::Canceled,
        }
    }

    pub(crate) fn into_result(self) -> Result<T> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Error(error) => Err(error),
            Outcome::Canceled => Err(Error::Canceled),
        }
    }
}

/// Mutable part of a future, guarded by [`Shared::inner`].
pub(crate) struct Inner<T> {
    /// `None` while pending. Written exactly once.
    pub(crate) outcome: Option<Outcome<T>>,

    /// Callbacks waiting for settlement, in registration order.
    pub(crate) callbacks: Vec<Callback<T>>,

    /// Tasks awaiting the future, one entry per distinct waker.
    pub(crate) wakers: Vec<Waker>,

    /// Cancellation handler installed by the promise side.
    on_cancel: Option<CancelHandler<T>>,

    /// Whether a handler was ever installed.
    cancelable: bool,

    /// Set by the first call to `cancel`.
    cancel_requested: bool,
}

/// State shared by a [`Future`] and every [`Promise`] writing to it.
pub(crate) struct Shared<T> {
    inner: Mutex<Inner<T>>,

    /// Signalled once the outcome is written.
    settled: Condvar,

    /// Number of live promise handles.
    pub(crate) promises: AtomicUsize,
}

impl<T> Shared<T> {
    pub(crate) fn new(on_cancel: Option<CancelHandler<T>>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                outcome: None,
                callbacks: Vec::new(),
                wakers: Vec::new(),
                cancelable: on_cancel.is_some(),
                on_cancel,
                cancel_requested: false,
            }),
            settled: Condvar::new(),
            promises: AtomicUsize::new(0),
        }
    }

    /// Locks the inner state.
    ///
    /// A panic can only poison the lock between two consistent states
    /// (user code never runs under it), so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> FutureState {
        self.lock()
            .outcome
            .as_ref()
            .map_or(FutureState::Running, Outcome::state)
    }

    pub(crate) fn is_cancelable(&self) -> bool {
        self.lock().cancelable
    }

    pub(crate) fn is_cancel_requested(&self) -> bool {
        self.lock().cancel_requested
    }

    /// Blocks until the future is settled and returns the locked state.
    pub(crate) fn wait(&self) -> MutexGuard<'_, Inner<T>> {
        let guard = self.lock();

        self.settled
            .wait_while(guard, |inner| inner.outcome.is_none())
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for at most `timeout` and returns the state observed.
    pub(crate) fn wait_for(&self, timeout: Duration) -> FutureState {
        let guard = self.lock();

        let (guard, _) = self
            .settled
            .wait_timeout_while(guard, timeout, |inner| inner.outcome.is_none())
            .unwrap_or_else(PoisonError::into_inner);

        guard
            .outcome
            .as_ref()
            .map_or(FutureState::Running, Outcome::state)
    }

    /// Writes the outcome if the future is still pending.
    ///
    /// Returns `false` when the future had already been settled. Registered
    /// callbacks run on the calling thread, after the lock is released.
    pub(crate) fn settle(self: &Arc<Self>, outcome: Outcome<T>) -> bool {
        let (callbacks, wakers) = {
            let mut inner = self.lock();

            if inner.outcome.is_some() {
                return false;
            }

            inner.outcome = Some(outcome);
            inner.on_cancel = None;
            (mem::take(&mut inner.callbacks), mem::take(&mut inner.wakers))
        };

        self.settled.notify_all();

        let future = Future::from_shared(self.clone());
        for callback in callbacks {
            invoke(callback, &future);
        }

        for waker in wakers {
            waker.wake();
        }

        true
    }

    /// Registers a callback, or runs it immediately if already settled.
    pub(crate) fn subscribe(self: &Arc<Self>, callback: Callback<T>) {
        {
            let mut inner = self.lock();

            if inner.outcome.is_none() {
                inner.callbacks.push(callback);
                return;
            }
        }

        invoke(callback, &Future::from_shared(self.clone()));
    }

    /// Requests cancellation.
    ///
    /// The handler, if any, runs once and outside the lock so it may settle
    /// the future.
    pub(crate) fn cancel(self: &Arc<Self>) {
        let handler = {
            let mut inner = self.lock();

            if inner.outcome.is_some() || inner.cancel_requested {
                return;
            }

            inner.cancel_requested = true;
            inner.on_cancel.take()
        };

        if let Some(handler) = handler {
            handler(&Promise::from_shared(self.clone()));
        }
    }
}

/// Runs a completion callback, containing any panic it raises.
fn invoke<T>(callback: Callback<T>, future: &Future<T>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(future))) {
        let error = Error::from_panic(payload);
        tracing::warn!(%error, "future callback panicked");
    }
}
