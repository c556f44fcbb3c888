use crate::error::Result;
use crate::future::Future;
use crate::reactor::command::Command;
use crate::runtime::context::{self, enter_context};
use crate::runtime::executor::injector::{Injector, Job};
use crate::runtime::task;
use crate::time;

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// A cheap, clonable reference to a running [`Runtime`](crate::Runtime).
///
/// Handles stay valid after the runtime is dropped; operations issued
/// through them then fail with [`Error::Shutdown`](crate::Error::Shutdown).
#[derive(Clone)]
pub struct Handle {
    inner: Arc<Inner>,
}

struct Inner {
    /// Worker pool queue.
    injector: Arc<Injector>,

    /// Command channel of the timer reactor.
    timers: Sender<Command>,
}

impl Handle {
    pub(crate) fn new(injector: Arc<Injector>, timers: Sender<Command>) -> Self {
        Self {
            inner: Arc::new(Inner { injector, timers }),
        }
    }

    /// Returns the handle of the runtime entered on this thread.
    ///
    /// `None` outside of [`enter`](Self::enter) and worker threads.
    pub fn current() -> Option<Self> {
        context::current()
    }

    /// Runs `f` with this runtime installed as the current one.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        enter_context(self.clone(), f)
    }

    /// Runs `operation` on the worker pool and returns its future.
    ///
    /// See [`task::spawn`].
    pub fn spawn<T, F>(&self, operation: F) -> Future<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        task::spawn_on(self, operation)
    }

    /// Returns a future settled once `duration` has elapsed.
    ///
    /// See [`time::sleep`].
    pub fn sleep(&self, duration: Duration) -> Future<()> {
        time::schedule(&self.inner.timers, duration)
    }

    /// Queues a job on the worker pool.
    pub(crate) fn execute(&self, job: Job) {
        self.inner.injector.push(job);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").finish_non_exhaustive()
    }
}
