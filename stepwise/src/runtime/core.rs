use super::executor::core::Executor;
use super::executor::injector::Injector;
use super::handle::Handle;
use crate::error::Result;
use crate::future::Future;
use crate::reactor::{Reactor, ReactorHandle};

use std::io;
use std::sync::Arc;
use std::time::Duration;

/// The runtime: a worker pool plus a timer reactor.
///
/// `Runtime` is responsible for:
/// - running spawned operations and settling their futures,
/// - settling [`sleep`](crate::time::sleep) futures when they expire,
/// - providing the context those entry points look up.
///
/// Dropping the runtime shuts everything down in order. Operations and
/// timers that never got to run fail with
/// [`Error::Shutdown`](crate::Error::Shutdown).
pub struct Runtime {
    handle: Handle,

    /// Worker pool.
    executor: Executor,

    /// Timer thread.
    reactor: ReactorHandle,
}

impl Runtime {
    /// Starts the reactor and `worker_threads` workers.
    pub(crate) fn new(worker_threads: usize, name: &str) -> io::Result<Self> {
        let injector = Arc::new(Injector::new());
        let reactor = Reactor::start(injector.clone(), format!("{name}-timer"))?;
        let handle = Handle::new(injector.clone(), reactor.sender());

        let mut runtime = Self {
            handle,
            executor: Executor::new(injector),
            reactor,
        };

        runtime
            .executor
            .start(&runtime.handle, worker_threads, name)?;

        tracing::debug!(worker_threads, name, "runtime started");

        Ok(runtime)
    }

    /// Returns a clonable handle to this runtime.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Runs `f` with this runtime installed as the current one.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// runtime.enter(|| {
    ///     let delay = sleep(Duration::from_millis(10));
    ///     delay.wait();
    /// });
    /// ```
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        self.handle.enter(f)
    }

    /// Runs `operation` on the worker pool.
    pub fn spawn<T, F>(&self, operation: F) -> Future<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.handle.spawn(operation)
    }

    /// Returns a future settled once `duration` has elapsed.
    pub fn sleep(&self, duration: Duration) -> Future<()> {
        self.handle.sleep(duration)
    }

    /// Creates a future inside the runtime context and blocks on its value.
    ///
    /// This is the synchronous entry point, typically used from `main` or
    /// tests.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let value = runtime.block_on(|| task::spawn(|| Ok(42)))?;
    /// assert_eq!(value, 42);
    /// ```
    pub fn block_on<T, F>(&self, start: F) -> Result<T>
    where
        T: Clone,
        F: FnOnce() -> Future<T>,
    {
        self.enter(start).value()
    }
}

impl Drop for Runtime {
    /// Shuts down the runtime.
    ///
    /// 1. Stops the workers from taking new jobs
    /// 2. Stops the reactor, failing pending timers
    /// 3. Joins the workers and fails the jobs they left behind
    fn drop(&mut self) {
        self.executor.shutdown();
        self.reactor.shutdown();
        self.executor.join();

        tracing::debug!("runtime stopped");
    }
}
