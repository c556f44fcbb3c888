use super::injector::Injector;
use crate::runtime::context::enter_context;
use crate::runtime::handle::Handle;

use std::sync::Arc;

/// A worker thread of the pool.
///
/// Each worker repeatedly pops a job from the shared injector and runs it
/// with the runtime context installed, until shutdown.
pub(crate) struct Worker {
    /// Unique identifier of the worker.
    id: usize,

    /// Shared job queue.
    injector: Arc<Injector>,
}

impl Worker {
    pub(crate) fn new(id: usize, injector: Arc<Injector>) -> Self {
        Self { id, injector }
    }

    /// Runs the worker loop.
    ///
    /// Jobs run inside the runtime context so that code resumed on this
    /// thread can call [`sleep`](crate::time::sleep) and
    /// [`spawn`](crate::task::spawn).
    pub(crate) fn run(&self, handle: Handle) {
        tracing::trace!(worker = self.id, "worker started");

        enter_context(handle, || {
            while let Some(job) = self.injector.pop() {
                job.run();
            }
        });

        tracing::trace!(worker = self.id, "worker stopped");
    }
}
