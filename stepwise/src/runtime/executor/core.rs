use super::injector::Injector;
use super::worker::Worker;
use crate::runtime::handle::Handle;

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Multi-threaded worker pool.
///
/// The `Executor` is responsible for:
/// - spawning worker threads,
/// - installing the runtime context on each of them,
/// - managing orderly shutdown and thread joining.
pub(crate) struct Executor {
    /// Shared job queue.
    injector: Arc<Injector>,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,
}

impl Executor {
    /// Creates an executor with no threads yet.
    pub(crate) fn new(injector: Arc<Injector>) -> Self {
        Self {
            injector,
            handles: Vec::new(),
        }
    }

    /// Spawns `threads` workers named `{name}-worker-{id}`.
    pub(crate) fn start(&mut self, handle: &Handle, threads: usize, name: &str) -> io::Result<()> {
        self.handles.reserve(threads);

        for id in 0..threads {
            let worker = Worker::new(id, self.injector.clone());
            let handle = handle.clone();

            let thread = thread::Builder::new()
                .name(format!("{name}-worker-{id}"))
                .spawn(move || worker.run(handle))?;

            self.handles.push(thread);
        }

        Ok(())
    }

    /// Signals all workers to stop once their current job returns.
    pub(crate) fn shutdown(&self) {
        self.injector.shutdown();
    }

    /// Waits for all workers, then abandons the jobs nobody ran.
    pub(crate) fn join(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }

        self.injector.drain();
    }
}
