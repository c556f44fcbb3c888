use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A unit of work executed by a worker thread.
///
/// Every job owns the promise it reports to, so a job that never gets to
/// run can still settle it through [`abandon`](Runnable::abandon).
pub(crate) trait Runnable: Send {
    /// Executes the job on a worker thread.
    fn run(self: Box<Self>);

    /// Called instead of `run` when the pool shuts down first.
    fn abandon(self: Box<Self>);
}

/// Boxed job as stored in the queue.
pub(crate) type Job = Box<dyn Runnable>;

/// Queue contents and the shutdown flag, guarded together so a worker
/// never parks after shutdown was signalled.
struct Queue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

/// Global job queue shared by all workers.
///
/// Workers pop jobs from the front and park on a condition variable
/// while the queue is empty.
pub(crate) struct Injector {
    queue: Mutex<Queue>,

    /// Wakes parked workers on push and on shutdown.
    condvar: Condvar,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a job and wakes one parked worker.
    ///
    /// After shutdown the job is abandoned on the calling thread.
    pub(crate) fn push(&self, job: Job) {
        {
            let mut queue = self.lock();

            if !queue.shutdown {
                queue.jobs.push_back(job);
                drop(queue);
                self.condvar.notify_one();
                return;
            }
        }

        job.abandon();
    }

    /// Blocks until a job is available.
    ///
    /// Returns `None` once shutdown has been signalled.
    pub(crate) fn pop(&self) -> Option<Job> {
        let mut queue = self.lock();

        loop {
            if queue.shutdown {
                return None;
            }

            if let Some(job) = queue.jobs.pop_front() {
                return Some(job);
            }

            queue = self
                .condvar
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Signals shutdown and wakes all parked workers.
    pub(crate) fn shutdown(&self) {
        self.lock().shutdown = true;
        self.condvar.notify_all();
    }

    /// Abandons every job left in the queue.
    pub(crate) fn drain(&self) {
        let jobs: Vec<Job> = self.lock().jobs.drain(..).collect();

        for job in jobs {
            job.abandon();
        }
    }
}
