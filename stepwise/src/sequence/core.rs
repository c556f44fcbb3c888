use super::{Coroutine, Resume, Step};
use crate::error::{Error, Result};
use crate::future::core::Outcome;
use crate::future::{Future, Promise, Value};
use crate::join::{Join, SiblingPolicy};
use crate::runtime::handle::Handle;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, trace};

/// Boxed computation driven by the sequencer.
type BoxCoroutine<T> = Box<dyn Coroutine<Output = T>>;

/// Fields read and written by step callbacks, cancellation and the
/// sequence handle. Never held while user code runs.
struct Progress {
    /// Cleared by whichever of finish, failure, cancellation or external
    /// settlement happens first.
    running: bool,

    /// The step the sequence is suspended on, if any.
    current: Option<Future<Value>>,

    /// Error that escaped the computation, kept verbatim.
    exception: Option<Error>,

    /// Steps settled so far.
    steps: usize,
}

/// Why a running sequence stopped without finishing.
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    /// Cancellation was requested on the sequence's future.
    Canceled,

    /// The sequence's promise was settled by someone else.
    Overridden,
}

/// State shared by a sequence handle and the callbacks of its steps.
pub(super) struct SequenceState<T: Clone + Send + Sync + 'static> {
    name: Option<String>,
    policy: SiblingPolicy,

    /// Settled once, by whichever path clears `running`.
    promise: Promise<Option<T>>,

    /// Only one `resume` call runs at a time.
    coroutine: Mutex<BoxCoroutine<T>>,

    /// Runtime current when the sequence started. Re-entered around every
    /// resumption, whichever thread settles the step.
    runtime: Option<Handle>,

    progress: Mutex<Progress>,
}

impl<T: Clone + Send + Sync + 'static> SequenceState<T> {
    /// Creates the state and runs the computation up to its first
    /// suspension point.
    pub(super) fn start(
        coroutine: BoxCoroutine<T>,
        name: Option<String>,
        policy: SiblingPolicy,
    ) -> Arc<Self> {
        let state = Arc::new_cyclic(|weak: &Weak<Self>| {
            let on_cancel = weak.clone();

            Self {
                name,
                policy,
                promise: Promise::with_cancel(move |_| {
                    if let Some(state) = on_cancel.upgrade() {
                        state.interrupt(Interrupt::Canceled);
                    }
                }),
                coroutine: Mutex::new(coroutine),
                runtime: Handle::current(),
                progress: Mutex::new(Progress {
                    running: true,
                    current: None,
                    exception: None,
                    steps: 0,
                }),
            }
        });

        // Settlement that did not come from the sequence itself stops it.
        let watcher = Arc::downgrade(&state);
        state.promise.future().add_callback(move |_| {
            if let Some(state) = watcher.upgrade() {
                state.interrupt(Interrupt::Overridden);
            }
        });

        debug!(sequence = state.label(), "sequence started");
        state.advance(Resume::Start);

        state
    }

    pub(super) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(super) fn promise(&self) -> &Promise<Option<T>> {
        &self.promise
    }

    pub(super) fn exception(&self) -> Option<Error> {
        self.lock().exception.clone()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Resumes the computation with `input` until it suspends on a pending
    /// step or terminates.
    ///
    /// Steps that are already settled when yielded are consumed in this
    /// loop, so long chains of ready steps do not grow the stack.
    fn advance(self: &Arc<Self>, mut input: Resume) {
        loop {
            if !self.is_running() {
                return;
            }

            let step = self.resume(input);

            let pending = match step {
                Ok(Step::Single(future)) => future,
                Ok(Step::Join(futures)) => {
                    Join::new(futures).policy(self.policy).start().erase()
                }
                Ok(Step::Return(value)) => return self.finish(Outcome::Value(Some(value))),
                Ok(Step::Done) => return self.finish(Outcome::Value(None)),
                Err(error) => return self.fail(error),
            };

            if pending.is_finished() {
                trace!(sequence = self.label(), "step already settled");
                self.lock().steps += 1;
                input = Resume::from(pending.outcome());
                continue;
            }

            if !self.suspend(&pending) {
                // Interrupted while the computation was running.
                pending.cancel();
                return;
            }

            let state = self.clone();
            pending.add_callback(move |settled| state.on_step_settled(settled));
            return;
        }
    }

    /// Calls into the computation, turning a panic into a failure.
    fn resume(&self, input: Resume) -> Result<Step<T>> {
        let mut coroutine = self.coroutine.lock().unwrap_or_else(PoisonError::into_inner);

        let step = move || {
            panic::catch_unwind(AssertUnwindSafe(|| coroutine.resume(input)))
                .unwrap_or_else(|payload| Err(Error::from_panic(payload)))
        };

        match &self.runtime {
            Some(runtime) => runtime.enter(step),
            None => step(),
        }
    }

    /// Records `step` as outstanding. Returns `false` if the sequence was
    /// stopped in the meantime.
    fn suspend(&self, step: &Future<Value>) -> bool {
        let mut progress = self.lock();

        if !progress.running {
            return false;
        }

        progress.current = Some(step.clone());
        true
    }

    fn on_step_settled(self: &Arc<Self>, settled: &Future<Value>) {
        let step = {
            let mut progress = self.lock();

            if !progress.running {
                return;
            }

            progress.current = None;
            progress.steps += 1;
            progress.steps
        };

        trace!(sequence = self.label(), step, state = ?settled.state(), "step settled");
        self.advance(Resume::from(settled.outcome()));
    }

    /// Clears `running`. Returns `false` if another path already did.
    fn stop(&self) -> bool {
        let mut progress = self.lock();

        if !progress.running {
            return false;
        }

        progress.running = false;
        progress.current = None;
        true
    }

    fn finish(&self, outcome: Outcome<Option<T>>) {
        if !self.stop() {
            return;
        }

        debug!(sequence = self.label(), "sequence finished");
        let _ = self.promise.complete(outcome);
    }

    /// Settles with the error's description and keeps the original.
    fn fail(&self, error: Error) {
        {
            let mut progress = self.lock();

            if !progress.running {
                return;
            }

            progress.running = false;
            progress.current = None;
            progress.exception = Some(error.clone());
        }

        debug!(sequence = self.label(), %error, "sequence failed");
        let _ = self.promise.set_error(Error::Failed(error.to_string()));
    }

    fn interrupt(&self, reason: Interrupt) {
        let current = {
            let mut progress = self.lock();

            if !progress.running {
                return;
            }

            progress.running = false;
            progress.current.take()
        };

        debug!(sequence = self.label(), ?reason, "sequence interrupted");

        if let Interrupt::Canceled = reason {
            let _ = self.promise.set_canceled();
        }

        if let Some(step) = current {
            step.cancel();
        }
    }
}
