use super::SiblingPolicy;
use crate::error::Error;
use crate::future::core::Outcome;
use crate::future::{Future, Promise};

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-join bookkeeping, updated by member callbacks.
struct JoinState<T> {
    /// One slot per member, filled as members succeed.
    slots: Vec<Option<T>>,

    /// Members that have not produced a value yet.
    remaining: usize,

    /// Set once the join has published its outcome.
    settled: bool,
}

/// Shared by the callbacks registered on every member.
pub(super) struct JoinCore<T: Send + 'static> {
    /// Serializes member callbacks, which may run on different threads.
    state: Mutex<JoinState<T>>,

    members: Vec<Future<T>>,
    policy: SiblingPolicy,
    promise: Promise<Vec<T>>,
}

/// Result of feeding one member outcome into the join.
enum Progress<T> {
    Pending,
    Done(Vec<T>),
    Failed(Error),
    Canceled,
}

impl<T: Clone + Send + 'static> JoinCore<T> {
    /// Creates the join and subscribes to every member.
    pub(super) fn start(members: Vec<Future<T>>, policy: SiblingPolicy) -> Future<Vec<T>> {
        let forward = members.clone();
        let promise = Promise::with_cancel(move |_| {
            for member in &forward {
                member.cancel();
            }
        });
        let future = promise.future();

        let core = Arc::new(Self {
            state: Mutex::new(JoinState {
                slots: (0..members.len()).map(|_| None).collect(),
                remaining: members.len(),
                settled: false,
            }),
            members,
            policy,
            promise,
        });

        tracing::trace!(members = core.members.len(), ?policy, "join started");

        for (index, member) in core.members.iter().enumerate() {
            let core = core.clone();
            member.add_callback(move |settled| core.complete(index, settled.outcome()));
        }

        future
    }

    /// Records the outcome of member `index`.
    fn complete(&self, index: usize, outcome: Outcome<T>) {
        let progress = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

            if state.settled {
                return;
            }

            match outcome {
                Outcome::Value(value) => {
                    state.slots[index] = Some(value);
                    state.remaining -= 1;

                    if state.remaining == 0 {
                        state.settled = true;
                        let slots = mem::take(&mut state.slots);
                        Progress::Done(slots.into_iter().flatten().collect())
                    } else {
                        Progress::Pending
                    }
                }
                Outcome::Error(error) => {
                    state.settled = true;
                    Progress::Failed(error)
                }
                Outcome::Canceled => {
                    state.settled = true;
                    Progress::Canceled
                }
            }
        };

        match progress {
            Progress::Pending => {}
            Progress::Done(values) => {
                let _ = self.promise.set_value(values);
            }
            Progress::Failed(error) => {
                tracing::debug!(member = index, %error, "join member failed");
                let _ = self.promise.set_error(error);
                self.release_siblings(index);
            }
            Progress::Canceled => {
                tracing::debug!(member = index, "join member canceled");
                let _ = self.promise.set_canceled();
                self.release_siblings(index);
            }
        }
    }

    /// Applies the sibling policy after member `failed` ended the join.
    fn release_siblings(&self, failed: usize) {
        if self.policy != SiblingPolicy::CancelRest {
            return;
        }

        for (index, member) in self.members.iter().enumerate() {
            if index != failed {
                member.cancel();
            }
        }
    }
}
