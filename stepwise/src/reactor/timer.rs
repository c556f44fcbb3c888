use crate::future::Promise;

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};
use std::time::Instant;

/// An entry in the reactor timer queue.
///
/// Stored in a `BinaryHeap` ordered by deadline. The entry may be
/// cancelled before it fires, in which case it is skipped when popped.
pub(crate) struct TimerEntry {
    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Settled with `()` when the timer fires.
    pub(crate) promise: Promise<()>,

    /// Cancellation flag shared with the sleep future.
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl TimerEntry {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(atomic::Ordering::Acquire)
    }
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline.eq(&other.deadline)
    }
}

impl Ord for TimerEntry {
    /// Reversed so that `BinaryHeap<TimerEntry>` pops the earliest
    /// deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
