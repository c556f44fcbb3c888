use crate::future::Promise;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Messages sent to the reactor thread.
pub(crate) enum Command {
    /// Settle `promise` once `deadline` is reached, unless `cancelled`.
    SetTimer {
        deadline: Instant,
        promise: Promise<()>,
        cancelled: Arc<AtomicBool>,
    },

    /// A timer was cancelled; drop every cancelled entry.
    CancelTimer,

    /// Stop the reactor; pending timers fail with `Error::Shutdown`.
    Shutdown,
}
