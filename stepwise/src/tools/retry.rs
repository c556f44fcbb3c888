use crate::error::Result;
use crate::future::Future;
use crate::sequence::{Coroutine, Resume, Sequence, Step};
use crate::time::sleep;

use std::time::Duration;
use tracing::trace;

/// Retries the operation produced by `factory` up to `times` more times.
///
/// The first attempt is made when the coroutine starts. After a failure a
/// new attempt is made while retries remain; the last error is reported
/// once they are exhausted.
///
/// # Examples
///
/// ```rust,ignore
/// let connected = retry(3, || connect("10.0.0.1"))
///     .set_interval(Duration::from_millis(100))
///     .start();
/// ```
pub fn retry<G, T>(times: usize, factory: G) -> Retry<G>
where
    G: FnMut() -> Future<T> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    Retry::new(times, factory)
}

/// Where a [`Retry`] is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Attempt,
    Delay,
}

/// Coroutine returned by [`retry`].
pub struct Retry<G> {
    factory: G,
    phase: Phase,

    remaining: usize,
    interval: Duration,
}

impl<G> Retry<G> {
    fn new(times: usize, factory: G) -> Self {
        Self {
            factory,
            phase: Phase::Idle,
            remaining: times,
            interval: Duration::ZERO,
        }
    }

    /// Waits `interval` between a failure and the next attempt.
    pub fn set_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl<G, T> Retry<G>
where
    G: FnMut() -> Future<T> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Starts retrying in a new [`Sequence`].
    pub fn start(self) -> Sequence<T> {
        Sequence::start(self)
    }

    fn attempt(&mut self) -> Step<T> {
        self.phase = Phase::Attempt;
        Step::wait((self.factory)())
    }
}

impl<G, T> Coroutine for Retry<G>
where
    G: FnMut() -> Future<T> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn resume(&mut self, input: Resume) -> Result<Step<T>> {
        match self.phase {
            Phase::Idle => Ok(self.attempt()),

            Phase::Attempt => match input.get::<T>() {
                Ok(value) => Ok(Step::Return(value)),
                Err(error) if self.remaining == 0 => Err(error),
                Err(error) => {
                    self.remaining -= 1;
                    trace!(%error, remaining = self.remaining, "attempt failed, retrying");

                    if self.interval.is_zero() {
                        return Ok(self.attempt());
                    }

                    self.phase = Phase::Delay;
                    Ok(Step::wait(sleep(self.interval)))
                }
            },

            Phase::Delay => {
                input.into_value()?;
                Ok(self.attempt())
            }
        }
    }
}
