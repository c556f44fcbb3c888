use super::{Resume, Step};
use crate::error::Result;

/// A computation that suspends at every [`Step`] it yields.
///
/// The sequencer calls [`resume`](Self::resume) once to start, then once
/// per settled step, passing the step's outcome. Implementations are
/// explicit state machines: each call picks up where the previous one
/// left off.
///
/// Any `FnMut(Resume) -> Result<Step<T>>` closure is a coroutine.
///
/// # Examples
///
/// ```rust,ignore
/// let mut stage = 0;
/// let coroutine = move |input: Resume| {
///     stage += 1;
///     match stage {
///         1 => Ok(Step::wait(say("ready"))),
///         2 => {
///             input.into_value()?;
///             Ok(Step::wait(sleep(Duration::from_secs(1))))
///         }
///         _ => Ok(Step::Return("go")),
///     }
/// };
/// ```
pub trait Coroutine: Send + 'static {
    /// Value carried by [`Step::Return`].
    type Output: Clone + Send + Sync + 'static;

    /// Advances the computation to its next suspension point.
    ///
    /// Returning `Err` ends the sequence in the failed state.
    fn resume(&mut self, input: Resume) -> Result<Step<Self::Output>>;
}

impl<T, F> Coroutine for F
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(Resume) -> Result<Step<T>> + Send + 'static,
{
    type Output = T;

    fn resume(&mut self, input: Resume) -> Result<Step<T>> {
        self(input)
    }
}
