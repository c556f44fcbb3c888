/// Observable lifecycle of a [`Future`](super::Future).
///
/// A future starts `Running` and moves to exactly one of the three
/// finished states, after which it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FutureState {
    /// Not settled yet.
    Running,

    /// Settled with a value.
    FinishedWithValue,

    /// Settled with an error.
    FinishedWithError,

    /// Settled as canceled.
    Canceled,
}

impl FutureState {
    /// Returns `true` for every state except [`FutureState::Running`].
    pub fn is_finished(self) -> bool {
        !matches!(self, FutureState::Running)
    }
}
