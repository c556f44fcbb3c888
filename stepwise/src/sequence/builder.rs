use super::core::SequenceState;
use super::{Coroutine, Sequence};
use crate::join::SiblingPolicy;

/// Configures a [`Sequence`] before starting it.
///
/// # Examples
///
/// ```rust,ignore
/// let sequence = SequenceBuilder::new()
///     .name("handshake")
///     .sibling_policy(SiblingPolicy::CancelRest)
///     .start(handshake);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    /// Label attached to log events.
    name: Option<String>,

    /// Policy applied to [`Step::Join`](super::Step::Join) steps.
    policy: SiblingPolicy,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the sequence in log events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Chooses what join steps do with their remaining members after a
    /// failure. Defaults to [`SiblingPolicy::LetFinish`].
    pub fn sibling_policy(mut self, policy: SiblingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starts `coroutine`, running it synchronously up to its first
    /// suspension point.
    pub fn start<C: Coroutine>(self, coroutine: C) -> Sequence<C::Output> {
        Sequence {
            state: SequenceState::start(Box::new(coroutine), self.name, self.policy),
        }
    }
}
