//! Joining a fixed set of futures into one.
//!
//! The aggregator waits for every member of an ordered collection and
//! resolves with their values in input order, whatever order they
//! complete in. The first member to fail settles the join with that
//! member's error; what happens to the remaining members is decided by a
//! [`SiblingPolicy`].
//!
//! Two shapes are offered:
//! - lists, through [`join_all`] and [`Join`], resolving to `Vec<T>`,
//! - tuples of futures with different types, through the
//!   [`join!`](crate::join!) macro.

mod core;
mod slot;

pub use slot::Slot;

use self::core::JoinCore;
use crate::future::Future;

/// What a join does with unfinished members once one of them fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SiblingPolicy {
    /// Leave the other members running; their outcomes are ignored.
    #[default]
    LetFinish,

    /// Request cancellation of every other member.
    CancelRest,
}

/// Builder for a list-shaped join.
///
/// # Examples
///
/// ```rust,ignore
/// let all = Join::new(vec![sleep(a), sleep(b)])
///     .policy(SiblingPolicy::CancelRest)
///     .start();
///
/// all.wait();
/// ```
pub struct Join<T> {
    /// Members, in the order their values are reported.
    members: Vec<Future<T>>,

    /// Behavior on first failure.
    policy: SiblingPolicy,
}

impl<T: Clone + Send + 'static> Join<T> {
    /// Creates a join over `members` with the default policy.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Future<T>>,
    {
        Self {
            members: members.into_iter().collect(),
            policy: SiblingPolicy::default(),
        }
    }

    /// Sets the behavior on first failure.
    pub fn policy(mut self, policy: SiblingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Subscribes to every member and returns the joined future.
    ///
    /// An empty join resolves immediately with an empty `Vec`. Canceling
    /// the returned future forwards the request to every member.
    pub fn start(self) -> Future<Vec<T>> {
        if self.members.is_empty() {
            return Future::ready(Vec::new());
        }

        JoinCore::start(self.members, self.policy)
    }
}

/// Joins `members` with [`SiblingPolicy::LetFinish`].
///
/// # Examples
///
/// ```rust,ignore
/// let values = join_all(vec![Future::ready(1), Future::ready(2)]).value()?;
/// assert_eq!(values, vec![1, 2]);
/// ```
pub fn join_all<T, I>(members: I) -> Future<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Future<T>>,
{
    Join::new(members).start()
}
