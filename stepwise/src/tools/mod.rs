//! Ready-made coroutines.
//!
//! [`retry`] re-issues a fallible operation produced by a factory closure
//! until it succeeds or the retry budget is spent, optionally waiting
//! between attempts.

mod retry;

#[doc(inline)]
pub use retry::{Retry, retry};
