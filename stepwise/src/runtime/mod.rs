//! Host environment for futures that complete off the calling thread.
//!
//! This module contains the runtime that the rest of the crate relies on
//! when something has to happen later or elsewhere:
//! - a worker pool executing jobs and settling their promises,
//! - a timer reactor (see [`crate::reactor`]) for delayed settlement,
//! - a thread-local context so that [`sleep`](crate::time::sleep) and
//!   [`spawn`](task::spawn) find the current runtime.
//!
//! Sequences themselves do not need a runtime: they are driven entirely by
//! the callbacks of the futures they await.

mod core;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod executor;
pub(crate) mod handle;

pub mod task;

pub use self::core::Runtime;
