//! Callback-based futures and promises.
//!
//! This module provides the primitive every other part of the crate is
//! built on: a write-once result slot ([`Promise`]) and its shared read
//! side ([`Future`]).
//!
//! It includes:
//! - blocking and non-blocking observation of a result,
//! - completion callbacks (`then`, `and_then`, `add_callback`),
//! - cooperative cancellation through a handler owned by the promise side,
//! - [`Value`], a type-erased result used to feed sequences.
//!
//! Unlike [`std::future::Future`], these futures are not polled: whoever
//! settles the promise drives the callbacks. They can still be awaited from
//! async code through the `std::future::Future` implementation.

pub(crate) mod core;

mod handle;
mod promise;
mod state;
mod value;

pub use handle::Future;
pub use promise::Promise;
pub use state::FutureState;
pub use value::Value;
