//! # Stepwise
//!
//! **Stepwise** turns a resumable computation into a future. A computation
//! yields a future each time it has to wait; the crate subscribes to that
//! future, resumes the computation with its outcome, and keeps going until
//! the computation returns. The whole chain is exposed as a single future
//! that can be awaited, observed, composed or canceled.
//!
//! It is built around a small set of pieces:
//!
//! - **Callback-based futures** ([`Future`], [`Promise`]) with blocking
//!   waits, completion callbacks and cooperative cancellation
//! - **Sequences** ([`Sequence`], [`Coroutine`], [`Step`]) driving a
//!   computation one step at a time, on whichever thread settles each step
//! - **Joins** ([`join_all`], [`Join`], [`join!`]) waiting for several
//!   futures at once
//! - **A lightweight runtime** with a worker pool and a timer thread, for
//!   [`time::sleep`], [`time::timeout`] and [`task::spawn`]
//! - **Macros** like `#[stepwise::sequence]`, `#[stepwise::main]`,
//!   `#[stepwise::test]` and `join!`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepwise::time::sleep;
//! use stepwise::{Resume, Step};
//! use std::time::Duration;
//!
//! #[stepwise::sequence]
//! fn countdown(from: u32) -> impl stepwise::Coroutine<Output = u32> {
//!     let mut left = from;
//!     move |input: Resume| {
//!         input.into_value()?;
//!         if left == 0 {
//!             return Ok(Step::Return(from));
//!         }
//!         left -= 1;
//!         Ok(Step::wait(sleep(Duration::from_millis(100))))
//!     }
//! }
//!
//! #[stepwise::main]
//! fn main() {
//!     let sequence = countdown(3);
//!     assert_eq!(sequence.value().unwrap(), Some(3));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`future`]: Futures, promises and type-erased values
//! - [`sequence`]: The coroutine sequencer
//! - [`join`]: Waiting on several futures
//! - [`time`]: Sleep and timeout
//! - [`tools`]: Utilities like retry

mod error;
mod reactor;
mod runtime;

pub mod future;
pub mod join;
pub mod sequence;
pub mod time;
pub mod tools;

pub use error::{Error, Result};
pub use future::{Future, FutureState, Promise, Value};
pub use join::{Join, SiblingPolicy, join_all};
pub use sequence::{Coroutine, Resume, Sequence, SequenceBuilder, Step};

pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::handle::Handle;
pub use runtime::task;

pub use stepwise_macros::*;
