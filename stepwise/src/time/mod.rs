//! Timer futures.
//!
//! This module provides time-related futures that integrate with the
//! runtime reactor.
//!
//! It includes:
//! - [`sleep`] for a future settled after a delay,
//! - [`timeout`] for bounding how long another future may take.

mod sleep;
mod timeout;

#[doc(inline)]
pub use sleep::sleep;

#[doc(inline)]
pub use timeout::timeout;

pub(crate) use sleep::schedule;
