//! Timer reactor.
//!
//! The reactor is a dedicated thread owning every pending timer. It is
//! responsible for:
//! - receiving timer registrations over a command channel,
//! - sleeping until the earliest deadline,
//! - handing expired timers to the worker pool, which settles them.
//!
//! It runs independently from the executor. Most users reach it through
//! [`sleep`](crate::time::sleep) rather than directly.

mod core;
mod timer;

pub(crate) mod command;

pub(crate) use core::{Reactor, ReactorHandle};
