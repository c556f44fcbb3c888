//! Worker pool implementation.
//!
//! This module contains the components that run jobs off the calling
//! thread:
//! - [`core`]: the pool lifecycle (spawn, shutdown, join),
//! - [`injector`]: the shared job queue workers park on,
//! - [`worker`]: the per-thread run loop.

pub(crate) mod core;
pub(crate) mod injector;
pub(crate) mod worker;
