//! Watch-driven synchronization for hierarchical coordination stores.
//!
//! Mirrors remote node values and child sets into typed local memory, keeps
//! the mirror live through one-shot watch notifications, and writes local
//! changes back. Sessions self-heal: watch loops hit by a recoverable
//! session error are parked and transparently revived after reconnect.
//!
//! The wire protocol is abstracted behind the [`Store`] capability; payload
//! formats behind [`Codec`]. An in-memory [`MemoryBackend`] store ships for
//! tests and embedded use.

mod client;
mod codec;
mod constants;
mod errors;
mod store;
mod watch;

pub mod utils;

pub use client::*;
pub use codec::*;
pub use constants::*;
pub use errors::*;
pub use store::*;
pub use watch::*;
