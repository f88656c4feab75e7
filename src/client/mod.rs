//! Client session module.
//!
//! Provides the primary interface [`Client`]:
//! - connection maintenance and the dead-watcher recovery queue
//! - read/write helpers with ancestor auto-creation
//! - the typed binding API (`sync*` / `watch*`) returning [`Watcher`]
//!   handles
//!
//! # Basic Usage
//! ```no_run
//! use std::sync::Arc;
//!
//! use parking_lot::RwLock;
//! use treesync::Client;
//! use treesync::MemoryBackend;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!     let client = Client::builder(Arc::new(backend)).build().await.unwrap();
//!
//!     let motd = Arc::new(RwLock::new(String::new()));
//!     let watcher = client.sync_string("/config/motd", motd.clone()).unwrap();
//!
//!     client.set_string("/config/motd", "hello world").await.unwrap();
//!
//!     watcher.close();
//!     client.close().await;
//! }
//! ```

mod builder;
mod client;
mod config;
mod ops;
mod sync;

pub use builder::*;
pub use client::*;
pub use config::*;
pub use sync::*;

#[cfg(test)]
mod sync_test;
