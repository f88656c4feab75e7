//! Abstract coordination-store capability.
//!
//! The synchronization engine never talks a wire protocol itself; it
//! consumes a [`Store`] session plus a [`StoreConnector`] that can produce a
//! fresh session after a loss. An in-process implementation with real watch
//! semantics lives in [`memory`] for tests and embedded use.

mod event;
mod memory;

pub use event::*;
pub use memory::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::StoreError;

/// One session against the remote hierarchical store.
///
/// All watch operations are one-shot: the returned
/// [`WatchNotification`] fires for the first matching change only and must
/// be re-armed by calling the operation again.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Current session state, readable without I/O.
    fn session_state(&self) -> SessionState;

    async fn get(
        &self,
        path: &str,
    ) -> Result<(Vec<u8>, NodeStat), StoreError>;

    /// Read a node and arm a one-shot watch for its next change.
    async fn get_watch(
        &self,
        path: &str,
    ) -> Result<(Vec<u8>, NodeStat, WatchNotification), StoreError>;

    async fn children(
        &self,
        path: &str,
    ) -> Result<Vec<String>, StoreError>;

    /// List child names and arm a one-shot watch for the next child-set
    /// change.
    async fn children_watch(
        &self,
        path: &str,
    ) -> Result<(Vec<String>, WatchNotification), StoreError>;

    async fn set(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<(), StoreError>;

    async fn create(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<(), StoreError>;

    async fn delete(
        &self,
        path: &str,
    ) -> Result<(), StoreError>;

    async fn exists(
        &self,
        path: &str,
    ) -> Result<bool, StoreError>;

    /// Tear down the session. Pending watches observe a closed session.
    async fn close(&self);
}

/// Produces store sessions. Owns dial policy and session timeouts; the
/// client calls it once at construction and again on every reconnect.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Arc<dyn Store>, StoreError>;
}
