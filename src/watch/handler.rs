use async_trait::async_trait;

use super::Watcher;
use crate::Result;
use crate::WatchEvent;
use crate::WatchNotification;

/// Per-path event handler driven by a [`Watcher`] loop.
///
/// `handle` performs one synchronization round: read the path, apply the
/// payload, and re-arm the next one-shot notification. Returning `Ok(None)`
/// terminates the loop intentionally; a recoverable error parks it.
#[async_trait]
pub(crate) trait WatchHandler: Send + Sync + 'static {
    fn path(&self) -> &str;

    async fn handle(
        &self,
        watcher: &Watcher,
        prior: Option<&WatchEvent>,
    ) -> Result<Option<WatchNotification>>;
}

/// Observer of a single value binding.
///
/// May be invoked from the watch loop task or, with asynchronous dispatch
/// configured, from a freshly spawned task; never assume a particular task.
pub trait ValueListener<T>: Send + Sync + 'static {
    fn update(
        &self,
        path: &str,
        value: &T,
    );

    /// Only fired under [`DeletePolicy::Exit`](crate::DeletePolicy::Exit).
    fn delete(
        &self,
        path: &str,
    ) {
        let _ = path;
    }
}

/// Observer of a mapping binding; `child` is the child node name.
pub trait ChildListener<T>: Send + Sync + 'static {
    fn update(
        &self,
        path: &str,
        child: &str,
        value: &T,
    );

    fn delete(
        &self,
        path: &str,
        child: &str,
    );
}
