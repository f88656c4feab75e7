use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::ChildListener;
use super::WatchHandler;
use super::Watcher;
use crate::utils::join_path;
use crate::utils::node_name;
use crate::BindError;
use crate::Client;
use crate::Codec;
use crate::CodecError;
use crate::EventKind;
use crate::Result;
use crate::WatchEvent;
use crate::WatchNotification;

/// Binds one path to a mapping from child name to decoded child value.
///
/// The handler keeps a snapshot of the last-known child-name set and
/// computes deltas on every children notification. In recursive mode every
/// child gets its own delegate watch loop sharing the parent's stop signal;
/// otherwise child values are read once when the child appears.
pub(crate) struct MapHandler<C: Codec> {
    shared: Arc<MapShared<C>>,
}

struct MapShared<C: Codec> {
    path: String,
    map: Option<Arc<RwLock<HashMap<String, C::Value>>>>,
    codec: C,
    recursive: bool,
    listener: Option<Arc<dyn ChildListener<C::Value>>>,
    /// Last-known child-name set, the baseline for delta computation
    children: Mutex<HashSet<String>>,
    listen_async: bool,
}

impl<C: Codec> MapHandler<C> {
    pub(crate) fn new(
        path: String,
        codec: C,
        map: Option<Arc<RwLock<HashMap<String, C::Value>>>>,
        recursive: bool,
        listener: Option<Arc<dyn ChildListener<C::Value>>>,
        listen_async: bool,
    ) -> std::result::Result<Self, BindError> {
        if path.is_empty() {
            return Err(BindError::EmptyPath);
        }
        if map.is_none() && listener.is_none() {
            return Err(BindError::ListenerRequired);
        }
        Ok(Self {
            shared: Arc::new(MapShared {
                path,
                map,
                codec,
                recursive,
                listener,
                children: Mutex::new(HashSet::new()),
                listen_async,
            }),
        })
    }

    /// Start synchronization of a newly appeared child. Per-child failures
    /// are logged and must never abort the parent's children watch.
    async fn sync_child(
        &self,
        watcher: &Watcher,
        child: &str,
    ) {
        if self.shared.recursive {
            let child_path = join_path(&self.shared.path, child);
            let delegate = watcher.new_child(Arc::new(ChildValueHandler {
                shared: self.shared.clone(),
                path: child_path,
            }));
            delegate.watch();
            return;
        }

        let child_path = join_path(&self.shared.path, child);
        if let Err(err) = self.shared.load_child(watcher.client(), &child_path).await {
            error!(path = %child_path, error = %err, "failed to load child value");
        }
    }
}

impl<C: Codec> MapShared<C> {
    /// One-time read of a child value, used in non-recursive mode.
    async fn load_child(
        &self,
        client: &Client,
        child_path: &str,
    ) -> Result<()> {
        let (data, _stat) = client.store().get(child_path).await?;
        match self.apply_child(node_name(child_path), &data) {
            Ok(()) => {}
            Err(err) if err.is_empty_payload() => {}
            Err(err) => {
                warn!(path = %child_path, error = %err, "failed to decode child payload");
            }
        }
        Ok(())
    }

    fn apply_child(
        &self,
        child: &str,
        data: &[u8],
    ) -> std::result::Result<(), CodecError> {
        let value = self.codec.decode(data)?;
        if let Some(map) = &self.map {
            map.write().insert(child.to_string(), value.clone());
        }
        self.notify_update(child, value);
        Ok(())
    }

    fn remove_child(
        &self,
        child: &str,
    ) {
        if let Some(map) = &self.map {
            map.write().remove(child);
        }
        self.notify_delete(child);
    }

    fn notify_update(
        &self,
        child: &str,
        value: C::Value,
    ) {
        if let Some(listener) = &self.listener {
            if self.listen_async {
                let listener = listener.clone();
                let path = self.path.clone();
                let child = child.to_string();
                tokio::spawn(async move {
                    listener.update(&path, &child, &value);
                });
            } else {
                listener.update(&self.path, child, &value);
            }
        }
    }

    fn notify_delete(
        &self,
        child: &str,
    ) {
        if let Some(listener) = &self.listener {
            if self.listen_async {
                let listener = listener.clone();
                let path = self.path.clone();
                let child = child.to_string();
                tokio::spawn(async move {
                    listener.delete(&path, &child);
                });
            } else {
                listener.delete(&self.path, child);
            }
        }
    }
}

#[async_trait]
impl<C: Codec> WatchHandler for MapHandler<C> {
    fn path(&self) -> &str {
        &self.shared.path
    }

    async fn handle(
        &self,
        watcher: &Watcher,
        prior: Option<&WatchEvent>,
    ) -> Result<Option<WatchNotification>> {
        if let Some(event) = prior {
            if event.kind == EventKind::NodeDeleted {
                let tracked: Vec<String> = self.shared.children.lock().drain().collect();
                for child in tracked {
                    self.shared.remove_child(&child);
                }
                return Ok(None);
            }
        }

        let client = watcher.client();
        let store = client.store();
        let (names, notification) = match store.children_watch(&self.shared.path).await {
            Ok(listed) => listed,
            Err(err) if err.is_no_node() => {
                client.ensure_path(&self.shared.path).await?;
                store.children_watch(&self.shared.path).await?
            }
            Err(err) => return Err(err.into()),
        };

        // swap the snapshot first; child reads below must not hold the lock
        let (added, removed) = {
            let mut tracked = self.shared.children.lock();
            let current: HashSet<String> = names.into_iter().collect();
            let added: Vec<String> = current.difference(&tracked).cloned().collect();
            let removed: Vec<String> = tracked.difference(&current).cloned().collect();
            *tracked = current;
            (added, removed)
        };

        for child in added {
            debug!(path = %self.shared.path, %child, "child appeared");
            self.sync_child(watcher, &child).await;
        }
        for child in removed {
            info!(path = %self.shared.path, %child, "child removed");
            self.shared.remove_child(&child);
        }

        Ok(Some(notification))
    }
}

/// Delegate handler for one child under a recursive map binding. Reads the
/// child value with a watch and writes it into the shared mapping; exits
/// when its own node is deleted, leaving snapshot cleanup to the parent's
/// next children round.
struct ChildValueHandler<C: Codec> {
    shared: Arc<MapShared<C>>,
    path: String,
}

#[async_trait]
impl<C: Codec> WatchHandler for ChildValueHandler<C> {
    fn path(&self) -> &str {
        &self.path
    }

    async fn handle(
        &self,
        watcher: &Watcher,
        prior: Option<&WatchEvent>,
    ) -> Result<Option<WatchNotification>> {
        if let Some(event) = prior {
            if event.kind == EventKind::NodeDeleted {
                return Ok(None);
            }
        }

        let store = watcher.client().store();
        let (data, _stat, notification) = match store.get_watch(&self.path).await {
            Ok(read) => read,
            // deleted between the parent's listing and this read; the
            // parent's delta pass removes the mapping entry
            Err(err) if err.is_no_node() => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match self.shared.apply_child(node_name(&self.path), &data) {
            Ok(()) => {}
            Err(err) if err.is_empty_payload() => {}
            Err(err) => {
                warn!(path = %self.path, error = %err, "failed to decode child payload");
            }
        }

        Ok(Some(notification))
    }
}
