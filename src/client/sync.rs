//! Binding API: attach typed destinations to store paths and keep them
//! synchronized by a watch loop.
//!
//! `sync*` variants mirror into a destination; `watch*` variants have no
//! destination and report changes through a listener only. All of them
//! return an already-started [`Watcher`] handle; close it to stop.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Client;
use crate::watch::MapHandler;
use crate::watch::ValueHandler;
use crate::watch::WatchHandler;
use crate::ChildListener;
use crate::Codec;
use crate::JsonCodec;
use crate::Result;
use crate::StringCodec;
use crate::ValueListener;
use crate::Watcher;

/// Shared single-value destination slot.
pub type ValueSlot<T> = Arc<RwLock<T>>;

/// Shared child-name to value mapping destination.
pub type MapSlot<T> = Arc<RwLock<HashMap<String, T>>>;

impl Client {
    /// Mirror the value at `path` into `slot`.
    pub fn sync<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        slot: ValueSlot<C::Value>,
    ) -> Result<Watcher> {
        self.bind_value(path.into(), codec, Some(slot), None)
    }

    /// Mirror the value at `path` into `slot` and report every change to
    /// `listener`.
    pub fn sync_watch<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        slot: ValueSlot<C::Value>,
        listener: Arc<dyn ValueListener<C::Value>>,
    ) -> Result<Watcher> {
        self.bind_value(path.into(), codec, Some(slot), Some(listener))
    }

    /// Watch the value at `path` without a destination; changes are
    /// observable through the listener only.
    pub fn watch_value<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        listener: Arc<dyn ValueListener<C::Value>>,
    ) -> Result<Watcher> {
        self.bind_value(path.into(), codec, None, Some(listener))
    }

    /// Mirror the children of `path` into `map`. With `recursive` set every
    /// child value is watched continuously; otherwise it is read once when
    /// the child appears.
    pub fn sync_map<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        map: MapSlot<C::Value>,
        recursive: bool,
    ) -> Result<Watcher> {
        self.bind_map(path.into(), codec, Some(map), recursive, None)
    }

    pub fn sync_watch_map<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        map: MapSlot<C::Value>,
        recursive: bool,
        listener: Arc<dyn ChildListener<C::Value>>,
    ) -> Result<Watcher> {
        self.bind_map(path.into(), codec, Some(map), recursive, Some(listener))
    }

    /// Watch the children of `path` without a destination mapping.
    pub fn watch_map<C: Codec>(
        &self,
        path: impl Into<String>,
        codec: C,
        recursive: bool,
        listener: Arc<dyn ChildListener<C::Value>>,
    ) -> Result<Watcher> {
        self.bind_map(path.into(), codec, None, recursive, Some(listener))
    }

    //--------------------------------------------------------------------
    // Convenience wrappers for the common codecs

    pub fn sync_string(
        &self,
        path: impl Into<String>,
        slot: ValueSlot<String>,
    ) -> Result<Watcher> {
        self.sync(path, StringCodec, slot)
    }

    pub fn sync_watch_string(
        &self,
        path: impl Into<String>,
        slot: ValueSlot<String>,
        listener: Arc<dyn ValueListener<String>>,
    ) -> Result<Watcher> {
        self.sync_watch(path, StringCodec, slot, listener)
    }

    pub fn watch_string(
        &self,
        path: impl Into<String>,
        listener: Arc<dyn ValueListener<String>>,
    ) -> Result<Watcher> {
        self.watch_value(path, StringCodec, listener)
    }

    pub fn sync_json<T>(
        &self,
        path: impl Into<String>,
        slot: ValueSlot<T>,
    ) -> Result<Watcher>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.sync(path, JsonCodec::new(), slot)
    }

    pub fn sync_watch_json<T>(
        &self,
        path: impl Into<String>,
        slot: ValueSlot<T>,
        listener: Arc<dyn ValueListener<T>>,
    ) -> Result<Watcher>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.sync_watch(path, JsonCodec::new(), slot, listener)
    }

    pub fn sync_string_map(
        &self,
        path: impl Into<String>,
        map: MapSlot<String>,
        recursive: bool,
    ) -> Result<Watcher> {
        self.sync_map(path, StringCodec, map, recursive)
    }

    pub fn sync_json_map<T>(
        &self,
        path: impl Into<String>,
        map: MapSlot<T>,
        recursive: bool,
    ) -> Result<Watcher>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.sync_map(path, JsonCodec::new(), map, recursive)
    }

    pub fn sync_watch_json_map<T>(
        &self,
        path: impl Into<String>,
        map: MapSlot<T>,
        recursive: bool,
        listener: Arc<dyn ChildListener<T>>,
    ) -> Result<Watcher>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.sync_watch_map(path, JsonCodec::new(), map, recursive, listener)
    }

    //--------------------------------------------------------------------

    fn bind_value<C: Codec>(
        &self,
        path: String,
        codec: C,
        slot: Option<ValueSlot<C::Value>>,
        listener: Option<Arc<dyn ValueListener<C::Value>>>,
    ) -> Result<Watcher> {
        let config = self.config();
        let handler = ValueHandler::new(
            path,
            codec,
            slot,
            listener,
            config.delete_policy,
            config.listen_async,
        )?;
        Ok(self.start_watcher(Arc::new(handler)))
    }

    fn bind_map<C: Codec>(
        &self,
        path: String,
        codec: C,
        map: Option<MapSlot<C::Value>>,
        recursive: bool,
        listener: Option<Arc<dyn ChildListener<C::Value>>>,
    ) -> Result<Watcher> {
        let handler = MapHandler::new(
            path,
            codec,
            map,
            recursive,
            listener,
            self.config().listen_async,
        )?;
        Ok(self.start_watcher(Arc::new(handler)))
    }

    fn start_watcher(
        &self,
        handler: Arc<dyn WatchHandler>,
    ) -> Watcher {
        let watcher = Watcher::new(self.clone(), handler);
        watcher.watch();
        watcher
    }
}
