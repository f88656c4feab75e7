use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use tracing::warn;

use super::ValueListener;
use super::WatchHandler;
use super::Watcher;
use crate::BindError;
use crate::Codec;
use crate::CodecError;
use crate::EventKind;
use crate::Result;
use crate::WatchEvent;
use crate::WatchNotification;

/// What a value binding does when its node is deleted remotely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Re-push the current local value, re-creating the node. The binding
    /// keeps watching.
    #[default]
    Recreate,
    /// Fire the delete listener and terminate the watch loop.
    Exit,
}

/// Binds one path to one typed destination slot through a codec.
///
/// In watch-only mode there is no slot and every decoded change goes to the
/// listener alone.
pub(crate) struct ValueHandler<C: Codec> {
    path: String,
    slot: Option<Arc<RwLock<C::Value>>>,
    codec: C,
    listener: Option<Arc<dyn ValueListener<C::Value>>>,
    delete_policy: DeletePolicy,
    listen_async: bool,
}

impl<C: Codec> ValueHandler<C> {
    pub(crate) fn new(
        path: String,
        codec: C,
        slot: Option<Arc<RwLock<C::Value>>>,
        listener: Option<Arc<dyn ValueListener<C::Value>>>,
        delete_policy: DeletePolicy,
        listen_async: bool,
    ) -> std::result::Result<Self, BindError> {
        if path.is_empty() {
            return Err(BindError::EmptyPath);
        }
        if slot.is_none() && listener.is_none() {
            return Err(BindError::ListenerRequired);
        }
        Ok(Self {
            path,
            slot,
            codec,
            listener,
            delete_policy,
            listen_async,
        })
    }

    /// Serialize the current local value, used to push defaults into an
    /// absent remote node. Watch-only bindings push an empty payload.
    pub(crate) fn encode_current(&self) -> std::result::Result<Vec<u8>, CodecError> {
        match &self.slot {
            Some(slot) => self.codec.encode(&slot.read()),
            None => Ok(Vec::new()),
        }
    }

    fn apply(
        &self,
        data: &[u8],
    ) -> std::result::Result<(), CodecError> {
        let value = self.codec.decode(data)?;
        if let Some(slot) = &self.slot {
            *slot.write() = value.clone();
        }
        self.notify_update(value);
        Ok(())
    }

    fn notify_update(
        &self,
        value: C::Value,
    ) {
        if let Some(listener) = &self.listener {
            if self.listen_async {
                let listener = listener.clone();
                let path = self.path.clone();
                tokio::spawn(async move {
                    listener.update(&path, &value);
                });
            } else {
                listener.update(&self.path, &value);
            }
        }
    }

    fn notify_delete(&self) {
        if let Some(listener) = &self.listener {
            if self.listen_async {
                let listener = listener.clone();
                let path = self.path.clone();
                tokio::spawn(async move {
                    listener.delete(&path);
                });
            } else {
                listener.delete(&self.path);
            }
        }
    }
}

#[async_trait]
impl<C: Codec> WatchHandler for ValueHandler<C> {
    fn path(&self) -> &str {
        &self.path
    }

    async fn handle(
        &self,
        watcher: &Watcher,
        prior: Option<&WatchEvent>,
    ) -> Result<Option<WatchNotification>> {
        if self.delete_policy == DeletePolicy::Exit {
            if let Some(event) = prior {
                if event.kind == EventKind::NodeDeleted {
                    self.notify_delete();
                    return Ok(None);
                }
            }
        }

        let client = watcher.client();
        let store = client.store();
        let (data, _stat, notification) = match store.get_watch(&self.path).await {
            Ok(read) => read,
            Err(err) if err.is_no_node() => {
                // absent remote node: initialize it from the local value
                let seed = self.encode_current()?;
                debug!(path = %self.path, "pushing local default to absent node");
                client.set_raw(&self.path, &seed).await?;
                store.get_watch(&self.path).await?
            }
            Err(err) => return Err(err.into()),
        };

        // the codec decides what an empty payload means: structured codecs
        // report EmptyPayload ("nothing to sync yet"), the string codec
        // decodes it to a legitimate empty value
        match self.apply(&data) {
            Ok(()) => {}
            Err(err) if err.is_empty_payload() => {}
            Err(err) => {
                warn!(path = %self.path, error = %err, "failed to decode node payload");
            }
        }

        Ok(Some(notification))
    }
}
