use std::mem;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use super::AlarmTrigger;
use super::ClientBuilder;
use super::ClientConfig;
use crate::Result;
use crate::SessionState;
use crate::Store;
use crate::StoreConnector;
use crate::StoreError;
use crate::Watcher;

/// Main entry point: one store session plus every watch loop bound
/// through it.
///
/// Cloning is cheap and shares the session. Created through
/// [`builder()`](Client::builder); torn down with [`close()`](Client::close),
/// which stops all owned watch loops.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    connector: Arc<dyn StoreConnector>,
    conn: ArcSwap<Conn>,
    config: ClientConfig,
    /// Completion signal shared by every watch loop owned by this session
    token: CancellationToken,
    /// Watch loops parked after a recoverable failure, waiting for revival
    dead_watchers: Mutex<Vec<Watcher>>,
    alarm: Option<AlarmTrigger>,
}

struct Conn {
    store: Arc<dyn Store>,
}

impl Client {
    /// Create a configured client builder
    pub fn builder(connector: Arc<dyn StoreConnector>) -> ClientBuilder {
        ClientBuilder::new(connector)
    }

    pub(crate) fn start(
        connector: Arc<dyn StoreConnector>,
        store: Arc<dyn Store>,
        config: ClientConfig,
        alarm: Option<AlarmTrigger>,
    ) -> Self {
        let client = Self {
            inner: Arc::new(ClientInner {
                connector,
                conn: ArcSwap::from_pointee(Conn { store }),
                config,
                token: CancellationToken::new(),
                dead_watchers: Mutex::new(Vec::new()),
                alarm,
            }),
        };
        client.spawn_maintainer();
        client
    }

    /// Current store session handle. Loops re-read it on every round, so a
    /// reconnect swap is picked up without coordination.
    pub(crate) fn store(&self) -> Arc<dyn Store> {
        self.inner.conn.load().store.clone()
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session_state(&self) -> SessionState {
        self.store().session_state()
    }

    pub fn conn_alive(&self) -> bool {
        self.session_state().alive()
    }

    fn connecting(&self) -> bool {
        self.session_state() == SessionState::Connecting
    }

    /// Tear down the current session and dial a fresh one.
    pub async fn reconnect(&self) -> std::result::Result<(), StoreError> {
        self.store().close().await;
        let store = self.inner.connector.connect().await?;
        self.inner.conn.store(Arc::new(Conn { store }));
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Close the client. Signals every owned watch loop, including parked
    /// ones, and closes the store session. The client must not be used
    /// afterwards.
    pub async fn close(&self) {
        if self.inner.token.is_cancelled() {
            return;
        }
        self.inner.token.cancel();

        for watcher in self.collect_dead_watchers() {
            watcher.close();
        }

        self.store().close().await;
    }

    /// Queue a watch loop that failed recoverably, waiting to watch again
    pub(crate) fn park_dead_watcher(
        &self,
        watcher: Watcher,
    ) {
        debug!(path = %watcher.path(), "watcher appended to dead queue");
        self.inner.dead_watchers.lock().push(watcher);
    }

    /// Atomically drain the queue; parks racing with the drain land in the
    /// queue for the next tick.
    fn collect_dead_watchers(&self) -> Vec<Watcher> {
        mem::take(&mut *self.inner.dead_watchers.lock())
    }

    #[cfg(test)]
    pub(crate) fn dead_watcher_count(&self) -> usize {
        self.inner.dead_watchers.lock().len()
    }

    /// Maintenance task: reconnect a dead session, then revive parked
    /// watchers once the connection is alive again. Runs until close.
    fn spawn_maintainer(&self) {
        let client = self.clone();
        let period = client.inner.config.maintenance_interval;
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = client.inner.token.cancelled() => {
                        debug!("maintenance task exit: client closed");
                        return;
                    }
                    _ = ticker.tick() => {
                        if !client.conn_alive() && !client.connecting() {
                            if let Err(err) = client.reconnect().await {
                                warn!(error = %err, "store reconnect failed");
                                if let Some(alarm) = &client.inner.alarm {
                                    alarm(&err);
                                }
                            }
                        }

                        if client.conn_alive() {
                            for watcher in client.collect_dead_watchers() {
                                watcher.watch();
                            }
                        }
                    }
                }
            }
        });
    }

    /// Create the target path and any missing ancestors with empty
    /// payloads. Synchronizers rely on this to push defaults into a
    /// non-existent tree.
    pub async fn ensure_path(
        &self,
        path: &str,
    ) -> Result<()> {
        let store = self.store();
        if store.exists(path).await? {
            return Ok(());
        }

        let mut prefix = String::with_capacity(path.len());
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);
            if store.exists(&prefix).await? {
                continue;
            }
            match store.create(&prefix, &[]).await {
                Ok(()) => {}
                // lost a create race, the node is there either way
                Err(err) if err.is_node_exists() => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Delete a node; deleting an absent node is not an error.
    pub async fn delete(
        &self,
        path: &str,
    ) -> Result<()> {
        debug!(%path, "delete node");
        match self.store().delete(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_no_node() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
