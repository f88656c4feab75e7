use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::warn;

use super::WatchHandler;
use crate::Client;
use crate::WatchEvent;

/// Lifecycle of a watch loop.
///
/// `Starting → Running → {Parked, Exited}`; a parked loop returns to
/// `Running` when the maintenance task re-arms it after reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Starting,
    Running,
    /// Stopped on a recoverable session error, queued for revival
    Parked,
    Exited,
}

/// Handle to one watch loop. Cloning shares the loop; [`close`](Watcher::close)
/// stops it cooperatively.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    client: Client,
    handler: Arc<dyn WatchHandler>,
    token: CancellationToken,
    state: Mutex<WatchState>,
}

impl Watcher {
    pub(crate) fn new(
        client: Client,
        handler: Arc<dyn WatchHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                client,
                handler,
                token: CancellationToken::new(),
                state: Mutex::new(WatchState::Starting),
            }),
        }
    }

    /// Child loop sharing this loop's stop signal: closing the parent
    /// cascades down, closing the child leaves the parent running.
    pub(crate) fn new_child(
        &self,
        handler: Arc<dyn WatchHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                client: self.inner.client.clone(),
                handler,
                token: self.inner.token.child_token(),
                state: Mutex::new(WatchState::Starting),
            }),
        }
    }

    pub fn path(&self) -> &str {
        self.inner.handler.path()
    }

    pub fn state(&self) -> WatchState {
        *self.inner.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == WatchState::Running
    }

    pub(crate) fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Stop the loop and every child loop sharing its stop signal.
    pub fn close(&self) {
        self.inner.token.cancel();
        let mut state = self.inner.state.lock();
        if *state == WatchState::Parked {
            *state = WatchState::Exited;
        }
    }

    /// Start (or, for a parked loop, restart) the loop task. The restarted
    /// loop re-invokes its handler with no prior event, forcing a fresh
    /// read and watch registration.
    pub fn watch(&self) {
        if self.inner.token.is_cancelled() {
            self.set_state(WatchState::Exited);
            return;
        }
        let watcher = self.clone();
        tokio::spawn(async move {
            watcher.run().await;
        });
    }

    async fn run(&self) {
        let path = self.path().to_string();
        self.set_state(WatchState::Running);
        debug!(%path, "watcher start");

        let mut prior: Option<WatchEvent> = None;
        loop {
            let notification = match self.inner.handler.handle(self, prior.as_ref()).await {
                Ok(Some(notification)) => notification,
                Ok(None) => {
                    debug!(%path, "watcher exit");
                    self.set_state(WatchState::Exited);
                    return;
                }
                Err(err) if err.is_recoverable() => {
                    warn!(%path, error = %err, "watcher parked on recoverable error");
                    self.park();
                    return;
                }
                Err(err) => {
                    error!(%path, error = %err, "watcher handle error");
                    self.set_state(WatchState::Exited);
                    return;
                }
            };

            tokio::select! {
                _ = self.inner.client.cancel_token().cancelled() => {
                    debug!(%path, "watcher exit: client closed");
                    self.close();
                    self.set_state(WatchState::Exited);
                    return;
                }
                _ = self.inner.token.cancelled() => {
                    debug!(%path, "watcher exit: watcher closed");
                    self.set_state(WatchState::Exited);
                    return;
                }
                fired = notification => {
                    match fired {
                        Ok(event) => {
                            debug!(%path, ?event, "watcher event");
                            if !event.session.alive() {
                                warn!(%path, state = ?event.session, "watcher parked on dead session");
                                self.park();
                                return;
                            }
                            prior = Some(event);
                        }
                        // sender dropped without a final event: the session
                        // is gone, same treatment as a dead-session event
                        Err(_) => {
                            warn!(%path, "watch notification dropped");
                            self.park();
                            return;
                        }
                    }
                }
            }
        }
    }

    fn park(&self) {
        if self.inner.client.is_closed() {
            self.set_state(WatchState::Exited);
            return;
        }
        self.set_state(WatchState::Parked);
        self.inner.client.park_dead_watcher(self.clone());
    }

    fn set_state(
        &self,
        state: WatchState,
    ) {
        *self.inner.state.lock() = state;
    }
}
