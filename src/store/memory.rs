//! In-process store backend with real one-shot watch semantics.
//!
//! One [`MemoryBackend`] plays the role of the remote tree; every
//! [`StoreConnector::connect`] call opens an independent session over it.
//! Sessions can be expired on demand, which makes the backend the harness
//! for session-loss recovery scenarios without a real coordination service.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::notification_pair;
use super::EventKind;
use super::NodeStat;
use super::SessionState;
use super::Store;
use super::StoreConnector;
use super::WatchEvent;
use super::WatchNotification;
use super::WatchTrigger;
use crate::utils::parent_path;
use crate::StoreError;

const ROOT: &str = "/";

struct NodeRecord {
    data: Vec<u8>,
    version: i64,
}

struct Registration {
    session: u64,
    trigger: WatchTrigger,
}

#[derive(Default)]
struct BackendState {
    nodes: BTreeMap<String, NodeRecord>,
    data_watches: HashMap<String, Vec<Registration>>,
    child_watches: HashMap<String, Vec<Registration>>,
    sessions: HashMap<u64, Arc<Mutex<SessionState>>>,
}

impl BackendState {
    fn fire_data(
        &mut self,
        path: &str,
        kind: EventKind,
    ) {
        if let Some(regs) = self.data_watches.remove(path) {
            for reg in regs {
                let _ = reg.trigger.send(WatchEvent::node(kind, path));
            }
        }
    }

    fn fire_children(
        &mut self,
        path: &str,
        kind: EventKind,
    ) {
        if let Some(regs) = self.child_watches.remove(path) {
            for reg in regs {
                let _ = reg.trigger.send(WatchEvent::node(kind, path));
            }
        }
    }

    /// Deliver a session-level event to every watch owned by `session` and
    /// drop those registrations.
    fn drain_session(
        &mut self,
        session: u64,
        state: SessionState,
    ) {
        for table in [&mut self.data_watches, &mut self.child_watches] {
            for regs in table.values_mut() {
                let mut kept = Vec::new();
                for reg in regs.drain(..) {
                    if reg.session == session {
                        let _ = reg.trigger.send(WatchEvent::session(state));
                    } else {
                        kept.push(reg);
                    }
                }
                *regs = kept;
            }
            table.retain(|_, regs| !regs.is_empty());
        }
    }

    fn child_names(
        &self,
        path: &str,
    ) -> Vec<String> {
        let prefix = if path == ROOT {
            ROOT.to_string()
        } else {
            format!("{path}/")
        };
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter(|(p, _)| !p[prefix.len()..].contains('/'))
            .map(|(p, _)| p[prefix.len()..].to_string())
            .collect()
    }

    fn has_children(
        &self,
        path: &str,
    ) -> bool {
        let prefix = format!("{path}/");
        self.nodes
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(p, _)| p.starts_with(&prefix))
    }
}

/// Shared in-process tree. Cloning yields another handle to the same tree.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
    next_session: Arc<AtomicU64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire every live session: pending watches observe an `Expired`
    /// session event and subsequent operations fail with
    /// [`StoreError::SessionExpired`] until the owner reconnects.
    pub fn expire_sessions(&self) {
        let mut state = self.state.lock();
        let sessions: Vec<(u64, Arc<Mutex<SessionState>>)> =
            state.sessions.drain().collect();
        for (id, session_state) in sessions {
            *session_state.lock() = SessionState::Expired;
            state.drain_session(id, SessionState::Expired);
            debug!(session = id, "memory store session expired");
        }
    }

    /// Number of sessions that have not expired or closed.
    pub fn live_sessions(&self) -> usize {
        self.state.lock().sessions.len()
    }
}

#[async_trait]
impl StoreConnector for MemoryBackend {
    async fn connect(&self) -> Result<Arc<dyn Store>, StoreError> {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        let session_state = Arc::new(Mutex::new(SessionState::Alive));
        self.state
            .lock()
            .sessions
            .insert(id, session_state.clone());
        debug!(session = id, "memory store session opened");
        Ok(Arc::new(MemorySession {
            id,
            state: session_state,
            backend: self.clone(),
        }))
    }
}

/// One session over a [`MemoryBackend`].
pub struct MemorySession {
    id: u64,
    state: Arc<Mutex<SessionState>>,
    backend: MemoryBackend,
}

impl MemorySession {
    fn check_alive(&self) -> Result<(), StoreError> {
        match *self.state.lock() {
            SessionState::Alive => Ok(()),
            SessionState::Expired => Err(StoreError::SessionExpired),
            SessionState::Closed => Err(StoreError::Closing),
            SessionState::AuthFailed => Err(StoreError::AuthFailed),
            SessionState::Connecting => Err(StoreError::NotConnected),
            SessionState::Disconnected => Err(StoreError::ConnectionClosed),
        }
    }
}

#[async_trait]
impl Store for MemorySession {
    fn session_state(&self) -> SessionState {
        *self.state.lock()
    }

    async fn get(
        &self,
        path: &str,
    ) -> Result<(Vec<u8>, NodeStat), StoreError> {
        self.check_alive()?;
        let state = self.backend.state.lock();
        let node = state.nodes.get(path).ok_or_else(|| StoreError::no_node(path))?;
        Ok((
            node.data.clone(),
            NodeStat {
                version: node.version,
                data_len: node.data.len(),
            },
        ))
    }

    async fn get_watch(
        &self,
        path: &str,
    ) -> Result<(Vec<u8>, NodeStat, WatchNotification), StoreError> {
        self.check_alive()?;
        let mut state = self.backend.state.lock();
        let (data, stat) = {
            let node = state.nodes.get(path).ok_or_else(|| StoreError::no_node(path))?;
            (
                node.data.clone(),
                NodeStat {
                    version: node.version,
                    data_len: node.data.len(),
                },
            )
        };
        let (trigger, notification) = notification_pair();
        state.data_watches.entry(path.to_string()).or_default().push(Registration {
            session: self.id,
            trigger,
        });
        Ok((data, stat, notification))
    }

    async fn children(
        &self,
        path: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.check_alive()?;
        let state = self.backend.state.lock();
        if path != ROOT && !state.nodes.contains_key(path) {
            return Err(StoreError::no_node(path));
        }
        Ok(state.child_names(path))
    }

    async fn children_watch(
        &self,
        path: &str,
    ) -> Result<(Vec<String>, WatchNotification), StoreError> {
        self.check_alive()?;
        let mut state = self.backend.state.lock();
        if path != ROOT && !state.nodes.contains_key(path) {
            return Err(StoreError::no_node(path));
        }
        let names = state.child_names(path);
        let (trigger, notification) = notification_pair();
        state.child_watches.entry(path.to_string()).or_default().push(Registration {
            session: self.id,
            trigger,
        });
        Ok((names, notification))
    }

    async fn set(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.check_alive()?;
        let mut state = self.backend.state.lock();
        let node = state.nodes.get_mut(path).ok_or_else(|| StoreError::no_node(path))?;
        node.data = data.to_vec();
        node.version += 1;
        state.fire_data(path, EventKind::NodeDataChanged);
        Ok(())
    }

    async fn create(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.check_alive()?;
        let mut state = self.backend.state.lock();
        if path == ROOT || state.nodes.contains_key(path) {
            return Err(StoreError::node_exists(path));
        }
        let parent = parent_path(path).ok_or_else(|| {
            StoreError::Internal(format!("invalid node path: {path}"))
        })?;
        if parent != ROOT && !state.nodes.contains_key(parent) {
            return Err(StoreError::no_node(parent));
        }
        state.nodes.insert(
            path.to_string(),
            NodeRecord {
                data: data.to_vec(),
                version: 0,
            },
        );
        state.fire_data(path, EventKind::NodeCreated);
        state.fire_children(parent, EventKind::NodeChildrenChanged);
        Ok(())
    }

    async fn delete(
        &self,
        path: &str,
    ) -> Result<(), StoreError> {
        self.check_alive()?;
        let mut state = self.backend.state.lock();
        if !state.nodes.contains_key(path) {
            return Err(StoreError::no_node(path));
        }
        if state.has_children(path) {
            return Err(StoreError::NotEmpty { path: path.into() });
        }
        state.nodes.remove(path);
        state.fire_data(path, EventKind::NodeDeleted);
        state.fire_children(path, EventKind::NodeDeleted);
        if let Some(parent) = parent_path(path) {
            state.fire_children(parent, EventKind::NodeChildrenChanged);
        }
        Ok(())
    }

    async fn exists(
        &self,
        path: &str,
    ) -> Result<bool, StoreError> {
        self.check_alive()?;
        let state = self.backend.state.lock();
        Ok(path == ROOT || state.nodes.contains_key(path))
    }

    async fn close(&self) {
        let already_closed = {
            let mut session_state = self.state.lock();
            let closed = *session_state == SessionState::Closed;
            *session_state = SessionState::Closed;
            closed
        };
        if !already_closed {
            let mut state = self.backend.state.lock();
            state.sessions.remove(&self.id);
            state.drain_session(self.id, SessionState::Closed);
            debug!(session = self.id, "memory store session closed");
        }
    }
}
