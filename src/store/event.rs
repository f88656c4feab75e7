use tokio::sync::oneshot;

/// State of the client-store session as reported by the store adapter and
/// carried on every watch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Alive,
    Disconnected,
    AuthFailed,
    Expired,
    Closed,
}

impl SessionState {
    /// A watch loop keeps running only while the session is alive; any
    /// other state parks it for recovery.
    pub fn alive(&self) -> bool {
        matches!(self, SessionState::Alive)
    }
}

/// Kind of change a watch notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NodeCreated,
    NodeDataChanged,
    NodeDeleted,
    NodeChildrenChanged,
    /// Session-level transition, no node change
    Session,
}

/// A single fired notification.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub kind: EventKind,
    pub path: String,
    pub session: SessionState,
}

impl WatchEvent {
    pub fn node(
        kind: EventKind,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            session: SessionState::Alive,
        }
    }

    pub fn session(state: SessionState) -> Self {
        Self {
            kind: EventKind::Session,
            path: String::new(),
            session: state,
        }
    }
}

/// One-shot notification handle returned by `get_watch`/`children_watch`.
///
/// It fires at most once; after receiving the event the caller must re-arm
/// by issuing the watch operation again. A dropped sender (session torn
/// down without a final event) is treated like a dead-session event.
pub type WatchNotification = oneshot::Receiver<WatchEvent>;

/// Sender half handed to store adapters when registering a watch.
pub type WatchTrigger = oneshot::Sender<WatchEvent>;

/// Creates a connected notification pair.
pub fn notification_pair() -> (WatchTrigger, WatchNotification) {
    oneshot::channel()
}

/// Node metadata returned alongside reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStat {
    /// Incremented on every data change
    pub version: i64,
    pub data_len: usize,
}
