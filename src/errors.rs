//! Error Hierarchy for the Synchronization Layer
//!
//! Errors are categorized by where they originate: the remote store, the
//! payload codec, or binding construction. The watch engine only cares about
//! one classification: whether a store error is recoverable by reconnecting
//! the session.

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failures reported by the remote coordination store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Payload encode/decode failures
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Invalid binding detected at construction time
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl Error {
    /// Whether the affected watch loop should be parked and revived after
    /// the session reconnects, instead of terminated.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Store(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors surfaced by the abstract [`Store`](crate::Store) capability.
///
/// Concrete store adapters must map their native error values onto these
/// variants; the recoverable set drives the dead-watcher queue.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The target path does not exist
    #[error("no such node: {path}")]
    NoNode { path: String },

    /// Create called on an existing path
    #[error("node already exists: {path}")]
    NodeExists { path: String },

    /// Delete called on a node that still has children
    #[error("node not empty: {path}")]
    NotEmpty { path: String },

    /// The session timed out on the server side
    #[error("session expired")]
    SessionExpired,

    /// The session moved to another server mid-request
    #[error("session moved")]
    SessionMoved,

    /// The underlying connection was closed
    #[error("connection closed")]
    ConnectionClosed,

    /// The client is shutting down
    #[error("client is closing")]
    Closing,

    /// Authentication was rejected by the store
    #[error("authentication failed")]
    AuthFailed,

    /// No live connection is available
    #[error("not connected")]
    NotConnected,

    /// Anything the adapter could not classify
    #[error("store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Recoverable session errors: the session is temporarily unusable but
    /// expected to heal via reconnect.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::SessionExpired
                | StoreError::SessionMoved
                | StoreError::ConnectionClosed
                | StoreError::Closing
        )
    }

    pub fn is_no_node(&self) -> bool {
        matches!(self, StoreError::NoNode { .. })
    }

    pub fn is_node_exists(&self) -> bool {
        matches!(self, StoreError::NodeExists { .. })
    }

    pub(crate) fn no_node(path: impl Into<String>) -> Self {
        StoreError::NoNode { path: path.into() }
    }

    pub(crate) fn node_exists(path: impl Into<String>) -> Self {
        StoreError::NodeExists { path: path.into() }
    }
}

/// Payload encode/decode failures for a configured codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The node carries no payload yet. This is a normal "nothing to sync"
    /// state, not a failure, and is never logged as an error.
    #[error("empty payload")]
    EmptyPayload,

    /// JSON payload failures
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Binary payload failures
    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    /// Text payload is not valid UTF-8
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The value cannot be represented by this codec
    #[error("invalid value for codec: {0}")]
    InvalidValue(String),
}

impl CodecError {
    pub fn is_empty_payload(&self) -> bool {
        matches!(self, CodecError::EmptyPayload)
    }
}

/// Invalid bindings fail fast before any watch starts and never surface
/// later.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("path required")]
    EmptyPath,

    /// Watch-only mode has no destination, so changes are observable only
    /// through a listener.
    #[error("listener required in watch-only mode")]
    ListenerRequired,
}
