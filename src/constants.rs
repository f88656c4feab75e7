use std::time::Duration;

/// Interval of the per-session maintenance task that reconnects the store
/// and revives parked watchers.
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(20);

/// Node path separator used by the coordination store.
pub const PATH_SEPARATOR: char = '/';
