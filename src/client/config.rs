use std::time::Duration;

use crate::constants::DEFAULT_MAINTENANCE_INTERVAL;
use crate::DeletePolicy;

/// Client behavior knobs shared by every binding created from the client.
///
/// Connection-level policy (dial timeouts, session timeout negotiation)
/// belongs to the [`StoreConnector`](crate::StoreConnector), not here.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tick interval of the maintenance task that reconnects the store and
    /// revives parked watchers.
    /// Default: 20 seconds
    pub maintenance_interval: Duration,

    /// Dispatch update/delete listeners on a spawned task instead of
    /// synchronously inside the watch loop.
    /// Default: false (synchronous)
    pub listen_async: bool,

    /// What value bindings do when their node is deleted remotely.
    /// Default: re-push the local value
    pub delete_policy: DeletePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
            listen_async: false,
            delete_policy: DeletePolicy::Recreate,
        }
    }
}
