use std::sync::Arc;
use std::time::Duration;

use super::Client;
use super::ClientConfig;
use crate::DeletePolicy;
use crate::Result;
use crate::StoreConnector;
use crate::StoreError;

/// Callback fired when a reconnect attempt fails, for alerting hooks.
pub type AlarmTrigger = Arc<dyn Fn(&StoreError) + Send + Sync>;

pub struct ClientBuilder {
    connector: Arc<dyn StoreConnector>,
    config: ClientConfig,
    alarm: Option<AlarmTrigger>,
}

impl ClientBuilder {
    /// Create a new builder with default config and the given connector
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            config: ClientConfig::default(),
            alarm: None,
        }
    }

    /// Set the maintenance tick interval (default: 20s)
    pub fn maintenance_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.config.maintenance_interval = interval;
        self
    }

    /// Dispatch listeners asynchronously (default: synchronous)
    pub fn listen_async(
        mut self,
        listen_async: bool,
    ) -> Self {
        self.config.listen_async = listen_async;
        self
    }

    /// Behavior of value bindings on remote node deletion
    /// (default: re-push the local value)
    pub fn delete_policy(
        mut self,
        policy: DeletePolicy,
    ) -> Self {
        self.config.delete_policy = policy;
        self
    }

    /// Hook invoked whenever a reconnect attempt fails
    pub fn alarm_trigger(
        mut self,
        trigger: impl Fn(&StoreError) + Send + Sync + 'static,
    ) -> Self {
        self.alarm = Some(Arc::new(trigger));
        self
    }

    /// Completely replaces the default configuration
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Connect the store and start the maintenance task.
    pub async fn build(self) -> Result<Client> {
        let store = match self.connector.connect().await {
            Ok(store) => store,
            Err(err) => {
                if let Some(alarm) = &self.alarm {
                    alarm(&err);
                }
                return Err(err.into());
            }
        };
        let client = Client::start(self.connector, store, self.config, self.alarm);
        Ok(client)
    }
}
