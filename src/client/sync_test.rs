use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::time::sleep;

use super::Client;
use crate::BindError;
use crate::Error;
use crate::MemoryBackend;
use crate::ValueListener;
use crate::WatchState;

const SETTLE: Duration = Duration::from_millis(100);

async fn memory_client() -> Client {
    Client::builder(Arc::new(MemoryBackend::new()))
        .maintenance_interval(Duration::from_secs(3600))
        .build()
        .await
        .unwrap()
}

#[derive(Default)]
struct RecordingListener {
    updates: Mutex<Vec<(String, String)>>,
}

impl ValueListener<String> for RecordingListener {
    fn update(
        &self,
        path: &str,
        value: &String,
    ) {
        self.updates.lock().push((path.to_string(), value.clone()));
    }
}

#[tokio::test]
async fn sync_rejects_empty_path() {
    let client = memory_client().await;
    let slot = Arc::new(RwLock::new(String::new()));

    let result = client.sync_string("", slot);
    assert!(matches!(result, Err(Error::Bind(BindError::EmptyPath))));
}

#[tokio::test]
async fn sync_pushes_local_default_to_missing_node() {
    let client = memory_client().await;
    let slot = Arc::new(RwLock::new("fallback".to_string()));

    let watcher = client.sync_string("/cfg/name", slot.clone()).unwrap();
    sleep(SETTLE).await;

    assert!(client.exists("/cfg/name").await.unwrap());
    assert_eq!(client.get_string("/cfg/name").await.unwrap(), "fallback");
    assert_eq!(*slot.read(), "fallback");
    assert_eq!(watcher.state(), WatchState::Running);
}

#[tokio::test]
async fn sync_mirrors_remote_updates_into_slot() {
    let client = memory_client().await;
    let slot = Arc::new(RwLock::new(String::new()));

    let _watcher = client.sync_string("/cfg/motd", slot.clone()).unwrap();
    sleep(SETTLE).await;

    client.set_string("/cfg/motd", "hello world").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(*slot.read(), "hello world");

    // the empty string is a legitimate value for a string binding
    client.set_string("/cfg/motd", "").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(*slot.read(), "");

    client.set_string("/cfg/motd", "changed").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(*slot.read(), "changed");
}

#[tokio::test]
async fn json_binding_skips_empty_payload() {
    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Cfg {
        port: u16,
    }

    let client = memory_client().await;
    let slot = Arc::new(RwLock::new(Cfg { port: 8080 }));

    let _watcher = client.sync_json("/cfg/net", slot.clone()).unwrap();
    sleep(SETTLE).await;

    // an empty payload is "nothing to sync yet" for a structured codec
    client.set_raw("/cfg/net", b"").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(slot.read().port, 8080);

    client.set_json("/cfg/net", &Cfg { port: 9090 }).await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(slot.read().port, 9090);
}

#[tokio::test]
async fn sync_watch_reports_changes_to_listener() {
    let client = memory_client().await;
    let slot = Arc::new(RwLock::new(String::new()));
    let listener = Arc::new(RecordingListener::default());

    let _watcher = client
        .sync_watch_string("/cfg/motd", slot.clone(), listener.clone())
        .unwrap();
    sleep(SETTLE).await;

    client.set_string("/cfg/motd", "v1").await.unwrap();
    sleep(SETTLE).await;

    let updates = listener.updates.lock().clone();
    assert!(updates.contains(&("/cfg/motd".to_string(), "v1".to_string())));
}

#[tokio::test]
async fn closed_watcher_stops_mirroring() {
    let client = memory_client().await;
    let slot = Arc::new(RwLock::new(String::new()));

    let watcher = client.sync_string("/cfg/motd", slot.clone()).unwrap();
    sleep(SETTLE).await;

    client.set_string("/cfg/motd", "before").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(*slot.read(), "before");

    watcher.close();
    sleep(SETTLE).await;
    assert_eq!(watcher.state(), WatchState::Exited);

    client.set_string("/cfg/motd", "after").await.unwrap();
    sleep(SETTLE).await;
    assert_eq!(*slot.read(), "before");
}

#[tokio::test]
async fn sync_map_rejects_binding_without_destination() {
    let client = memory_client().await;

    let map: Arc<RwLock<HashMap<String, String>>> = Arc::new(RwLock::new(HashMap::new()));
    let result = client.sync_string_map("", map, false);
    assert!(matches!(result, Err(Error::Bind(BindError::EmptyPath))));
}

#[tokio::test]
async fn sync_map_mirrors_existing_children_at_bind_time() {
    let client = memory_client().await;
    client.set_string("/svc/a", "1").await.unwrap();
    client.set_string("/svc/b", "2").await.unwrap();

    let map = Arc::new(RwLock::new(HashMap::new()));
    let _watcher = client.sync_string_map("/svc", map.clone(), false).unwrap();
    sleep(SETTLE).await;

    let snapshot = map.read().clone();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("a").map(String::as_str), Some("1"));
    assert_eq!(snapshot.get("b").map(String::as_str), Some("2"));
}
