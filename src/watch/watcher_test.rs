use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use super::*;
use crate::notification_pair;
use crate::Client;
use crate::EventKind;
use crate::MemoryBackend;
use crate::Result;
use crate::SessionState;
use crate::StoreError;
use crate::WatchEvent;
use crate::WatchNotification;
use crate::WatchTrigger;

enum Step {
    /// Hand out a notification the test fires through `triggers`
    Notify,
    Exit,
    Recoverable,
    Fatal,
}

#[derive(Default)]
struct ScriptedHandler {
    steps: Mutex<VecDeque<Step>>,
    triggers: Mutex<Vec<WatchTrigger>>,
    calls: AtomicUsize,
    last_prior: Mutex<Option<WatchEvent>>,
}

impl ScriptedHandler {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fire(
        &self,
        event: WatchEvent,
    ) {
        let trigger = self.triggers.lock().pop().expect("no armed notification");
        let _ = trigger.send(event);
    }
}

#[async_trait]
impl WatchHandler for ScriptedHandler {
    fn path(&self) -> &str {
        "/scripted"
    }

    async fn handle(
        &self,
        _watcher: &Watcher,
        prior: Option<&WatchEvent>,
    ) -> Result<Option<WatchNotification>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prior.lock() = prior.cloned();
        match self.steps.lock().pop_front() {
            Some(Step::Notify) => {
                let (trigger, notification) = notification_pair();
                self.triggers.lock().push(trigger);
                Ok(Some(notification))
            }
            Some(Step::Exit) | None => Ok(None),
            Some(Step::Recoverable) => Err(StoreError::SessionExpired.into()),
            Some(Step::Fatal) => Err(StoreError::Internal("boom".into()).into()),
        }
    }
}

async fn idle_client() -> Client {
    Client::builder(Arc::new(MemoryBackend::new()))
        .maintenance_interval(Duration::from_secs(3600))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn handler_returning_none_exits_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Exit]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(handler.calls(), 1);
    assert_eq!(client.dead_watcher_count(), 0);
}

#[tokio::test]
async fn recoverable_error_parks_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Recoverable]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Parked);
    assert_eq!(client.dead_watcher_count(), 1);
}

#[tokio::test]
async fn fatal_error_exits_without_parking() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Fatal]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(client.dead_watcher_count(), 0);
}

#[tokio::test]
async fn fired_event_becomes_prior_of_next_round() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Notify, Step::Exit]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(handler.calls(), 1);

    handler.fire(WatchEvent::node(EventKind::NodeDataChanged, "/scripted"));
    sleep(Duration::from_millis(50)).await;

    assert_eq!(handler.calls(), 2);
    let prior = handler.last_prior.lock().clone().unwrap();
    assert_eq!(prior.kind, EventKind::NodeDataChanged);
    assert_eq!(watcher.state(), WatchState::Exited);
}

#[tokio::test]
async fn close_unblocks_waiting_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Notify, Step::Notify]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    watcher.close();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn client_close_stops_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Notify, Step::Notify]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    client.close().await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn dead_session_event_parks_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Notify]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    handler.fire(WatchEvent::session(SessionState::Expired));
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Parked);
    assert_eq!(client.dead_watcher_count(), 1);
}

#[tokio::test]
async fn dropped_notification_parks_loop() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Notify]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;

    // drop the sender without firing, as a torn-down session would
    handler.triggers.lock().clear();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(watcher.state(), WatchState::Parked);
    assert_eq!(client.dead_watcher_count(), 1);
}

#[tokio::test]
async fn maintenance_task_revives_parked_loop() {
    let client = Client::builder(Arc::new(MemoryBackend::new()))
        .maintenance_interval(Duration::from_millis(50))
        .build()
        .await
        .unwrap();
    let handler = ScriptedHandler::new(vec![Step::Recoverable, Step::Exit]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(200)).await;

    // revived with no prior event, then exited on the second round
    assert_eq!(handler.calls(), 2);
    assert!(handler.last_prior.lock().is_none());
    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(client.dead_watcher_count(), 0);
}

#[tokio::test]
async fn parked_loop_is_not_revived_after_client_close() {
    let client = idle_client().await;
    let handler = ScriptedHandler::new(vec![Step::Recoverable, Step::Exit]);
    let watcher = Watcher::new(client.clone(), handler.clone());

    watcher.watch();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(watcher.state(), WatchState::Parked);

    client.close().await;
    assert_eq!(watcher.state(), WatchState::Exited);
    assert_eq!(client.dead_watcher_count(), 0);

    // a manual restart attempt is a no-op once closed
    watcher.watch();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(handler.calls(), 1);
}
