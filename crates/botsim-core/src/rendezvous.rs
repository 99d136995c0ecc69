//! Single-use handoff points between the mock server and waiting sessions.
//!
//! [`PendingViews`] correlates a trigger id minted for one user action with
//! the modal the application opens in answer to it. [`HomeChannels`] carries
//! home-tab publishes, which have no request to correlate with, to whichever
//! session of that user waits next.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::error::{BotsimError, Result};
use crate::view::View;

type Slots = Arc<Mutex<HashMap<String, oneshot::Sender<View>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trigger id → one-shot sender for the modal answering it.
#[derive(Debug, Clone, Default)]
pub struct PendingViews {
    slots: Slots,
}

impl PendingViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a trigger id and registers a slot for it.
    pub fn register(&self) -> (String, ViewWaiter) {
        let trigger_id = format!(
            "{}.{}",
            chrono::Utc::now().timestamp(),
            Uuid::new_v4().simple()
        );
        let (tx, rx) = oneshot::channel();
        lock(&self.slots).insert(trigger_id.clone(), tx);
        tracing::debug!(%trigger_id, "registered pending view");

        let waiter = ViewWaiter {
            trigger_id: trigger_id.clone(),
            rx: Some(rx),
            slots: self.slots.clone(),
        };
        (trigger_id, waiter)
    }

    /// Delivers `view` to the waiter of `trigger_id`.
    ///
    /// Returns false when nothing is registered (unknown, already resolved,
    /// or the waiter gave up). Never blocks.
    pub fn resolve(&self, trigger_id: &str, view: View) -> bool {
        let Some(tx) = lock(&self.slots).remove(trigger_id) else {
            tracing::warn!(%trigger_id, "no pending view for trigger");
            return false;
        };
        tx.send(view).is_ok()
    }

    pub fn is_pending(&self, trigger_id: &str) -> bool {
        lock(&self.slots).contains_key(trigger_id)
    }

    pub fn pending(&self) -> usize {
        lock(&self.slots).len()
    }
}

/// Receiving end of one registration. Dropping it discards the slot.
#[derive(Debug)]
pub struct ViewWaiter {
    trigger_id: String,
    rx: Option<oneshot::Receiver<View>>,
    slots: Slots,
}

impl ViewWaiter {
    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }

    /// Waits up to `timeout` for the view.
    pub async fn wait(mut self, timeout: Duration) -> Result<View> {
        let Some(rx) = self.rx.take() else {
            return Err(BotsimError::internal("view waiter polled twice"));
        };
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(view)) => Ok(view),
            Ok(Err(_)) => Err(BotsimError::internal(format!(
                "pending view for trigger {} was dropped",
                self.trigger_id
            ))),
            Err(_) => Err(BotsimError::timeout(
                format!("modal for trigger {}", self.trigger_id),
                timeout,
            )),
        }
    }
}

impl Drop for ViewWaiter {
    fn drop(&mut self) {
        lock(&self.slots).remove(&self.trigger_id);
    }
}

type HomeQueue = (
    mpsc::UnboundedSender<View>,
    Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<View>>>,
);

/// User id → queue of published home views.
#[derive(Debug, Clone, Default)]
pub struct HomeChannels {
    queues: Arc<Mutex<HashMap<String, HomeQueue>>>,
}

impl HomeChannels {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, user_id: &str) -> HomeQueue {
        lock(&self.queues)
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                (tx, Arc::new(tokio::sync::Mutex::new(rx)))
            })
            .clone()
    }

    /// Queues a home view for `user_id`. Never blocks.
    pub fn publish(&self, user_id: &str, view: View) {
        let (tx, _) = self.queue(user_id);
        // the receiver lives in the same map entry, so the send cannot fail
        let _ = tx.send(view);
    }

    pub fn subscribe(&self, user_id: &str) -> HomeReceiver {
        let (_, rx) = self.queue(user_id);
        HomeReceiver {
            user_id: user_id.to_string(),
            rx,
        }
    }
}

/// A session's handle on its user's home queue.
#[derive(Debug, Clone)]
pub struct HomeReceiver {
    user_id: String,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<View>>>,
}

impl HomeReceiver {
    /// Waits up to `timeout` for the next published view.
    pub async fn recv(&self, timeout: Duration) -> Result<View> {
        let waited_on = || format!("home view for {}", self.user_id);
        let received = tokio::time::timeout(timeout, async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        })
        .await
        .map_err(|_| BotsimError::timeout(waited_on(), timeout))?;

        received.ok_or_else(|| BotsimError::internal(format!("{} closed", waited_on())))
    }

    /// Discards views published before now; returns how many were dropped.
    pub async fn drain_stale(&self) -> usize {
        let mut rx = self.rx.lock().await;
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(user_id = %self.user_id, dropped, "discarded stale home views");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_delivers_once() {
        let pending = PendingViews::new();
        let (trigger_id, waiter) = pending.register();
        assert!(pending.is_pending(&trigger_id));

        assert!(pending.resolve(&trigger_id, View::modal("First", Vec::new())));
        assert!(!pending.resolve(&trigger_id, View::modal("Second", Vec::new())));

        let view = waiter.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(view.title_text(), Some("First"));
        assert_eq!(pending.pending(), 0);
    }

    #[tokio::test]
    async fn test_unknown_trigger_is_not_an_error() {
        let pending = PendingViews::new();
        assert!(!pending.resolve("1.unknown", View::default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_and_discards_slot() {
        let pending = PendingViews::new();
        let (trigger_id, waiter) = pending.register();

        let err = waiter.wait(Duration::from_secs(5)).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains(&trigger_id));
        assert!(!pending.is_pending(&trigger_id));
        assert!(!pending.resolve(&trigger_id, View::default()));
    }

    #[tokio::test]
    async fn test_resolve_from_another_task() {
        let pending = PendingViews::new();
        let (trigger_id, waiter) = pending.register();

        let server_side = pending.clone();
        tokio::spawn(async move {
            server_side.resolve(&trigger_id, View::modal("Later", Vec::new()));
        });

        let view = waiter.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(view.title_text(), Some("Later"));
    }

    #[tokio::test]
    async fn test_trigger_ids_are_unique() {
        let pending = PendingViews::new();
        let (a, _wa) = pending.register();
        let (b, _wb) = pending.register();
        assert_ne!(a, b);
        assert_eq!(pending.pending(), 2);
    }

    #[tokio::test]
    async fn test_home_publish_before_subscribe_is_kept() {
        let home = HomeChannels::new();
        home.publish("u1", View::home(Vec::new()).with_private_metadata("one"));

        let rx = home.subscribe("u1");
        let view = rx.recv(Duration::from_secs(1)).await.unwrap();
        assert_eq!(view.private_metadata, "one");
    }

    #[tokio::test]
    async fn test_drain_stale_drops_queued_views() {
        let home = HomeChannels::new();
        let rx = home.subscribe("u1");
        home.publish("u1", View::home(Vec::new()));
        home.publish("u1", View::home(Vec::new()));

        assert_eq!(rx.drain_stale().await, 2);
        home.publish("u1", View::home(Vec::new()).with_private_metadata("fresh"));
        assert_eq!(rx.recv(Duration::from_secs(1)).await.unwrap().private_metadata, "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_recv_times_out() {
        let home = HomeChannels::new();
        let err = home
            .subscribe("u2")
            .recv(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("u2"));
    }

    #[tokio::test]
    async fn test_home_queues_are_per_user() {
        let home = HomeChannels::new();
        home.publish("u1", View::home(Vec::new()));
        assert_eq!(home.subscribe("u2").drain_stale().await, 0);
        assert_eq!(home.subscribe("u1").drain_stale().await, 1);
    }
}
