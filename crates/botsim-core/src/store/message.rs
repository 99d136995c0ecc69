//! Chat messages posted by the application.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::block::Block;
use crate::error::{BotsimError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mutable part of a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageContent {
    pub blocks: Vec<Block>,
    pub text: String,
}

/// One posted message, identified by `(channel, ts)`.
#[derive(Debug)]
pub struct MessageRecord {
    channel: String,
    ts: String,
    content: Mutex<MessageContent>,
    updated: Notify,
}

impl MessageRecord {
    fn new(channel: String, ts: String, content: MessageContent) -> Self {
        Self {
            channel,
            ts,
            content: Mutex::new(content),
            updated: Notify::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn ts(&self) -> &str {
        &self.ts
    }

    pub fn content(&self) -> MessageContent {
        lock(&self.content).clone()
    }

    pub fn blocks(&self) -> Vec<Block> {
        lock(&self.content).blocks.clone()
    }

    /// Replaces the content and signals one waiter.
    ///
    /// With nobody waiting the signal is kept for the next waiter; repeated
    /// updates before that collapse into one.
    pub fn replace(&self, content: MessageContent) {
        *lock(&self.content) = content;
        self.updated.notify_one();
    }

    /// Waits up to `timeout` for the next `replace`.
    pub async fn wait_update(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.updated.notified())
            .await
            .map_err(|_| {
                BotsimError::timeout(format!("message {} in {}", self.ts, self.channel), timeout)
            })
    }
}

#[derive(Debug, Default)]
struct Inner {
    channels: HashMap<String, Vec<Arc<MessageRecord>>>,
    last_micros: i64,
}

/// Messages by channel, in posting order.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    inner: Arc<Mutex<Inner>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new message and assigns its timestamp.
    ///
    /// Timestamps are `"<secs>.<micros>"` and strictly increase across the
    /// store, so they are unique within any channel.
    pub fn post(&self, channel: &str, content: MessageContent) -> Arc<MessageRecord> {
        let mut inner = lock(&self.inner);
        let micros = chrono::Utc::now()
            .timestamp_micros()
            .max(inner.last_micros + 1);
        inner.last_micros = micros;
        let ts = format!("{}.{:06}", micros / 1_000_000, micros % 1_000_000);

        let record = Arc::new(MessageRecord::new(channel.to_string(), ts, content));
        inner
            .channels
            .entry(channel.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    pub fn find(&self, channel: &str, ts: &str) -> Option<Arc<MessageRecord>> {
        lock(&self.inner)
            .channels
            .get(channel)?
            .iter()
            .find(|record| record.ts == ts)
            .cloned()
    }

    /// Replaces the content of `(channel, ts)`; `None` when no such message exists.
    pub fn update(
        &self,
        channel: &str,
        ts: &str,
        content: MessageContent,
    ) -> Option<Arc<MessageRecord>> {
        let record = self.find(channel, ts)?;
        record.replace(content);
        Some(record)
    }

    pub fn list(&self, channel: &str) -> Vec<Arc<MessageRecord>> {
        lock(&self.inner)
            .channels
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, channel: &str) -> usize {
        lock(&self.inner)
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }
}
