//! Runtime services and shared state for the mention bots.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio_util::task::TaskTracker;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, LLM client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
    /// Per-channel reply ordering.
    pub channel_locks: ChannelLocks,
    /// In-flight mention responders.
    pub tasks: TaskTracker,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::huggingface(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self::with_clients(config, llm, chat))
    }

    /// Create a runtime from already constructed clients.
    pub fn with_clients(config: Config, llm: LlmClient, chat: ChatClient) -> Self {
        Self {
            config,
            llm,
            chat,
            channel_locks: ChannelLocks::default(),
            tasks: TaskTracker::new(),
        }
    }

    pub async fn start(&self) -> Void {
        self.chat.start(self.clone()).await
    }

    /// Stop accepting responders and wait for the running ones to finish.
    pub async fn drain(&self) {
        self.tasks.close();

        if !self.tasks.is_empty() {
            info!("Waiting for {} in-flight mention(s) ...", self.tasks.len());
        }

        self.tasks.wait().await;
    }
}

/// One async lock per channel.
///
/// A mention holds its channel's lock from acknowledgment to final reply, so
/// the replies of two mentions in the same channel never interleave.
#[derive(Clone, Default)]
pub struct ChannelLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ChannelLocks {
    /// Wait for exclusive use of a channel.
    pub async fn lock(&self, channel_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

            // Drop locks nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            locks.entry(channel_id.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    /// Number of channels with a held or awaited lock.
    #[cfg(test)]
    fn active_channels(&self) -> usize {
        let locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_channel_is_exclusive() {
        let locks = ChannelLocks::default();

        let guard = locks.lock("C1").await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.lock("C1")).await;
        assert!(waiting.is_err(), "second lock on the same channel should wait");

        drop(guard);

        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("C1")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_channels_are_independent() {
        let locks = ChannelLocks::default();

        let _first = locks.lock("C1").await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock("C2")).await;

        assert!(second.is_ok());
        assert_eq!(locks.active_channels(), 2);
    }

    #[tokio::test]
    async fn test_released_channels_are_pruned() {
        let locks = ChannelLocks::default();

        drop(locks.lock("C1").await);
        drop(locks.lock("C2").await);
        let _held = locks.lock("C3").await;

        assert_eq!(locks.active_channels(), 1);
        assert_eq!(locks.inner.lock().unwrap().len(), 1);
    }
}
