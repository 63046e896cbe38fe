pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::{error::PlatformError, types::{OutboundReply, Void}},
    runtime::Runtime,
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the mention bots.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start receiving platform events.
    ///
    /// Serves the bot's event endpoint until shutdown, dispatching every
    /// delivery against the given runtime.
    async fn start(&self, runtime: Runtime) -> Void;

    /// Post a message to a channel.
    async fn send_message(&self, reply: &OutboundReply) -> Result<(), PlatformError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
