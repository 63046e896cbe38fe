//! Library root for `mention-bot`.
//!
//! Two Slack bots share this crate. Each listens for @-mentions, acknowledges
//! them, fills the user's text into its fixed prompt template, asks a hosted
//! model for a completion, and posts the result back to the channel:
//! - The email bot drafts email replies
//! - The essay bot writes persuasive essays
//!
//! The bot integrates with Slack for chat and the Hugging Face inference API
//! for generation. The architecture is built around extensible traits that
//! allow for different implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with LLM and chat clients
/// - Serves the bot's event endpoint until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting the {} bot ...", config.bot);

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
