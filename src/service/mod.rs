//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the bots:
//! - Chat services (e.g., Slack)
//! - LLM services (e.g., the Hugging Face inference API)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod llm;
