//! Event handling and user interactions for the mention bots.
//!
//! This module provides functionality for handling inbound events:
//! - Routing parsed event deliveries (only mentions are acted on)
//! - Responding to @-mentions: acknowledge, generate, reply

pub mod dispatch;
pub mod mention;
