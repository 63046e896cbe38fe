//! Core components, types, and utilities for the mention bots.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Per-bot profiles (template, sampling parameters, failure policy, HTTP surface).
//! - Prompt templates and their rendering.
//! - Common types, errors, and result handling.

pub mod config;
pub mod error;
pub mod profile;
pub mod prompts;
pub mod types;
