//! Integration with hosted text-generation models.
//!
//! The module defines the `GenericLlmClient` trait that can be implemented
//! for different inference providers, with a default implementation for the
//! Hugging Face inference API.

pub mod huggingface;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{error::InferenceError, types::GenerationParams};

// Traits.

/// Generic LLM client trait that clients must implement.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate text for a fully rendered prompt.
    ///
    /// Makes exactly one call to the remote model. Empty or truncated output
    /// is returned as-is.
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, InferenceError>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
