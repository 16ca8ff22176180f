//! Text-generation providers.
//!
//! This module defines the trait every text-generation backend implements
//! and ships the HTTP provider for `/api/generate`-style endpoints.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "generate-api")]
mod generate;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "generate-api")]
pub use generate::{
    GenerateApiProvider, GenerateApiProviderFactory, DEFAULT_API_URL, LLM_API_KEY_ENV,
    LLM_API_URL_ENV,
};

/// Errors from text-generation providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed (HTTP {0})")]
    AuthError(u16),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Generation settings sent with every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Model to use
    pub model: String,

    /// Temperature (0.0 for deterministic)
    pub temperature: f32,

    /// Context window requested from the endpoint
    pub num_ctx: u32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "qwen3:8b".to_string(),
            temperature: 0.0,
            num_ctx: 8192,
            timeout: Duration::from_secs(120),
        }
    }
}

impl GenerationOptions {
    /// Options for the given model with default settings.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Raw output of one generation call, before any cleaning.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text
    pub text: String,

    /// Model reported by the endpoint, if any
    pub model: Option<String>,

    /// Token usage, when the endpoint reports it
    pub usage: TokenUsage,
}

impl Generation {
    /// A generation carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage from a generation.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Provider abstraction allows swapping text-generation backends.
///
/// Only the [`ModelGateway`](crate::gateway::ModelGateway) calls this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Estimate tokens for a prompt.
    fn estimate_tokens(&self, text: &str) -> u32 {
        // Simple estimate: ~4 chars per token
        (text.len() / 4) as u32
    }
}
