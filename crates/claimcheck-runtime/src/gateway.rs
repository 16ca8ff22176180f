//! The single point through which prompts reach a model.
//!
//! The gateway never returns an error. Transport failures, timeouts and
//! bad replies all come back as [`GatewayReply::Failure`], whose text form
//! (`"Error: ..."`) is what downstream parsing sees. Successful replies have
//! reasoning blocks removed before anyone else reads them.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use claimcheck_core::{contains_reasoning, strip_reasoning};

use crate::cache::{CacheKey, GenerationCache};
use crate::providers::{GenerationOptions, LlmProvider};

/// Outcome of one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayReply {
    /// Cleaned model output.
    Answer(String),
    /// The call did not produce output.
    Failure(GatewayFailure),
}

impl GatewayReply {
    /// The text handed downstream: the answer, or `"Error: <detail>"`.
    pub fn text(&self) -> String {
        match self {
            GatewayReply::Answer(text) => text.clone(),
            GatewayReply::Failure(failure) => failure.to_string(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GatewayReply::Answer(text) => text,
            GatewayReply::Failure(failure) => failure.to_string(),
        }
    }

    pub fn failure(&self) -> Option<&GatewayFailure> {
        match self {
            GatewayReply::Failure(failure) => Some(failure),
            GatewayReply::Answer(_) => None,
        }
    }
}

/// Why a model call produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayFailure {
    /// Provider that was called
    pub provider: String,
    /// Human-readable detail
    pub detail: String,
}

impl fmt::Display for GatewayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.detail)
    }
}

/// Sends prompts to a provider with fixed generation options.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    cache: Option<GenerationCache>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            options,
            cache: None,
        }
    }

    /// Reuse replies for identical prompts.
    pub fn with_cache(mut self, cache: GenerationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Send one prompt and return the cleaned reply.
    pub async fn generate(&self, prompt: &str) -> GatewayReply {
        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(prompt, &self.options));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key).await {
                tracing::debug!(model = %self.options.model, "Reply served from cache");
                return GatewayReply::Answer(hit);
            }
        }

        let estimated = self.provider.estimate_tokens(prompt);
        if estimated > self.options.num_ctx {
            tracing::warn!(
                estimated_tokens = estimated,
                num_ctx = self.options.num_ctx,
                "Prompt may not fit the context window"
            );
        }

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.options.timeout,
            self.provider.generate(prompt, &self.options),
        )
        .await;

        let generation = match outcome {
            Ok(Ok(generation)) => generation,
            Ok(Err(e)) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "Model call failed");
                return self.failure(e.to_string());
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout = ?self.options.timeout,
                    "Model call timed out"
                );
                return self.failure(format!("Timeout after {:?}", self.options.timeout));
            }
        };

        let cleaned = strip_reasoning(&generation.text);
        tracing::debug!(
            provider = self.provider.name(),
            model = generation.model.as_deref().unwrap_or(&self.options.model),
            elapsed_ms = started.elapsed().as_millis() as u64,
            tokens = generation.usage.total(),
            reasoning_stripped = contains_reasoning(&generation.text),
            "Model replied"
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, cleaned.clone()).await;
        }

        GatewayReply::Answer(cleaned)
    }

    fn failure(&self, detail: String) -> GatewayReply {
        GatewayReply::Failure(GatewayFailure {
            provider: self.provider.name().to_string(),
            detail,
        })
    }
}

impl fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelGateway")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
