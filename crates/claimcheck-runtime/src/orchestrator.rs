//! Verification and summary over a retrieved context.
//!
//! # Flow
//!
//! ```text
//! claim + context + language
//!         │
//!         ▼
//!   verification prompt ──► ModelGateway ──► ResponseParser ──► VerificationResult
//! ```
//!
//! Nothing in this path returns an error. A failed model call reaches the
//! parser as `"Error: ..."` text and comes out as `NO_INFO` with empty
//! evidence; [`VerificationOutcome::failure`] keeps the cause for display.

use std::sync::Arc;
use thiserror::Error;

use claimcheck_core::{
    HeaderTable, ResponseParser, TargetLanguage, VerificationResult, DEFAULT_HEADERS,
};

use crate::cache::GenerationCache;
use crate::config::ConfigError;
use crate::gateway::{GatewayFailure, GatewayReply, ModelGateway};
use crate::prompts::{summary_prompt, verification_prompt};
use crate::providers::{GenerationOptions, LlmProvider, ProviderError};
use crate::retrieval::RetrievalError;

/// Errors while assembling the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

/// A verification together with the gateway failure behind it, if any.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub result: VerificationResult,
    pub failure: Option<GatewayFailure>,
}

/// Builds prompts, calls the gateway and parses the reply.
#[derive(Debug, Clone)]
pub struct VerificationOrchestrator {
    gateway: ModelGateway,
    parser: ResponseParser,
}

impl VerificationOrchestrator {
    pub fn new(gateway: ModelGateway, parser: ResponseParser) -> Self {
        Self { gateway, parser }
    }

    pub fn builder() -> VerificationOrchestratorBuilder {
        VerificationOrchestratorBuilder::new()
    }

    /// Verify a claim against a rendered context.
    pub async fn verify(
        &self,
        claim: &str,
        context: &str,
        language: TargetLanguage,
    ) -> VerificationResult {
        self.verify_detailed(claim, context, language).await.result
    }

    /// Like [`verify`](Self::verify), also reporting a failed model call.
    pub async fn verify_detailed(
        &self,
        claim: &str,
        context: &str,
        language: TargetLanguage,
    ) -> VerificationOutcome {
        let prompt = verification_prompt(context, claim, language, self.parser.headers());
        let reply = self.gateway.generate(&prompt).await;

        let result = self.parser.parse(&reply.text());
        tracing::info!(
            verdict = %result.verdict(),
            evidence = result.evidence().len(),
            language = %language,
            "Claim verified"
        );

        VerificationOutcome {
            result,
            failure: reply.failure().cloned(),
        }
    }

    /// Summarise the context with respect to the claim.
    ///
    /// A failed call yields the `"Error: ..."` text.
    pub async fn summarize(&self, context: &str, claim: &str, language: TargetLanguage) -> String {
        self.summarize_reply(context, claim, language)
            .await
            .into_text()
    }

    /// Like [`summarize`](Self::summarize), keeping the reply variant.
    pub async fn summarize_reply(
        &self,
        context: &str,
        claim: &str,
        language: TargetLanguage,
    ) -> GatewayReply {
        let prompt = summary_prompt(context, claim, language);
        self.gateway.generate(&prompt).await
    }
}

/// Builder for [`VerificationOrchestrator`].
pub struct VerificationOrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    options: GenerationOptions,
    headers: HeaderTable,
    cache: Option<GenerationCache>,
}

impl VerificationOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            options: GenerationOptions::default(),
            headers: DEFAULT_HEADERS.clone(),
            cache: None,
        }
    }

    /// Set the text-generation provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the generation options.
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Header table shared by the prompt and the parser.
    pub fn headers(mut self, headers: HeaderTable) -> Self {
        self.headers = headers;
        self
    }

    /// Enable the reply cache.
    pub fn cache(mut self, cache: GenerationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<VerificationOrchestrator, RuntimeError> {
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No provider set".to_string()))?;

        let mut gateway = ModelGateway::new(provider, self.options);
        if let Some(cache) = self.cache {
            gateway = gateway.with_cache(cache);
        }

        Ok(VerificationOrchestrator::new(
            gateway,
            ResponseParser::with_headers(self.headers),
        ))
    }
}

impl Default for VerificationOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
