//! # claimcheck-runtime
//!
//! I/O half of the claimcheck fact-checker: model calls, similarity search,
//! language detection, configuration, and the session pipeline tying them
//! to the parser in `claimcheck-core`.
//!
//! ## Architecture
//!
//! ```text
//! claim ──► LanguageDetector ──► LanguageSelector ──► target language
//!   │
//!   └─────► Retriever ──► RetrievedContext
//!                              │
//!                              ▼
//!           VerificationOrchestrator ──► ModelGateway ──► LlmProvider
//!                              │
//!                              ▼
//!                     ResponseParser ──► VerificationResult
//! ```
//!
//! ## Features
//!
//! - `generate-api` (default): HTTP provider for `/api/generate` endpoints
//! - `http-retriever` (default): HTTP similarity-search client

pub mod cache;
pub mod config;
pub mod detect;
pub mod gateway;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod session;

#[cfg(test)]
mod test_support;

pub use cache::{CacheKey, GenerationCache};
pub use config::{CacheConfig, ConfigError, ModelConfig, RetrievalConfig, RuntimeConfig};
pub use detect::{DetectionError, LanguageDetector, WhatlangDetector};
pub use gateway::{GatewayFailure, GatewayReply, ModelGateway};
pub use orchestrator::{
    RuntimeError, VerificationOrchestrator, VerificationOrchestratorBuilder, VerificationOutcome,
};
pub use providers::{
    ApiCredential, CredentialSource, Generation, GenerationOptions, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, TokenUsage,
};
pub use retrieval::{retrieve_context, RetrievalError, RetrievedNode, Retriever, StaticRetriever};
pub use session::{CheckError, FactChecker, SessionState};

#[cfg(feature = "generate-api")]
pub use providers::GenerateApiProvider;

#[cfg(feature = "http-retriever")]
pub use retrieval::HttpRetriever;
