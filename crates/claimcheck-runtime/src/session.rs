//! One user's fact-checking session.
//!
//! [`FactChecker::check`] runs the whole pipeline for a claim:
//!
//! 1. detect the claim's language and pick the target language
//! 2. retrieve passages and assemble the context
//! 3. verify the claim against the context
//! 4. audit the quotes against the context
//!
//! [`FactChecker::summarize`] then summarises the same context on demand.
//! Results live in a caller-owned [`SessionState`], so one checker can
//! serve any number of sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use claimcheck_core::{
    EvidenceGuardrail, LanguageSelector, RetrievedContext, TargetLanguage, UngroundedQuote,
    VerificationResult,
};

use crate::config::RuntimeConfig;
use crate::detect::LanguageDetector;
use crate::gateway::GatewayFailure;
use crate::orchestrator::{RuntimeError, VerificationOrchestrator};
use crate::providers::ProviderRegistry;
use crate::retrieval::{retrieve_context, RetrievalError, Retriever};

/// Why a check did not produce a verification.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("claim is empty")]
    EmptyClaim,

    #[error("no relevant passages found for the claim")]
    RetrievalEmpty,

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("no verified claim to summarise")]
    NoActiveVerification,
}

/// Everything shown for the current claim.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The claim as submitted
    pub claim: Option<String>,

    /// Target language chosen for the claim
    pub language: TargetLanguage,

    /// Context the verification was made against
    pub context: Option<RetrievedContext>,

    pub verification: Option<VerificationResult>,

    /// Quotes that could not be found in the context
    pub ungrounded: Vec<UngroundedQuote>,

    /// Set when the model call behind `verification` failed
    pub failure: Option<GatewayFailure>,

    pub summary: Option<String>,

    pub checked_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a verification is on display.
    pub fn has_verification(&self) -> bool {
        self.verification.is_some()
    }

    /// Forget the previous claim and everything derived from it.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The fact-checking pipeline.
pub struct FactChecker {
    orchestrator: VerificationOrchestrator,
    retriever: Arc<dyn Retriever>,
    detector: Arc<dyn LanguageDetector>,
    selector: LanguageSelector,
    top_k: usize,
}

impl FactChecker {
    pub fn new(
        orchestrator: VerificationOrchestrator,
        retriever: Arc<dyn Retriever>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Self {
        Self {
            orchestrator,
            retriever,
            detector,
            selector: LanguageSelector::new(),
            top_k: 3,
        }
    }

    /// Assemble a checker from configuration.
    ///
    /// The provider is created through `registry` using `model.provider`.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
        retriever: Arc<dyn Retriever>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let provider_config = config.provider_config();
        registry.validate(&config.model.provider, &provider_config)?;
        let provider = registry.create(&config.model.provider, &provider_config)?;

        let mut builder = VerificationOrchestrator::builder()
            .provider(provider)
            .options(config.generation_options());
        if let Some(cache) = config.generation_cache() {
            builder = builder.cache(cache);
        }

        Ok(Self::new(builder.build()?, retriever, detector).with_top_k(config.retrieval.top_k))
    }

    /// Passages retrieved per claim.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Verify `claim` and store the outcome in `session`.
    ///
    /// The previous claim's results are cleared first, including when this
    /// check fails. A failed model call is not an error: it yields a
    /// `NO_INFO` verification with `session.failure` set.
    pub async fn check(&self, session: &mut SessionState, claim: &str) -> Result<(), CheckError> {
        session.clear();

        let claim = claim.trim();
        if claim.is_empty() {
            return Err(CheckError::EmptyClaim);
        }

        let language = self.selector.select(self.detector.detect(claim).as_deref());
        tracing::debug!(language = %language, "Target language selected");

        let context = retrieve_context(self.retriever.as_ref(), claim, self.top_k).await?;
        if context.is_empty() {
            tracing::warn!(retriever = self.retriever.name(), "No passages retrieved");
            return Err(CheckError::RetrievalEmpty);
        }

        let rendered = context.render();
        let outcome = self
            .orchestrator
            .verify_detailed(claim, &rendered, language)
            .await;
        let ungrounded = EvidenceGuardrail::audit(&outcome.result, &rendered);

        session.claim = Some(claim.to_string());
        session.language = language;
        session.context = Some(context);
        session.verification = Some(outcome.result);
        session.ungrounded = ungrounded;
        session.failure = outcome.failure;
        session.checked_at = Some(Utc::now());
        Ok(())
    }

    /// Summarise the current claim's context into `session.summary`.
    ///
    /// Uses the claim, context and language stored by the last successful
    /// [`check`](Self::check).
    pub async fn summarize(&self, session: &mut SessionState) -> Result<(), CheckError> {
        let (Some(claim), Some(context), true) = (
            session.claim.as_deref(),
            session.context.as_ref(),
            session.has_verification(),
        ) else {
            return Err(CheckError::NoActiveVerification);
        };

        let summary = self
            .orchestrator
            .summarize(&context.render(), claim, session.language)
            .await;

        session.summary = Some(summary);
        Ok(())
    }
}

impl std::fmt::Debug for FactChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactChecker")
            .field("orchestrator", &self.orchestrator)
            .field("retriever", &self.retriever.name())
            .field("top_k", &self.top_k)
            .finish()
    }
}
