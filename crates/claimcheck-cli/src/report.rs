//! JSON view of a session, for `--format json`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use claimcheck_core::{ContextChunk, TargetLanguage, UngroundedQuote, VerificationResult};
use claimcheck_runtime::SessionState;

#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub claim: Option<&'a str>,
    pub language: TargetLanguage,
    #[serde(flatten)]
    pub result: Option<&'a VerificationResult>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub ungrounded: &'a [UngroundedQuote],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a str>,
    pub sources: &'a [ContextChunk],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl<'a> CheckReport<'a> {
    pub fn from_session(session: &'a SessionState) -> Self {
        Self {
            claim: session.claim.as_deref(),
            language: session.language,
            result: session.verification.as_ref(),
            ungrounded: &session.ungrounded,
            error: session.failure.as_ref().map(|f| f.to_string()),
            summary: session.summary.as_deref(),
            sources: session
                .context
                .as_ref()
                .map(|c| c.chunks())
                .unwrap_or(&[]),
            checked_at: session.checked_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
