//! # claimcheck-core
//!
//! Deterministic half of the claimcheck fact-checker.
//!
//! This crate turns the free-text reply of a language model into a
//! structured verdict and keeps fabricated evidence away from the user. It
//! never performs I/O; model calls, retrieval and language detection live in
//! `claimcheck-runtime`.
//!
//! ## Key Guarantees
//!
//! 1. **Total**: parsing never fails, malformed replies degrade to `NO_INFO`
//! 2. **Guarded**: a `NO_INFO` verdict never carries evidence
//! 3. **Locale-tolerant**: header spellings come from a declarative table
//!
//! ## Example
//!
//! ```rust
//! use claimcheck_core::{parse_response, VerdictLabel};
//!
//! let raw = "<think>checking...</think>\nVERDICT: TRUE\nEXPLANATION: Confirmed.\nEVIDENCE:\n- \"CO2 rose\" || [SOURCE: Report (url1)]";
//! let result = parse_response(raw);
//!
//! assert_eq!(result.verdict(), VerdictLabel::True);
//! assert_eq!(result.evidence().len(), 1);
//! ```

pub mod context;
pub mod evidence;
pub mod language;
pub mod reasoning;
pub mod response;
pub mod types;

pub use context::{ContextChunk, RetrievedContext, DEFAULT_TITLE, DEFAULT_URL};
pub use evidence::{EvidenceGuardrail, EvidenceItem, QuoteIssue, UngroundedQuote};
pub use language::{LanguageSelector, TargetLanguage};
pub use reasoning::{contains_reasoning, strip_reasoning};
pub use response::{FieldKind, HeaderTable, ResponseParser, DEFAULT_HEADERS, EVIDENCE_SEPARATOR};
pub use types::{VerdictLabel, VerificationResult};

/// Parse a raw model reply with the default header table.
///
/// Reasoning blocks are stripped first, so text straight from an endpoint
/// can be passed in.
pub fn parse_response(raw: &str) -> VerificationResult {
    ResponseParser::new().parse(&strip_reasoning(raw))
}
