//! Evidence items and the hallucination guardrail.
//!
//! The model is asked to cite quotes verbatim from the retrieved context.
//! Two rules are applied to what it returns:
//!
//! 1. A `NO_INFO` verdict never carries evidence. This is enforced on every
//!    [`VerificationResult`] at construction time.
//! 2. Quotes that do not occur in the context are reported by
//!    [`EvidenceGuardrail::audit`] so the caller can flag them.

use serde::{Deserialize, Serialize};

use crate::types::{VerdictLabel, VerificationResult};

/// List markers the model puts in front of evidence lines.
const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Quote characters that wrap a cited passage.
const QUOTE_MARKS: &[char] = &['"', '\'', '“', '”', '«', '»', '‘', '’'];

/// A quote cited by the model together with its source label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    quote: String,
    source: String,
}

impl EvidenceItem {
    /// Create an evidence item. Both parts are trimmed.
    pub fn new(quote: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            quote: quote.into().trim().to_string(),
            source: source.into().trim().to_string(),
        }
    }

    /// Build an item from the left side of a `quote || source` line.
    ///
    /// A leading list bullet (`-`, `*`, `•`) is dropped from the quote.
    pub fn from_line_parts(quote: &str, source: &str) -> Self {
        let quote = quote.trim();
        let quote = match quote.strip_prefix(BULLET_MARKERS) {
            Some(rest) if rest.starts_with(char::is_whitespace) => rest,
            _ => quote,
        };
        Self::new(quote, source)
    }

    /// The quote as written by the model, including any quote marks.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// The citation label, usually `[SOURCE: Title (URL)]`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The quote with surrounding quote marks removed.
    pub fn bare_quote(&self) -> &str {
        self.quote.trim_matches(QUOTE_MARKS).trim()
    }
}

/// Why a quote failed the grounding audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteIssue {
    /// Nothing left once quote marks are removed
    Empty,

    /// The passage does not occur in the context
    NotInContext,
}

/// An evidence item whose quote could not be found in the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UngroundedQuote {
    /// Position in the result's evidence list
    pub index: usize,

    pub quote: String,
    pub source: String,
    pub issue: QuoteIssue,
}

/// Post-parse rules that keep fabricated evidence away from the user.
pub struct EvidenceGuardrail;

impl EvidenceGuardrail {
    /// Drop all evidence when the verdict is `NO_INFO`.
    ///
    /// A model that claims the context says nothing must not cite it.
    pub fn screen(verdict: VerdictLabel, evidence: Vec<EvidenceItem>) -> Vec<EvidenceItem> {
        if verdict.is_no_info() && !evidence.is_empty() {
            tracing::debug!(
                discarded = evidence.len(),
                "Discarding evidence attached to NO_INFO verdict"
            );
            return Vec::new();
        }
        evidence
    }

    /// Report quotes that do not appear verbatim in `context`.
    ///
    /// Comparison ignores surrounding quote marks and collapses runs of
    /// whitespace on both sides. The result is left untouched.
    pub fn audit(result: &VerificationResult, context: &str) -> Vec<UngroundedQuote> {
        let haystack = normalize_whitespace(context);

        result
            .evidence()
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let needle = normalize_whitespace(item.bare_quote());
                let issue = if needle.is_empty() {
                    QuoteIssue::Empty
                } else if !haystack.contains(&needle) {
                    QuoteIssue::NotInContext
                } else {
                    return None;
                };

                tracing::warn!(index, ?issue, source = item.source(), "Ungrounded evidence quote");
                Some(UngroundedQuote {
                    index,
                    quote: item.quote().to_string(),
                    source: item.source().to_string(),
                    issue,
                })
            })
            .collect()
    }
}

/// Normalize whitespace for quote comparison.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
