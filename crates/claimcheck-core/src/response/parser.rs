//! Line-oriented parser for verification replies.

use crate::evidence::EvidenceItem;
use crate::types::{VerdictLabel, VerificationResult};

use super::headers::{FieldKind, HeaderTable, DEFAULT_HEADERS};

/// Separator between quote and source on an evidence line.
pub const EVIDENCE_SEPARATOR: &str = "||";

/// Which section subsequent free lines belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseMode {
    None,
    Explanation,
    Evidence,
}

/// Turns raw model text into a [`VerificationResult`].
///
/// Parsing never fails. Lines the parser does not understand are skipped and
/// missing fields keep their defaults, so a reply with no recognisable
/// header yields `NO_INFO` with an empty explanation.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    headers: HeaderTable,
}

impl ResponseParser {
    /// Parser using the default English/Spanish header table.
    pub fn new() -> Self {
        Self {
            headers: DEFAULT_HEADERS.clone(),
        }
    }

    /// Parser using a custom header table.
    pub fn with_headers(headers: HeaderTable) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Parse a reply.
    ///
    /// The evidence guardrail runs as the last step: a `NO_INFO` verdict
    /// comes back without evidence even if evidence lines were present.
    pub fn parse(&self, raw: &str) -> VerificationResult {
        let mut verdict = VerdictLabel::NoInfo;
        let mut explanation = String::new();
        let mut evidence = Vec::new();
        let mut mode = ParseMode::None;

        for line in raw.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            let upper = line.to_uppercase();

            match self.headers.match_header(&upper) {
                Some(FieldKind::Verdict) => {
                    verdict = self.headers.classify_verdict(value_after_colon(line));
                }
                Some(FieldKind::Explanation) => {
                    explanation = value_after_colon(line).to_string();
                    mode = ParseMode::Explanation;
                }
                Some(FieldKind::Evidence) => {
                    mode = ParseMode::Evidence;
                }
                None => match mode {
                    ParseMode::Evidence if line.contains(EVIDENCE_SEPARATOR) => {
                        let mut parts = line.split(EVIDENCE_SEPARATOR);
                        if let (Some(quote), Some(source)) = (parts.next(), parts.next()) {
                            evidence.push(EvidenceItem::from_line_parts(quote, source));
                        }
                    }
                    ParseMode::Explanation
                        if !self.headers.starts_with_word(FieldKind::Evidence, &upper) =>
                    {
                        if !explanation.is_empty() {
                            explanation.push(' ');
                        }
                        explanation.push_str(line);
                    }
                    _ => {}
                },
            }
        }

        tracing::debug!(
            verdict = %verdict,
            evidence = evidence.len(),
            explanation_chars = explanation.chars().count(),
            "Parsed verification reply"
        );

        VerificationResult::new(verdict, explanation, evidence)
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything after the first ':' of a header line, trimmed.
///
/// A value containing ':' is cut at the first one only.
fn value_after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("")
}
