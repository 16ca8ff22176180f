//! Verdict and verification record types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::evidence::{EvidenceGuardrail, EvidenceItem};

/// The tri-state judgment about a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    /// The context supports the claim
    True,

    /// The context contradicts the claim
    False,

    /// The context does not cover the claim
    #[default]
    NoInfo,
}

impl VerdictLabel {
    /// Wire label, as written in the prompt template.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::True => "TRUE",
            VerdictLabel::False => "FALSE",
            VerdictLabel::NoInfo => "NO_INFO",
        }
    }

    pub fn is_no_info(&self) -> bool {
        matches!(self, VerdictLabel::NoInfo)
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured verification record.
///
/// Fields are private so the record cannot be changed after construction:
/// every instance goes through [`VerificationResult::new`], which applies
/// the [`EvidenceGuardrail`]. A `NO_INFO` verdict therefore never carries
/// evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    verdict: VerdictLabel,
    explanation: String,
    evidence: Vec<EvidenceItem>,
}

impl VerificationResult {
    /// Build a record, discarding evidence when the verdict is `NO_INFO`.
    pub fn new(
        verdict: VerdictLabel,
        explanation: impl Into<String>,
        evidence: Vec<EvidenceItem>,
    ) -> Self {
        Self {
            verdict,
            explanation: explanation.into(),
            evidence: EvidenceGuardrail::screen(verdict, evidence),
        }
    }

    /// The full-default record: `NO_INFO`, empty explanation, no evidence.
    pub fn no_info() -> Self {
        Self::new(VerdictLabel::NoInfo, String::new(), Vec::new())
    }

    pub fn verdict(&self) -> VerdictLabel {
        self.verdict
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }

    /// True when the model gave a TRUE/FALSE verdict without citing quotes.
    pub fn is_uncited(&self) -> bool {
        !self.verdict.is_no_info() && self.evidence.is_empty()
    }
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self::no_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_info() {
        let result = VerificationResult::default();
        assert_eq!(result.verdict(), VerdictLabel::NoInfo);
        assert_eq!(result.explanation(), "");
        assert!(result.evidence().is_empty());
    }

    #[test]
    fn test_constructor_strips_evidence_for_no_info() {
        let result = VerificationResult::new(
            VerdictLabel::NoInfo,
            "Not covered.",
            vec![EvidenceItem::new("\"fabricated\"", "[SOURCE: x]")],
        );
        assert!(result.evidence().is_empty());
        assert_eq!(result.explanation(), "Not covered.");
    }

    #[test]
    fn test_uncited_verdict() {
        let result = VerificationResult::new(VerdictLabel::True, "Yes.", vec![]);
        assert!(result.is_uncited());
        assert!(!VerificationResult::no_info().is_uncited());
    }

    #[test]
    fn test_verdict_serializes_as_wire_label() {
        let json = serde_json::to_string(&VerdictLabel::NoInfo).unwrap();
        assert_eq!(json, "\"NO_INFO\"");
        assert_eq!(VerdictLabel::False.to_string(), "FALSE");
    }
}
