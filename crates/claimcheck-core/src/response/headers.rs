//! Declarative header table for model replies.
//!
//! The verification prompt asks the model for three labelled fields. Models
//! answering in the claim's language sometimes translate the labels, so each
//! field accepts several spellings. Adding a locale means adding prefixes
//! here; the parser's control flow does not change.
//!
//! The first prefix of each field is the canonical one and is what the
//! prompt template prints, which keeps the two in sync.

use lazy_static::lazy_static;

use crate::types::VerdictLabel;

/// The labelled fields of a verification reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Verdict,
    Explanation,
    Evidence,
}

/// Accepted header prefixes and verdict keywords.
///
/// All entries are stored upper-case and matched against the upper-cased
/// line.
#[derive(Debug, Clone)]
pub struct HeaderTable {
    headers: Vec<(FieldKind, Vec<String>)>,
    affirmative: Vec<String>,
    negative: Vec<String>,
}

lazy_static! {
    /// English plus Spanish spellings.
    pub static ref DEFAULT_HEADERS: HeaderTable = HeaderTable::bilingual();
}

impl HeaderTable {
    /// An empty table. Useful as a base for custom locales.
    pub fn empty() -> Self {
        Self {
            headers: vec![
                (FieldKind::Verdict, Vec::new()),
                (FieldKind::Explanation, Vec::new()),
                (FieldKind::Evidence, Vec::new()),
            ],
            affirmative: Vec::new(),
            negative: Vec::new(),
        }
    }

    /// English headers with Spanish alternates.
    pub fn bilingual() -> Self {
        Self::empty()
            .with_header(FieldKind::Verdict, "VERDICT:")
            .with_header(FieldKind::Verdict, "VEREDICTO:")
            .with_header(FieldKind::Explanation, "EXPLANATION:")
            .with_header(FieldKind::Explanation, "EXPLICACIÓN:")
            .with_header(FieldKind::Evidence, "EVIDENCE:")
            .with_header(FieldKind::Evidence, "EVIDENCIAS:")
            .with_verdict_keyword(VerdictLabel::True, "TRUE")
            .with_verdict_keyword(VerdictLabel::True, "VERDADERO")
            .with_verdict_keyword(VerdictLabel::False, "FALSE")
            .with_verdict_keyword(VerdictLabel::False, "FALSO")
    }

    /// Accept another header prefix for a field.
    ///
    /// The prefix should include its trailing colon.
    pub fn with_header(mut self, kind: FieldKind, prefix: &str) -> Self {
        let prefix = prefix.to_uppercase();
        if let Some((_, prefixes)) = self.headers.iter_mut().find(|(k, _)| *k == kind) {
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }
        self
    }

    /// Accept another verdict keyword.
    ///
    /// Keywords for `NO_INFO` are ignored: anything unrecognised already
    /// resolves to `NO_INFO`.
    pub fn with_verdict_keyword(mut self, label: VerdictLabel, keyword: &str) -> Self {
        let keyword = keyword.to_uppercase();
        match label {
            VerdictLabel::True => self.affirmative.push(keyword),
            VerdictLabel::False => self.negative.push(keyword),
            VerdictLabel::NoInfo => {}
        }
        self
    }

    /// Which field header, if any, the line starts with.
    ///
    /// `upper_line` must already be upper-cased. Fields are checked in
    /// verdict, explanation, evidence order.
    pub fn match_header(&self, upper_line: &str) -> Option<FieldKind> {
        self.headers
            .iter()
            .find(|(_, prefixes)| prefixes.iter().any(|p| upper_line.starts_with(p.as_str())))
            .map(|(kind, _)| *kind)
    }

    /// Whether the line starts with the bare header word of `kind`.
    ///
    /// Unlike [`match_header`](Self::match_header) the colon is not
    /// required, so `EVIDENCE - none` counts.
    pub fn starts_with_word(&self, kind: FieldKind, upper_line: &str) -> bool {
        self.prefixes(kind)
            .iter()
            .any(|p| upper_line.starts_with(p.trim_end_matches(':')))
    }

    /// Map a verdict value to a label.
    ///
    /// Affirmative keywords win over negative ones; anything else is
    /// `NO_INFO`.
    pub fn classify_verdict(&self, value: &str) -> VerdictLabel {
        let value = value.trim().to_uppercase();
        if self.affirmative.iter().any(|k| value.contains(k.as_str())) {
            VerdictLabel::True
        } else if self.negative.iter().any(|k| value.contains(k.as_str())) {
            VerdictLabel::False
        } else {
            VerdictLabel::NoInfo
        }
    }

    /// All accepted prefixes for a field.
    pub fn prefixes(&self, kind: FieldKind) -> &[String] {
        self.headers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, prefixes)| prefixes.as_slice())
            .unwrap_or(&[])
    }

    /// The canonical prefix printed in the prompt template.
    pub fn canonical(&self, kind: FieldKind) -> &str {
        self.prefixes(kind).first().map(String::as_str).unwrap_or("")
    }
}

impl Default for HeaderTable {
    fn default() -> Self {
        Self::bilingual()
    }
}
