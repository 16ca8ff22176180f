//! Target-language selection.
//!
//! The claim's detected language decides which language the model writes
//! its explanation and summary in. Detection is a best-effort collaborator:
//! an unknown code or a failed detection falls back to a fixed default and
//! never surfaces as an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Languages the prompts can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetLanguage {
    Spanish,
    English,
    French,
    Portuguese,
    German,
    Italian,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 6] = [
        TargetLanguage::Spanish,
        TargetLanguage::English,
        TargetLanguage::French,
        TargetLanguage::Portuguese,
        TargetLanguage::German,
        TargetLanguage::Italian,
    ];

    /// Label embedded in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            TargetLanguage::Spanish => "SPANISH",
            TargetLanguage::English => "ENGLISH",
            TargetLanguage::French => "FRENCH",
            TargetLanguage::Portuguese => "PORTUGUESE",
            TargetLanguage::German => "GERMAN",
            TargetLanguage::Italian => "ITALIAN",
        }
    }

    /// ISO 639-1 code.
    pub fn iso_code(&self) -> &'static str {
        match self {
            TargetLanguage::Spanish => "es",
            TargetLanguage::English => "en",
            TargetLanguage::French => "fr",
            TargetLanguage::Portuguese => "pt",
            TargetLanguage::German => "de",
            TargetLanguage::Italian => "it",
        }
    }
}

impl Default for TargetLanguage {
    fn default() -> Self {
        TargetLanguage::English
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps detected ISO codes to target languages.
#[derive(Debug, Clone)]
pub struct LanguageSelector {
    table: BTreeMap<String, TargetLanguage>,
    fallback: TargetLanguage,
}

impl LanguageSelector {
    /// Selector covering every [`TargetLanguage`], falling back to English.
    pub fn new() -> Self {
        let table = TargetLanguage::ALL
            .iter()
            .map(|lang| (lang.iso_code().to_string(), *lang))
            .collect();

        Self {
            table,
            fallback: TargetLanguage::default(),
        }
    }

    /// Resolve a detection outcome to a language.
    ///
    /// Detection errors are logged and resolved to the fallback.
    pub fn select<E: fmt::Display>(&self, detected: Result<&str, E>) -> TargetLanguage {
        match detected {
            Ok(code) => self.select_code(code),
            Err(e) => {
                tracing::debug!(error = %e, fallback = %self.fallback, "Language detection failed");
                self.fallback
            }
        }
    }

    /// Resolve an ISO code to a language.
    ///
    /// Codes are matched case-insensitively and a region suffix is ignored,
    /// so `pt-BR` selects Portuguese.
    pub fn select_code(&self, code: &str) -> TargetLanguage {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();

        match self.table.get(&primary) {
            Some(lang) => *lang,
            None => {
                tracing::debug!(code, fallback = %self.fallback, "Unmapped language code");
                self.fallback
            }
        }
    }
}

impl Default for LanguageSelector {
    fn default() -> Self {
        Self::new()
    }
}
