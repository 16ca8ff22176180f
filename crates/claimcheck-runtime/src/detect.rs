//! Language detection for claims.
//!
//! Detectors report an ISO 639-1 code. Mapping that code to a prompt
//! language, and falling back when detection fails, is the job of
//! [`LanguageSelector`](claimcheck_core::LanguageSelector).

use thiserror::Error;
use whatlang::Lang;

/// Why no language could be reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("text is empty")]
    EmptyText,

    #[error("no language could be detected")]
    Undetectable,
}

/// Identifies the language of a text.
pub trait LanguageDetector: Send + Sync {
    /// ISO 639-1 code of the text's language, e.g. `"es"`.
    fn detect(&self, text: &str) -> Result<String, DetectionError>;
}

/// Trigram detector backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        if text.trim().is_empty() {
            return Err(DetectionError::EmptyText);
        }

        let info = whatlang::detect(text).ok_or(DetectionError::Undetectable)?;
        tracing::debug!(
            lang = info.lang().code(),
            confidence = info.confidence(),
            reliable = info.is_reliable(),
            "Language detected"
        );

        Ok(iso_639_1(info.lang()).to_string())
    }
}

/// Two-letter code for the languages prompts can target; other languages
/// keep their three-letter code, which the selector treats as unmapped.
fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Spa => "es",
        Lang::Eng => "en",
        Lang::Fra => "fr",
        Lang::Por => "pt",
        Lang::Deu => "de",
        Lang::Ita => "it",
        other => other.code(),
    }
}
