//! Runs checks and prints their outcome in the selected format.

use anyhow::Result;

use claimcheck_runtime::{CheckError, FactChecker, SessionState};

use crate::commands::OutputFormat;
use crate::display::Display;
use crate::report::CheckReport;

pub struct Runner<'a> {
    checker: &'a FactChecker,
    display: &'a Display,
    format: OutputFormat,
}

impl<'a> Runner<'a> {
    pub fn new(checker: &'a FactChecker, display: &'a Display, format: OutputFormat) -> Self {
        Self {
            checker,
            display,
            format,
        }
    }

    /// Check a claim. Nothing is printed on success; call
    /// [`emit`](Self::emit) afterwards.
    ///
    /// Returns whether a verification was produced. An empty claim or an
    /// empty retrieval is reported and yields `false`; other retrieval
    /// failures are errors.
    pub async fn check(&self, session: &mut SessionState, claim: &str) -> Result<bool> {
        let spinner = self.spinner("Verifying claim...");
        let outcome = self.checker.check(session, claim).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match outcome {
            Ok(()) => Ok(true),
            Err(CheckError::EmptyClaim) => {
                self.display.print_warning("Please enter a claim to verify.");
                Ok(false)
            }
            Err(CheckError::RetrievalEmpty) => {
                self.display
                    .print_warning("No relevant information found in the indexed documents.");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Summarise the current claim's passages into `session.summary`.
    pub async fn summarize(&self, session: &mut SessionState) -> Result<bool> {
        let spinner = self.spinner("Summarising passages...");
        let outcome = self.checker.summarize(session).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match outcome {
            Ok(()) => Ok(true),
            Err(CheckError::NoActiveVerification) => {
                self.display.print_warning("Verify a claim before asking for a summary.");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Print the whole session.
    pub fn emit(&self, session: &SessionState) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.display.print_session(session),
            OutputFormat::Json => println!("{}", CheckReport::from_session(session).to_json()?),
        }
        Ok(())
    }

    /// Print only the summary in text mode, the whole session in JSON.
    pub fn emit_summary(&self, session: &SessionState) -> Result<()> {
        match (self.format, &session.summary) {
            (OutputFormat::Text, Some(summary)) => self.display.print_summary(summary),
            (OutputFormat::Text, None) => {}
            (OutputFormat::Json, _) => self.emit(session)?,
        }
        Ok(())
    }

    fn spinner(&self, message: &str) -> Option<indicatif::ProgressBar> {
        (self.format == OutputFormat::Text).then(|| self.display.create_spinner(message))
    }
}
