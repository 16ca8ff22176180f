use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};

use claimcheck_core::{QuoteIssue, VerdictLabel, VerificationResult};
use claimcheck_runtime::SessionState;

pub struct Display;

impl Display {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", style(text).bold().cyan());
        println!("{}", style("═".repeat(60)).dim());
    }

    /// Everything known about the current claim.
    pub fn print_session(&self, session: &SessionState) {
        if let Some(failure) = &session.failure {
            self.print_error(&format!("Model call failed: {}", failure.detail));
        }

        if let Some(result) = &session.verification {
            self.print_verification(result);
        }

        for issue in &session.ungrounded {
            let reason = match issue.issue {
                QuoteIssue::Empty => "is empty",
                QuoteIssue::NotInContext => "was not found in the retrieved passages",
            };
            self.print_warning(&format!("Quote {} {}", issue.index + 1, reason));
        }

        if let Some(context) = &session.context {
            println!();
            println!("{}", style("Sources:").bold());
            for chunk in context.chunks() {
                println!("  {}", style(chunk.source_tag()).dim());
            }
        }

        if let Some(summary) = &session.summary {
            self.print_summary(summary);
        }
    }

    pub fn print_verification(&self, result: &VerificationResult) {
        self.print_header("Verdict");

        let verdict = result.verdict();
        match verdict {
            VerdictLabel::True => println!("{}", style("✓ TRUE").green().bold()),
            VerdictLabel::False => println!("{}", style("✗ FALSE").red().bold()),
            VerdictLabel::NoInfo => self.print_warning(
                "Insufficient information in the indexed documents to verify this claim.",
            ),
        }

        if !result.explanation().is_empty() {
            println!();
            println!("{}", result.explanation());
        }

        if result.is_uncited() {
            println!();
            self.print_info("The model did not cite exact quotes for this verdict.");
        }

        if !result.evidence().is_empty() {
            println!();
            println!("{}", style("Evidence:").bold());
            for (i, item) in result.evidence().iter().enumerate() {
                println!(
                    "  {} {}",
                    self.verdict_style(verdict).apply_to(format!("{}.", i + 1)),
                    style(item.quote()).italic()
                );
                if !item.source().is_empty() {
                    println!("     {}", style(item.source()).dim());
                }
            }
        }
    }

    pub fn print_summary(&self, summary: &str) {
        self.print_header("Summary");
        println!("{}", summary);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", style("!").yellow().bold(), message);
    }

    pub fn print_info(&self, message: &str) {
        println!("{} {}", style("→").cyan(), message);
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("static template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }

    fn verdict_style(&self, verdict: VerdictLabel) -> Style {
        match verdict {
            VerdictLabel::True => Style::new().green(),
            VerdictLabel::False => Style::new().red(),
            VerdictLabel::NoInfo => Style::new().dim(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
