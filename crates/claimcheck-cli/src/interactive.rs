//! Prompt loop: one claim per line, `:summary` for the current claim.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use claimcheck_runtime::SessionState;

use crate::runner::Runner;

/// One line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Claim(&'a str),
    Summary,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }

        match line.strip_prefix(':') {
            Some("summary" | "s") => Input::Summary,
            Some("help" | "h" | "?") => Input::Help,
            Some("quit" | "q" | "exit") => Input::Quit,
            Some(other) => Input::Unknown(other),
            None => Input::Claim(line),
        }
    }
}

pub struct InteractiveLoop<'a> {
    runner: Runner<'a>,
}

impl<'a> InteractiveLoop<'a> {
    pub fn new(runner: Runner<'a>) -> Self {
        Self { runner }
    }

    pub async fn run(&self) -> Result<()> {
        self.show_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut session = SessionState::new();

        loop {
            print!("{}", style("claim> ").cyan().bold());
            io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match Input::parse(&line) {
                Input::Empty => continue,
                Input::Quit => break,
                Input::Help => self.show_help(),
                Input::Summary => {
                    if self.runner.summarize(&mut session).await? {
                        self.runner.emit_summary(&session)?;
                    }
                }
                Input::Claim(claim) => match self.runner.check(&mut session, claim).await {
                    Ok(true) => self.runner.emit(&session)?,
                    Ok(false) => {}
                    Err(e) => eprintln!("{} {:#}", style("✗").red().bold(), e),
                },
                Input::Unknown(command) => {
                    println!(
                        "{}",
                        style(format!("Unknown command ':{}', try :help", command)).red()
                    );
                }
            }
        }

        Ok(())
    }

    fn show_help(&self) {
        println!();
        println!("{}", style("Enter a claim in any language to verify it.").bold());
        println!("  {}  summarise the passages behind the last verdict", style(":summary").cyan());
        println!("  {}     show this help", style(":help").cyan());
        println!("  {}     leave", style(":quit").cyan());
        println!();
    }
}
