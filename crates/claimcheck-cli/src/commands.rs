use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "claimcheck")]
#[command(author, version, about = "Verify claims against an indexed document collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a YAML config file
    #[arg(short, long, global = true, env = "CLAIMCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model name (overrides config and LLM_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Generate endpoint URL (overrides config and LLM_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Passages retrieved per claim
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Skip TLS certificate verification for the model endpoint
    #[arg(long, global = true)]
    pub insecure: bool,
}

/// Output format for results.
/// - Text: coloured, human-readable (default)
/// - Json: one JSON object per result
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify a single claim
    Verify {
        /// The claim, in any language
        claim: String,

        /// Also summarise the retrieved passages
        #[arg(long)]
        summary: bool,

        /// JSON file of passages to use instead of the search service
        #[arg(long)]
        context_file: Option<PathBuf>,
    },

    /// Verify claims one after another from a prompt
    Interactive {
        /// JSON file of passages to use instead of the search service
        #[arg(long)]
        context_file: Option<PathBuf>,
    },

    /// Parse a raw model reply without calling any service
    Parse {
        /// File holding the reply (default: stdin)
        file: Option<PathBuf>,
    },
}
