use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use claimcheck_core::parse_response;
use claimcheck_runtime::{
    FactChecker, HttpRetriever, ProviderRegistry, Retriever, RuntimeConfig, SessionState,
    StaticRetriever, WhatlangDetector,
};

mod commands;
mod display;
mod interactive;
mod report;
mod runner;

use commands::{Cli, Commands, OutputFormat};
use display::Display;
use interactive::InteractiveLoop;
use runner::Runner;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            Display::new().print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("claimcheck=debug,claimcheck_runtime=debug,claimcheck_core=debug")
        } else {
            EnvFilter::new("claimcheck=info,claimcheck_runtime=info,claimcheck_core=info")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Returns `false` when the command ran but produced no verdict.
async fn run(cli: Cli) -> Result<bool> {
    let display = Display::new();

    match &cli.command {
        Commands::Parse { file } => cmd_parse(file.as_deref(), cli.format, &display),
        Commands::Verify {
            claim,
            summary,
            context_file,
        } => {
            let checker = build_checker(&cli, context_file.as_deref())?;
            let runner = Runner::new(&checker, &display, cli.format);
            let mut session = SessionState::new();

            if !runner.check(&mut session, claim).await? {
                return Ok(false);
            }
            if *summary {
                runner.summarize(&mut session).await?;
            }
            runner.emit(&session)?;
            Ok(session.failure.is_none())
        }
        Commands::Interactive { context_file } => {
            let checker = build_checker(&cli, context_file.as_deref())?;
            let runner = Runner::new(&checker, &display, cli.format);
            InteractiveLoop::new(runner).run().await?;
            Ok(true)
        }
    }
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("loading {}", path.display()),
        None => "loading default configuration".to_string(),
    })?;

    if let Some(model) = &cli.model {
        config.model.name = Some(model.clone());
    }
    if let Some(url) = &cli.api_url {
        config.model.api_url = Some(url.clone());
    }
    if let Some(top_k) = cli.top_k {
        config.retrieval.top_k = top_k;
    }
    if cli.insecure {
        config.model.accept_invalid_certs = true;
    }

    config.validate()?;
    Ok(config)
}

fn build_checker(cli: &Cli, context_file: Option<&Path>) -> Result<FactChecker> {
    let config = load_config(cli)?;

    let retriever: Arc<dyn Retriever> = match context_file {
        Some(path) => {
            let retriever = StaticRetriever::from_json_file(path)?;
            tracing::info!(passages = retriever.len(), path = %path.display(), "Using local passages");
            Arc::new(retriever)
        }
        None if config.retrieval.endpoint.is_some() => {
            Arc::new(HttpRetriever::from_config(&config.retrieval)?)
        }
        None => bail!(
            "no passage source: pass --context-file, set retrieval.endpoint in the config, or set RETRIEVAL_URL"
        ),
    };

    let checker = FactChecker::from_config(
        &config,
        &ProviderRegistry::with_defaults(),
        retriever,
        Arc::new(WhatlangDetector::new()),
    )?;
    Ok(checker)
}

fn cmd_parse(file: Option<&Path>, format: OutputFormat, display: &Display) -> Result<bool> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let result = parse_response(&raw);
    match format {
        OutputFormat::Text => display.print_verification(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(true)
}
