//! edgecommit - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::prelude::*;

use edgecommit::commit::TiktokenCounter;
use edgecommit::llm::{CompletionBackend, OpenAiBackend};
use edgecommit::pipeline::{self, Collaborators, Outcome, TerminalPrompter};
use edgecommit::{Config, GitRepository, LlmError, PipelineError};

/// AI-powered git commit message generator.
#[derive(Parser, Debug)]
#[command(name = "edgecommit")]
#[command(about = "AI-powered git commit message generator")]
#[command(version)]
struct Cli {
    /// Show commit message without creating commit
    #[arg(short = 'd', long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(PipelineError::Interrupted) => eprintln!("\nℹ Interrupted by user"),
                Some(err) => eprintln!("✗ {}", err),
                None => eprintln!("✗ {}: {}", e, e.root_cause()),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::from_env().map_err(PipelineError::from)?;
    let tokens = TiktokenCounter::for_model(&config.model)
        .context("Failed to load the tokenizer")?;
    let repo = GitRepository::open(".")
        .context("Failed to open the git repository in the current directory")?;

    let deps = Collaborators {
        vcs: &repo,
        tokens: &tokens,
        prompter: &TerminalPrompter,
        connect: &connect_openai,
    };

    Ok(pipeline::run(&config, &deps, cli.dry_run).await?)
}

fn connect_openai(config: &Config) -> Result<Box<dyn CompletionBackend>, LlmError> {
    Ok(Box::new(OpenAiBackend::from_config(config)?))
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "edgecommit=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
