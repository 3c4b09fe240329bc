//! Keel CLI - Main entry point

mod replay;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keel_foundation::{CompactionStrategy, ContextConfig, TokenizerFactory, TokenizerType};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::replay::{ReplayOptions, Replayer};

/// Keel - inspect how the context manager handles an agent transcript
#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level when RUST_LOG is not set (logs go to stderr)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSONL transcript (one message per line)
    Replay {
        /// Transcript file
        transcript: PathBuf,

        /// Context config file (.json or .toml); defaults to global + project context.json
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compact with this strategy after the replay (aggressive, balanced, conservative)
        #[arg(short, long)]
        strategy: Option<CompactionStrategy>,

        /// Run threshold-driven maintenance after every message
        #[arg(long)]
        auto: bool,

        /// Produce a full summary at the end
        #[arg(long)]
        summarize: bool,

        /// Session id to use instead of a generated one
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Estimate the token cost of a file
    Estimate {
        file: PathBuf,

        /// Estimator (characters, language_aware)
        #[arg(short, long, default_value = "characters")]
        tokenizer: TokenizerType,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match args.command {
        Command::Replay {
            transcript,
            config,
            strategy,
            auto,
            summarize,
            session_id,
        } => {
            let config = load_config(config.as_deref())?;
            let options = ReplayOptions {
                session_id,
                strategy,
                auto,
                summarize,
            };
            let report = Replayer::new(&config, options)?
                .run_file(&transcript)
                .await
                .with_context(|| format!("Failed to replay {}", transcript.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Estimate { file, tokenizer } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = TokenizerFactory::create(tokenizer)?.count(&text);
            println!("{}", serde_json::to_string_pretty(&count)?);
        }
    }

    Ok(())
}

/// Explicit file, else layered global/project config, else defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<ContextConfig> {
    match path {
        Some(path) => ContextConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ContextConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}", e);
            ContextConfig::default()
        })),
    }
}
