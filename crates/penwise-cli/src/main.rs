//! Penwise CLI — entry point.
//!
//! # Commands
//!
//! - `penwise generate -m MESSAGE` — one free-form reply
//! - `penwise chat` — interactive REPL over `generate`
//! - `penwise outline TOPIC` / `improve` / `summarize` / `tags` — derived content
//! - `penwise complete --prompt P` — continue writing
//! - `penwise init` — write a default config
//! - `penwise status` — show configuration

mod helpers;
mod init;
mod repl;
mod status;
mod tasks;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use penwise_assist::assistant::{DEFAULT_SUMMARY_LENGTH, DEFAULT_TAG_COUNT};
use penwise_assist::WritingAssistant;
use penwise_core::config::load_config;

use crate::helpers::ContentInput;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ✒️ Penwise — AI writing assistant for technical articles
#[derive(Parser)]
#[command(name = "penwise", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Generate {
        /// The prompt text
        #[arg(short, long)]
        message: String,

        /// Token budget for the reply
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Interactive chat (each line is one `generate` call)
    Chat,

    /// Generate an article outline
    Outline {
        /// Article topic
        topic: String,

        /// 专业 | 通俗 | 学术 | 简洁 (or professional | popular | academic | concise)
        #[arg(short, long, default_value = "专业")]
        style: String,

        /// Print JSON instead of a tree
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Rewrite content and rate it
    Improve {
        #[command(flatten)]
        input: ContentInput,

        /// grammar | style | expand
        #[arg(short, long, default_value = "style")]
        kind: String,

        /// Print JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Summarize content
    Summarize {
        #[command(flatten)]
        input: ContentInput,

        /// Maximum summary length in characters (50–500)
        #[arg(long, default_value_t = DEFAULT_SUMMARY_LENGTH)]
        max_length: usize,
    },

    /// Suggest tags for content
    Tags {
        #[command(flatten)]
        input: ContentInput,

        /// Number of tags
        #[arg(short, long, default_value_t = DEFAULT_TAG_COUNT)]
        count: usize,

        /// Print JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Continue writing from a prompt
    Complete {
        /// What to write next
        #[arg(short, long)]
        prompt: String,

        /// Preceding article text
        #[arg(short, long, default_value = "")]
        context: String,
    },

    /// Write a default config file
    Init,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Init => init::run(),
        Commands::Status => status::run(),
        Commands::Chat => repl::run(build_assistant()?).await,
        Commands::Generate {
            message,
            max_tokens,
        } => {
            let (assistant, cancel) = prepare()?;
            tasks::generate(&assistant, &message, max_tokens, &cancel).await
        }
        Commands::Outline { topic, style, json } => {
            let (assistant, cancel) = prepare()?;
            tasks::outline(&assistant, &topic, &style, json, &cancel).await
        }
        Commands::Improve { input, kind, json } => {
            let content = input.read()?;
            let (assistant, cancel) = prepare()?;
            tasks::improve(&assistant, &content, &kind, json, &cancel).await
        }
        Commands::Summarize { input, max_length } => {
            let content = input.read()?;
            let (assistant, cancel) = prepare()?;
            tasks::summarize(&assistant, &content, max_length, &cancel).await
        }
        Commands::Tags { input, count, json } => {
            let content = input.read()?;
            let (assistant, cancel) = prepare()?;
            tasks::tags(&assistant, &content, count, json, &cancel).await
        }
        Commands::Complete { prompt, context } => {
            let (assistant, cancel) = prepare()?;
            tasks::complete(&assistant, &prompt, &context, &cancel).await
        }
    }
}

/// Assistant plus a Ctrl-C cancellation token for a one-shot command.
fn prepare() -> Result<(WritingAssistant, CancellationToken)> {
    Ok((build_assistant()?, cancel_on_ctrl_c()))
}

/// Build the assistant from `~/.penwise/config.json` + env.
fn build_assistant() -> Result<WritingAssistant> {
    let config = load_config(None);
    WritingAssistant::from_config(&config).context("failed to create writing assistant")
}

/// A token that is cancelled when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received, cancelling");
            child.cancel();
        }
    });
    token
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("penwise=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
