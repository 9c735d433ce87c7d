//! Shared CLI helpers — content input, path expansion, response printing.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

/// Article text for the content commands: `--text`, `--file`, or stdin.
#[derive(Args, Debug, Default)]
pub struct ContentInput {
    /// Content passed inline
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read content from a file (`-` for stdin)
    #[arg(short, long)]
    pub file: Option<String>,
}

impl ContentInput {
    /// Resolve the content. With neither flag, stdin is read.
    pub fn read(&self) -> Result<String> {
        let content = match (&self.text, self.file.as_deref()) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) if path != "-" => {
                let path = expand_tilde(path);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?
            }
            (None, _) => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };
        if content.trim().is_empty() {
            bail!("no content given (use --text, --file, or pipe into stdin)");
        }
        Ok(content)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a generated reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "✒️  Penwise".cyan().bold());
    if response.trim().is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "✒️  Penwise".cyan().bold(), version.dimmed());
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder on stderr.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}
