//! Interactive chat REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Turns are independent: each line is one `generate` call.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use penwise_assist::WritingAssistant;
use penwise_providers::GenerationError;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop.
pub async fn run(assistant: WritingAssistant) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }
        let _ = editor.add_history_entry(&input);

        debug!(chars = trimmed.chars().count(), "processing input");
        helpers::print_thinking();

        // Ctrl-C during a turn cancels that turn only.
        let cancel = CancellationToken::new();
        let reply = tokio::select! {
            reply = assistant.generate(trimmed, None, &cancel) => reply,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                Err(GenerationError::Cancelled)
            }
        };
        helpers::clear_thinking();

        match reply {
            Ok(response) => helpers::print_response(&response),
            Err(GenerationError::Cancelled) => println!("\n(cancelled)\n"),
            Err(e) => eprintln!("\n❌ Error: {e}\n"),
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded chat history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// `~/.penwise/history/chat_history`
fn history_path() -> std::path::PathBuf {
    penwise_core::utils::get_data_path()
        .join("history")
        .join("chat_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}
