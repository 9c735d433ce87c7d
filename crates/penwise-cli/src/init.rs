//! `penwise init` — write a default configuration file.
//!
//! Creates `~/.penwise/config.json` with defaults (never overwrites) and the
//! history directory used by `penwise chat`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use penwise_core::config::{get_config_path, save_config, Config};
use penwise_core::utils::get_data_path;

/// Run the init command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "✒️  Penwise — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Add your provider.apiKey, then run `penwise chat`.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
