//! `penwise status` — show configuration and credential status.

use anyhow::Result;
use colored::Colorize;

use penwise_core::config::loader::FALLBACK_API_KEY_ENV;
use penwise_core::config::{get_config_path, load_config, Config};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "✒️  Penwise Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Endpoint:".bold(), config.provider.api_base());
    println!("  {:<18} {}", "Model:".bold(), config.generation.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.generation.temperature).dimmed(),
        format!("{}", config.generation.max_tokens).dimmed(),
    );
    println!(
        "  {:<18} {}",
        "Retry:".bold(),
        retry_summary(&config).dimmed()
    );

    println!();
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!(
            "{} set provider.apiKey or {}",
            "· not configured".red(),
            FALLBACK_API_KEY_ENV
        )
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);
    println!();

    Ok(())
}

fn retry_summary(config: &Config) -> String {
    let retry = &config.retry;
    format!(
        "{} attempts, backoff {}s×2^n, timeout {}s",
        retry.max_attempts, retry.base_backoff_secs, retry.timeout_secs
    )
}
