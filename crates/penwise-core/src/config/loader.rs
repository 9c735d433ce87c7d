//! Config loader — reads `~/.penwise/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.penwise/config.json`
//! 3. Environment variables `PENWISE_<SECTION>__<FIELD>` (override JSON)
//! 4. `DEEPSEEK_API_KEY`, only when no key was configured by 1–3

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Well-known credential variable consulted as a last resort.
pub const FALLBACK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `PENWISE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `PENWISE_PROVIDER__API_KEY` → `provider.api_key`
/// - `PENWISE_PROVIDER__API_BASE` → `provider.api_base`
/// - `PENWISE_GENERATION__MODEL` → `generation.model`
/// - `PENWISE_GENERATION__MAX_TOKENS` → `generation.max_tokens`
/// - `PENWISE_GENERATION__TEMPERATURE` → `generation.temperature`
/// - `PENWISE_RETRY__MAX_ATTEMPTS` → `retry.max_attempts`
/// - `PENWISE_RETRY__BASE_BACKOFF_SECS` → `retry.base_backoff_secs`
/// - `PENWISE_RETRY__TIMEOUT_SECS` → `retry.timeout_secs`
/// - `PENWISE_RETRY__MAX_RETRY_AFTER_SECS` → `retry.max_retry_after_secs`
fn apply_env_overrides(mut config: Config) -> Config {
    // Provider
    if let Ok(val) = std::env::var("PENWISE_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("PENWISE_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    // Generation defaults
    if let Ok(val) = std::env::var("PENWISE_GENERATION__MODEL") {
        config.generation.model = val;
    }
    if let Some(n) = env_parse::<u32>("PENWISE_GENERATION__MAX_TOKENS") {
        config.generation.max_tokens = n;
    }
    if let Some(t) = env_parse::<f64>("PENWISE_GENERATION__TEMPERATURE") {
        config.generation.temperature = t;
    }

    // Retry
    if let Some(n) = env_parse::<u32>("PENWISE_RETRY__MAX_ATTEMPTS") {
        config.retry.max_attempts = n;
    }
    if let Some(n) = env_parse::<u64>("PENWISE_RETRY__BASE_BACKOFF_SECS") {
        config.retry.base_backoff_secs = n;
    }
    if let Some(n) = env_parse::<u64>("PENWISE_RETRY__TIMEOUT_SECS") {
        config.retry.timeout_secs = n;
    }
    if let Some(n) = env_parse::<u64>("PENWISE_RETRY__MAX_RETRY_AFTER_SECS") {
        config.retry.max_retry_after_secs = n;
    }

    if !config.provider.is_configured() {
        if let Ok(val) = std::env::var(FALLBACK_API_KEY_ENV) {
            debug!("Using API key from {}", FALLBACK_API_KEY_ENV);
            config.provider.api_key = val;
        }
    }

    config
}

/// Read and parse an env var, ignoring (with a warning) values that don't parse.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
