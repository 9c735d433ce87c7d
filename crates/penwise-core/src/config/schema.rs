//! Configuration schema — typed config for the writing assistant.
//!
//! Hierarchy: `Config` → `ProviderConfig`, `GenerationDefaults`, `RetryConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default completion endpoint base.
pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com/v1";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.penwise/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub generation: GenerationDefaults,
    pub retry: RetryConfig,
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Credentials and endpoint of the upstream completion API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides [`DEFAULT_API_BASE`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether an API key has been configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The effective API base (config value or the default endpoint).
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE)
    }
}

// ─────────────────────────────────────────────
// Generation defaults
// ─────────────────────────────────────────────

/// Model parameters applied to every request unless a task overrides them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDefaults {
    /// Model identifier sent in the request body.
    pub model: String,
    /// Token budget used when the caller does not pass one.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

// ─────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────

/// Bounded-retry settings for the generation invoker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Total attempts per invocation (first try included).
    pub max_attempts: u32,
    /// Base of the exponential backoff: the wait after attempt `n` is `base * 2^n`.
    pub base_backoff_secs: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Upper bound for a server-supplied `Retry-After` wait.
    pub max_retry_after_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_secs: 1,
            timeout_secs: 60,
            max_retry_after_secs: 30,
        }
    }
}

impl RetryConfig {
    /// Per-request timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
