//! Retrying invoker — bounded attempts with exponential backoff around a
//! [`Transport`].
//!
//! Per attempt:
//! - success → return the text
//! - terminal failure (4xx other than 429) → [`GenerationError::UpstreamRejection`], no retry
//! - retryable failure → wait `base * 2^attempt` (or the server's `Retry-After`,
//!   whichever is longer, capped) and try again
//!
//! After `max_attempts` retryable failures the last one is wrapped in
//! [`GenerationError::TransientTransport`]. There is no jitter, so the wait
//! schedule is deterministic (1s, 2s, 4s, … with the defaults).

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use penwise_core::config::RetryConfig;
use penwise_core::types::GenerationRequest;

use crate::error::{Disposition, GenerationError, TransportError};
use crate::traits::Transport;

// ─────────────────────────────────────────────
// Policy
// ─────────────────────────────────────────────

/// Attempt budget and backoff schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Never less than 1.
    pub max_attempts: u32,
    /// Wait after the first failed attempt; doubles for each further attempt.
    pub base_backoff: Duration,
    /// Ceiling for a server-requested `Retry-After` wait.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_secs(config.base_backoff_secs),
            max_retry_after: Duration::from_secs(config.max_retry_after_secs),
        }
    }
}

impl RetryPolicy {
    /// Backoff after the 0-based `attempt` failed: `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor)
    }

    /// Actual wait after `attempt` failed with `error`.
    fn wait_for(&self, attempt: u32, error: &TransportError) -> Duration {
        let backoff = self.backoff(attempt);
        match error.retry_after() {
            Some(requested) => backoff.max(requested.min(self.max_retry_after)),
            None => backoff,
        }
    }
}

// ─────────────────────────────────────────────
// Invoker
// ─────────────────────────────────────────────

/// Progress of one invocation. Lives only inside [`RetryingInvoker::invoke`].
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    last_error: Option<TransportError>,
}

/// Wraps a [`Transport`] with bounded retry, backoff, and failure classification.
///
/// Holds no per-call state, so one invoker can serve concurrent calls.
#[derive(Clone)]
pub struct RetryingInvoker {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingInvoker")
            .field("transport", &self.transport.display_name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RetryingInvoker {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Run `request` until it succeeds, fails terminally, runs out of
    /// attempts, or `cancel` fires.
    pub async fn invoke(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if !self.transport.is_configured() {
            return Err(GenerationError::Configuration(format!(
                "no API key configured for {}",
                self.transport.display_name()
            )));
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::default();

        while state.attempt < max_attempts {
            let attempt = state.attempt;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                result = self.transport.send(request) => result,
            };

            let error = match outcome {
                Ok(text) => {
                    info!(attempt, max_attempts, outcome = "success", "completion attempt");
                    return Ok(text);
                }
                Err(e) => e,
            };

            if error.disposition() == Disposition::Terminal {
                warn!(
                    attempt,
                    max_attempts,
                    outcome = "terminal",
                    error_kind = error.kind(),
                    error = %error,
                    "completion attempt"
                );
                return Err(match error {
                    TransportError::Status { status, body, .. } => {
                        GenerationError::UpstreamRejection { status, body }
                    }
                    // Only client-error statuses are terminal today.
                    other => GenerationError::TransientTransport {
                        attempts: attempt + 1,
                        last_error: other,
                    },
                });
            }

            state.attempt += 1;
            if state.attempt >= max_attempts {
                warn!(
                    attempt,
                    max_attempts,
                    outcome = "exhausted",
                    error_kind = error.kind(),
                    error = %error,
                    "completion attempt"
                );
                state.last_error = Some(error);
                break;
            }

            let wait = self.policy.wait_for(attempt, &error);
            warn!(
                attempt,
                max_attempts,
                outcome = "retry",
                error_kind = error.kind(),
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "completion attempt"
            );
            state.last_error = Some(error);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }

        Err(GenerationError::TransientTransport {
            attempts: state.attempt,
            last_error: state
                .last_error
                .unwrap_or_else(|| TransportError::Other("no attempt was made".to_string())),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
