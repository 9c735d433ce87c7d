//! Error types for the generation pipeline.
//!
//! Two layers:
//! - [`TransportError`] — why one attempt failed. Carries its own
//!   [`Disposition`] so the invoker never has to inspect message text.
//! - [`GenerationError`] — the terminal outcome of a whole invocation.

use std::time::Duration;

use thiserror::Error;

/// Whether a failed attempt may be retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Retryable,
    Terminal,
}

/// A single failed exchange with the completion endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
        /// Server-requested wait from a `Retry-After` header.
        retry_after: Option<Duration>,
    },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("unexpected transport failure: {0}")]
    Other(String),
}

impl TransportError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        TransportError::Status {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Classify the failure.
    ///
    /// Only client errors (4xx) are terminal, and 429 is the exception to that:
    /// rate limiting is transient. Everything else, including unexpected
    /// failures, is retried.
    pub fn disposition(&self) -> Disposition {
        match self {
            TransportError::Status { status, .. } if *status == 429 => Disposition::Retryable,
            TransportError::Status { status, .. } if (400..500).contains(status) => {
                Disposition::Terminal
            }
            _ => Disposition::Retryable,
        }
    }

    /// Wait requested by the server, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TransportError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Connection(_) => "connection",
            TransportError::Status { .. } => "status",
            TransportError::Malformed(_) => "malformed",
            TransportError::Other(_) => "other",
        }
    }
}

/// Terminal outcome of an invocation, as seen by callers.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing or invalid credential/configuration. Raised before any attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller passed input no request can be built from.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream rejected the request (4xx). Never retried.
    #[error("upstream rejected the request (HTTP {status}): {body}")]
    UpstreamRejection { status: u16, body: String },

    /// Every attempt failed with a retryable error.
    #[error("generation service unavailable after {attempts} attempts: {last_error}")]
    TransientTransport {
        attempts: u32,
        #[source]
        last_error: TransportError,
    },

    /// The caller cancelled the invocation.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => "configuration",
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::UpstreamRejection { .. } => "upstream_rejection",
            GenerationError::TransientTransport { .. } => "transient_transport",
            GenerationError::Cancelled => "cancelled",
        }
    }
}
