//! Transport trait — one request/response exchange with the completion endpoint.
//!
//! Implementations perform exactly one attempt; retry policy lives in
//! [`crate::retry::RetryingInvoker`].

use async_trait::async_trait;
use penwise_core::types::GenerationRequest;

use crate::error::TransportError;

/// A single-shot completion transport.
///
/// The main implementation is [`crate::HttpTransport`]; tests substitute
/// scripted doubles.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one completion request and return the first choice's text.
    async fn send(&self, request: &GenerationRequest) -> Result<String, TransportError>;

    /// Whether a credential is available. Checked once before any attempt.
    fn is_configured(&self) -> bool;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
