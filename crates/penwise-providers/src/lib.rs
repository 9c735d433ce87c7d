//! Completion transport layer for Penwise.
//!
//! # Architecture
//!
//! - [`traits::Transport`] — one request/response exchange, no retries
//! - [`http_transport::HttpTransport`] — `reqwest` client for OpenAI-compatible APIs
//! - [`retry::RetryingInvoker`] — bounded retry + exponential backoff + failure classification
//! - [`error`] — per-attempt [`TransportError`] and terminal [`GenerationError`]

pub mod error;
pub mod http_transport;
pub mod retry;
pub mod traits;

// Re-export main types for convenience
pub use error::{Disposition, GenerationError, TransportError};
pub use http_transport::HttpTransport;
pub use retry::{RetryPolicy, RetryingInvoker};
pub use traits::Transport;
