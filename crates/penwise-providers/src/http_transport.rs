//! HTTP transport for OpenAI-compatible `/chat/completions` endpoints.
//!
//! One `send` is one POST. Failures are mapped onto [`TransportError`]
//! variants so the invoker can classify them without string matching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::StatusCode;
use tracing::{debug, warn};

use penwise_core::config::ProviderConfig;
use penwise_core::types::{ChatCompletionResponse, GenerationRequest};

use crate::error::{GenerationError, TransportError};
use crate::traits::Transport;

// ─────────────────────────────────────────────
// HttpTransport
// ─────────────────────────────────────────────

/// Talks to one chat-completions endpoint via `reqwest`.
pub struct HttpTransport {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.deepseek.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_base", &self.api_base)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from the provider config with a per-request timeout.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, GenerationError> {
        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(HttpTransport {
            client,
            api_base: config.api_base().to_string(),
            api_key: config.api_key.trim().to_string(),
            extra_headers,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<String, TransportError> {
        debug!(
            model = request.model_id(),
            max_tokens = request.max_output_tokens(),
            prompt_chars = request.prompt().chars().count(),
            "Calling completion endpoint"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request.to_chat_request())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
                retry_after,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        parsed
            .into_first_content()
            .ok_or_else(|| TransportError::Malformed("no content in first choice".to_string()))
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn display_name(&self) -> &str {
        &self.api_base
    }
}

/// Map a `reqwest` failure onto the transport taxonomy.
fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// Parse a `Retry-After` header given in delta-seconds.
///
/// HTTP-date values are ignored; the invoker then uses its own backoff.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            extra_headers: None,
        }
    }

    fn make_transport(api_key: &str, api_base: &str) -> HttpTransport {
        HttpTransport::new(&make_config(api_key, Some(api_base)), Duration::from_secs(5)).unwrap()
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt, 2000, "deepseek-chat", 0.7)
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let transport = make_transport("key", "https://api.deepseek.com/v1/");
        assert_eq!(
            transport.completions_url(),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base() {
        let transport =
            HttpTransport::new(&make_config("key", None), Duration::from_secs(5)).unwrap();
        assert_eq!(
            transport.completions_url(),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let transport = make_transport("", "http://localhost");
        assert!(!transport.is_configured());
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after(" 0 "), Some(Duration::from_secs(0)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_send_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "role": "assistant", "content": "你好！" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let transport = make_transport("test-key-123", &mock_server.uri());
        let text = transport.send(&request("你好")).await.unwrap();
        assert_eq!(text, "你好！");
    }

    #[tokio::test]
    async fn test_send_exact_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_json(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{ "role": "user", "content": "总结一下" }],
                "max_tokens": 2000,
                "temperature": 0.7,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .mount(&mock_server)
            .await;

        let transport = make_transport("key", &mock_server.uri());
        // If the body matcher fails, wiremock returns 404 → Status error
        assert_eq!(transport.send(&request("总结一下")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_send_extra_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-App-Code", "cms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .mount(&mock_server)
            .await;

        let mut config = make_config("key", Some(&mock_server.uri()));
        config.extra_headers = Some([("X-App-Code".to_string(), "cms".to_string())].into());
        let transport = HttpTransport::new(&config, Duration::from_secs(5)).unwrap();

        assert_eq!(transport.send(&request("hi")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_send_client_error_maps_to_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&mock_server)
            .await;

        let transport = make_transport("bad", &mock_server.uri());
        let err = transport.send(&request("hi")).await.unwrap_err();

        match err {
            TransportError::Status { status, ref body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.disposition(), crate::error::Disposition::Terminal);
    }

    #[tokio::test]
    async fn test_send_rate_limit_reads_retry_after() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "3")
                    .set_body_json(serde_json::json!({
                        "error": { "message": "Rate limit exceeded" }
                    })),
            )
            .mount(&mock_server)
            .await;

        let transport = make_transport("key", &mock_server.uri());
        let err = transport.send(&request("hi")).await.unwrap_err();

        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
        assert_eq!(err.disposition(), crate::error::Disposition::Retryable);
    }

    #[tokio::test]
    async fn test_send_server_error_is_retryable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let transport = make_transport("key", &mock_server.uri());
        let err = transport.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
        assert_eq!(err.disposition(), crate::error::Disposition::Retryable);
    }

    #[tokio::test]
    async fn test_send_empty_choices_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let transport = make_transport("key", &mock_server.uri());
        let err = transport.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_send_non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;

        let transport = make_transport("key", &mock_server.uri());
        let err = transport.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_send_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({
                        "choices": [{ "message": { "content": "late" } }]
                    })),
            )
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(
            &make_config("key", Some(&mock_server.uri())),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = transport.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        // Point to a port that's not listening
        let transport = make_transport("key", "http://127.0.0.1:1");
        let err = transport.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)), "got {err:?}");
    }
}
