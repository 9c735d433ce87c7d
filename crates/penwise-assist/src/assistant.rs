//! Writing assistant — one operation per content task.
//!
//! Each operation runs prompt builder → [`RetryingInvoker`] → interpreter.
//!
//! Failure policy:
//! - [`WritingAssistant::generate`] and [`WritingAssistant::complete`] are direct
//!   replies to a user turn; invoker errors reach the caller unchanged.
//! - Every derived-content operation (outline, improve, summarize, tags,
//!   suggestions, rating) absorbs invoker errors into its fallback and logs them.
//! - Trivially short input skips the network entirely.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use penwise_core::config::{Config, GenerationDefaults};
use penwise_core::types::{
    GenerationRequest, ImproveKind, ImprovementResult, Outline, OutlineStyle, QualityScore,
};
use penwise_core::utils::char_len;
use penwise_providers::{GenerationError, HttpTransport, RetryPolicy, RetryingInvoker, Transport};

use crate::interpret::{
    Interpreter, OutlineInterpreter, ScoreInterpreter, SuggestionsInterpreter, SummaryInterpreter,
    TagInterpreter,
};
use crate::prompts;

/// Below this many characters, suggestions, rating, and tagging skip the network.
pub const SHORT_CONTENT_CHARS: usize = 50;
/// Below this many characters, the content is its own summary.
pub const SUMMARY_MIN_CHARS: usize = 100;

/// Summary length bounds, in characters.
pub const MIN_SUMMARY_LENGTH: usize = 50;
pub const MAX_SUMMARY_LENGTH: usize = 500;
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;
pub const DEFAULT_TAG_COUNT: usize = 5;

// Per-task token budgets.
const IMPROVE_MAX_TOKENS: u32 = 4000;
const SUGGESTIONS_MAX_TOKENS: u32 = 500;
const RATING_MAX_TOKENS: u32 = 10;
const SUMMARY_MAX_TOKENS: u32 = 300;
const TAGS_MAX_TOKENS: u32 = 100;
const COMPLETION_MAX_TOKENS: u32 = 500;

const SHORT_CONTENT_SUGGESTION: &str = "内容较短，建议扩展更多技术细节";
const SHORT_CONTENT_TAGS: [&str; 2] = ["技术", "文档"];

/// The writing-assistant facade.
///
/// Cheap to clone; holds no per-call state, so calls may run concurrently.
#[derive(Clone, Debug)]
pub struct WritingAssistant {
    invoker: RetryingInvoker,
    defaults: GenerationDefaults,
}

impl WritingAssistant {
    pub fn new(invoker: RetryingInvoker, defaults: GenerationDefaults) -> Self {
        Self { invoker, defaults }
    }

    /// Wire an HTTP transport and retry policy from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
            &config.provider,
            config.retry.timeout(),
        )?);

        debug!(
            api_base = config.provider.api_base(),
            model = %config.generation.model,
            max_attempts = config.retry.max_attempts,
            "Creating writing assistant"
        );

        Ok(Self::new(
            RetryingInvoker::new(transport, RetryPolicy::from(&config.retry)),
            config.generation.clone(),
        ))
    }

    fn request(&self, prompt: String, max_tokens: u32) -> GenerationRequest {
        GenerationRequest::new(
            prompt,
            max_tokens,
            self.defaults.model.clone(),
            self.defaults.temperature,
        )
    }

    /// Run one derived-content task, substituting the fallback on any invoker error.
    async fn derive<I: Interpreter>(
        &self,
        prompt: String,
        max_tokens: u32,
        interpreter: &I,
        cancel: &CancellationToken,
    ) -> I::Output {
        let request = self.request(prompt, max_tokens);
        match self.invoker.invoke(&request, cancel).await {
            Ok(reply) => interpreter.interpret(&reply),
            Err(e) => {
                warn!(
                    task = interpreter.task(),
                    error_kind = e.kind(),
                    error = %e,
                    "generation failed, using fallback"
                );
                interpreter.fallback()
            }
        }
    }

    // ─────────────────────────────────────────
    // Direct generation (errors propagate)
    // ─────────────────────────────────────────

    /// Free-form reply to `prompt`, e.g. one chat turn.
    pub async fn generate(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput("prompt is empty".into()));
        }
        let request = self.request(
            prompt.to_string(),
            max_tokens.unwrap_or(self.defaults.max_tokens),
        );
        self.invoker.invoke(&request, cancel).await
    }

    /// Continue writing from `prompt`, given the surrounding article `context`.
    pub async fn complete(
        &self,
        prompt: &str,
        context: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput(
                "completion prompt is empty".into(),
            ));
        }
        let request = self.request(prompts::completion(prompt, context), COMPLETION_MAX_TOKENS);
        self.invoker.invoke(&request, cancel).await
    }

    // ─────────────────────────────────────────
    // Derived content (never fails)
    // ─────────────────────────────────────────

    /// Article outline for `topic`. Always has at least one section.
    pub async fn outline(
        &self,
        topic: &str,
        style: OutlineStyle,
        cancel: &CancellationToken,
    ) -> Outline {
        self.derive(
            prompts::outline(topic, style),
            self.defaults.max_tokens,
            &OutlineInterpreter::new(topic),
            cancel,
        )
        .await
    }

    /// Rewrite `content`, then suggest and rate based on the original text.
    pub async fn improve(
        &self,
        content: &str,
        kind: ImproveKind,
        cancel: &CancellationToken,
    ) -> ImprovementResult {
        let request = self.request(prompts::improve(content, kind), IMPROVE_MAX_TOKENS);
        let improved_text = match self.invoker.invoke(&request, cancel).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(task = "improve", "empty rewrite, keeping original content");
                content.to_string()
            }
            Err(e) => {
                warn!(
                    task = "improve",
                    error_kind = e.kind(),
                    error = %e,
                    "generation failed, using fallback"
                );
                // Skip the suggestion and rating calls after a failed rewrite.
                return ImprovementResult {
                    improved_text: content.to_string(),
                    suggestions: SuggestionsInterpreter.fallback(),
                    quality_score: ScoreInterpreter.fallback(),
                };
            }
        };

        let (suggestions, quality_score) =
            tokio::join!(self.suggest(content, cancel), self.rate(content, cancel));

        info!(
            task = "improve",
            kind = ?kind,
            suggestions = suggestions.len(),
            score = %quality_score,
            "improvement ready"
        );

        ImprovementResult {
            improved_text,
            suggestions,
            quality_score,
        }
    }

    /// Up to three writing suggestions for `content`.
    pub async fn suggest(&self, content: &str, cancel: &CancellationToken) -> Vec<String> {
        if char_len(content) < SHORT_CONTENT_CHARS {
            return vec![SHORT_CONTENT_SUGGESTION.to_string()];
        }
        self.derive(
            prompts::suggestions(content),
            SUGGESTIONS_MAX_TOKENS,
            &SuggestionsInterpreter,
            cancel,
        )
        .await
    }

    /// 1–10 quality rating of `content`.
    pub async fn rate(&self, content: &str, cancel: &CancellationToken) -> QualityScore {
        if char_len(content) < SHORT_CONTENT_CHARS {
            return ScoreInterpreter.fallback();
        }
        self.derive(
            prompts::rating(content),
            RATING_MAX_TOKENS,
            &ScoreInterpreter,
            cancel,
        )
        .await
    }

    /// Summary of `content` in at most `max_length` characters (plus an ellipsis
    /// marker if clipped). `max_length` is clamped to 50–500.
    pub async fn summarize(
        &self,
        content: &str,
        max_length: usize,
        cancel: &CancellationToken,
    ) -> String {
        if char_len(content) < SUMMARY_MIN_CHARS {
            return content.to_string();
        }
        let max_length = max_length.clamp(MIN_SUMMARY_LENGTH, MAX_SUMMARY_LENGTH);
        self.derive(
            prompts::summary(content, max_length),
            SUMMARY_MAX_TOKENS,
            &SummaryInterpreter::new(content, max_length),
            cancel,
        )
        .await
    }

    /// Up to `count` unique tags for `content`. A `count` of zero means
    /// [`DEFAULT_TAG_COUNT`].
    pub async fn tags(
        &self,
        content: &str,
        count: usize,
        cancel: &CancellationToken,
    ) -> Vec<String> {
        let count = if count == 0 { DEFAULT_TAG_COUNT } else { count };
        if char_len(content) < SHORT_CONTENT_CHARS {
            return SHORT_CONTENT_TAGS
                .iter()
                .take(count)
                .map(|t| t.to_string())
                .collect();
        }
        self.derive(
            prompts::tags(content, count),
            TAGS_MAX_TOKENS,
            &TagInterpreter::new(count),
            cancel,
        )
        .await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use penwise_providers::TransportError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&str) -> Result<String, TransportError> + Send + Sync>;

    /// A transport that answers from a closure over the prompt and counts calls.
    struct FnTransport {
        respond: Responder,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        configured: bool,
    }

    impl FnTransport {
        fn new(
            respond: impl Fn(&str) -> Result<String, TransportError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                respond: Box::new(respond),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                configured: true,
            })
        }

        fn replying(text: impl Into<String>) -> Arc<Self> {
            let text = text.into();
            Self::new(move |_| Ok(text.clone()))
        }

        fn failing() -> Arc<Self> {
            Self::new(|_| Err(TransportError::status(503, "unavailable")))
        }

        fn unconfigured() -> Arc<Self> {
            Arc::new(Self {
                respond: Box::new(|_| Ok("unused".into())),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                configured: false,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FnTransport {
        async fn send(&self, request: &GenerationRequest) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt().to_string());
            (self.respond)(request.prompt())
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn display_name(&self) -> &str {
            "fn-transport"
        }
    }

    fn assistant(transport: Arc<FnTransport>) -> WritingAssistant {
        WritingAssistant::new(
            RetryingInvoker::new(transport, RetryPolicy::default()),
            GenerationDefaults::default(),
        )
    }

    fn long_text(chars: usize) -> String {
        "容器编排让微服务部署更加可靠。".chars().cycle().take(chars).collect()
    }

    // ── generate / complete ──

    #[tokio::test]
    async fn test_generate_returns_reply() {
        let transport = FnTransport::replying("你好，我是写作助手。");
        let reply = assistant(transport.clone())
            .generate("你好", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply, "你好，我是写作助手。");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_propagates_rejection() {
        let transport = FnTransport::new(|_| Err(TransportError::status(404, "no such model")));
        let err = assistant(transport.clone())
            .generate("hi", Some(50), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamRejection { status: 404, .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_propagates_exhaustion() {
        let transport = FnTransport::failing();
        let err = assistant(transport.clone())
            .generate("hi", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::TransientTransport { attempts: 3, .. }));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_generate_propagates_missing_credential() {
        let transport = FnTransport::unconfigured();
        let err = assistant(transport.clone())
            .generate("hi", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt() {
        let transport = FnTransport::replying("unused");
        let err = assistant(transport.clone())
            .generate("   ", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_embeds_context() {
        let transport = FnTransport::replying("……后续内容");
        let reply = assistant(transport.clone())
            .complete("介绍调度器", "Tokio 是一个异步运行时", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply, "……后续内容");
        let prompts = transport.prompts.lock().unwrap();
        assert_eq!(prompts[0], "上下文：Tokio 是一个异步运行时\n\n请继续写作：介绍调度器");
    }

    // ── outline ──

    #[tokio::test]
    async fn test_outline_parses_reply() {
        let transport = FnTransport::replying(
            r#"{"title": "Rust 所有权", "sections": [{"title": "借用", "points": ["不可变借用", "可变借用"]}]}"#,
        );
        let outline = assistant(transport)
            .outline("Rust", OutlineStyle::Concise, &CancellationToken::new())
            .await;
        assert_eq!(outline.title, "Rust 所有权");
        assert_eq!(outline.sections[0].points, ["不可变借用", "可变借用"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outline_falls_back_when_every_attempt_fails() {
        let transport = FnTransport::failing();
        let outline = assistant(transport.clone())
            .outline("服务网格", OutlineStyle::default(), &CancellationToken::new())
            .await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(outline.title, "服务网格");
        let titles: Vec<&str> = outline.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["引言", "核心内容", "实践应用", "总结"]);
    }

    #[tokio::test]
    async fn test_outline_absorbs_rejection() {
        let transport = FnTransport::new(|_| Err(TransportError::status(401, "bad key")));
        let outline = assistant(transport.clone())
            .outline("服务网格", OutlineStyle::default(), &CancellationToken::new())
            .await;
        assert_eq!(transport.calls(), 1);
        assert_eq!(outline.sections.len(), 4);
    }

    // ── improve ──

    #[tokio::test]
    async fn test_improve_composes_three_calls() {
        let transport = FnTransport::new(|prompt| {
            if prompt.contains("写作改进建议") {
                Ok("统一术语；补充示例；理顺结构".into())
            } else if prompt.contains("满分10分") {
                Ok("7".into())
            } else {
                Ok("润色后的文章".into())
            }
        });
        let content = long_text(120);
        let result = assistant(transport.clone())
            .improve(&content, ImproveKind::Style, &CancellationToken::new())
            .await;

        assert_eq!(result.improved_text, "润色后的文章");
        assert_eq!(result.suggestions, ["统一术语", "补充示例", "理顺结构"]);
        assert_eq!(result.quality_score.to_string(), "7/10");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_improve_service_down_returns_original() {
        let transport = FnTransport::failing();
        let content = long_text(120);
        let result = assistant(transport.clone())
            .improve(&content, ImproveKind::Expand, &CancellationToken::new())
            .await;

        assert_eq!(result.improved_text, content);
        assert_eq!(result.suggestions, SuggestionsInterpreter.fallback());
        assert_eq!(result.quality_score.to_string(), "8/10");
        // Only the rewrite's attempts; no suggestion/rating calls.
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_improve_short_content_only_rewrites() {
        let transport = FnTransport::replying("更好的句子");
        let result = assistant(transport.clone())
            .improve("短句", ImproveKind::Grammar, &CancellationToken::new())
            .await;

        assert_eq!(result.improved_text, "更好的句子");
        assert_eq!(result.suggestions, [SHORT_CONTENT_SUGGESTION]);
        assert_eq!(result.quality_score.to_string(), "8/10");
        assert_eq!(transport.calls(), 1);
    }

    // ── rating / suggestions ──

    #[tokio::test]
    async fn test_rate_clamps_and_short_circuits() {
        let transport = FnTransport::replying("Score: 12 out of 10");
        let assistant = assistant(transport.clone());
        let cancel = CancellationToken::new();

        assert_eq!(assistant.rate(&long_text(80), &cancel).await.to_string(), "10/10");
        assert_eq!(assistant.rate("tiny", &cancel).await.to_string(), "8/10");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_suggest_unstructured_reply_is_kept_whole() {
        let transport = FnTransport::replying("整体不错，建议补充示例");
        let suggestions = assistant(transport)
            .suggest(&long_text(80), &CancellationToken::new())
            .await;
        assert_eq!(suggestions, ["整体不错，建议补充示例"]);
    }

    // ── summarize ──

    #[tokio::test]
    async fn test_summarize_short_content_skips_network() {
        let transport = FnTransport::replying("unused");
        let content = long_text(99);
        let summary = assistant(transport.clone())
            .summarize(&content, 200, &CancellationToken::new())
            .await;
        assert_eq!(summary, content);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_clips_long_reply() {
        let transport = FnTransport::replying(long_text(80));
        let summary = assistant(transport)
            .summarize(&long_text(300), 50, &CancellationToken::new())
            .await;
        assert_eq!(char_len(&summary), 50 + 3);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn test_summarize_clamps_requested_length() {
        let transport = FnTransport::replying("摘要");
        let _ = assistant(transport.clone())
            .summarize(&long_text(300), 10_000, &CancellationToken::new())
            .await;
        let prompts = transport.prompts.lock().unwrap();
        assert!(prompts[0].contains("长度不超过500字"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarize_falls_back_to_clipped_content() {
        let transport = FnTransport::failing();
        let content = long_text(300);
        let summary = assistant(transport)
            .summarize(&content, 60, &CancellationToken::new())
            .await;
        assert_eq!(summary, format!("{}...", content.chars().take(60).collect::<String>()));
    }

    // ── tags ──

    #[tokio::test]
    async fn test_tags_deduplicated() {
        let transport = FnTransport::replying("云计算，容器，微服务，容器");
        let tags = assistant(transport)
            .tags(&long_text(80), 3, &CancellationToken::new())
            .await;
        assert_eq!(tags, ["云计算", "容器", "微服务"]);
    }

    #[tokio::test]
    async fn test_tags_short_content_skips_network() {
        let transport = FnTransport::replying("unused");
        let tags = assistant(transport.clone())
            .tags("短", DEFAULT_TAG_COUNT, &CancellationToken::new())
            .await;
        assert_eq!(tags, SHORT_CONTENT_TAGS);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_tags_zero_count_means_default() {
        let transport = FnTransport::replying("云计算，容器");
        let assistant = assistant(transport.clone());
        let cancel = CancellationToken::new();

        let tags = assistant.tags(&long_text(80), 0, &cancel).await;
        assert_eq!(tags, ["云计算", "容器"]);
        assert!(transport.prompts()[0].contains(&format!("生成{DEFAULT_TAG_COUNT}个")));

        assert_eq!(assistant.tags("短", 0, &cancel).await, SHORT_CONTENT_TAGS);
    }

    #[tokio::test]
    async fn test_derived_operations_absorb_missing_credential() {
        let transport = FnTransport::unconfigured();
        let assistant = assistant(transport.clone());
        let cancel = CancellationToken::new();
        let content = long_text(200);

        assert_eq!(assistant.tags(&content, 5, &cancel).await.len(), 5);
        assert_eq!(assistant.suggest(&content, &cancel).await.len(), 3);
        assert_eq!(assistant.rate(&content, &cancel).await.to_string(), "8/10");
        let outline = assistant.outline("x", OutlineStyle::default(), &cancel).await;
        assert!(!outline.sections.is_empty());
        assert!(assistant.summarize(&content, 50, &cancel).await.ends_with("..."));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_derived_operation_falls_back() {
        let transport = FnTransport::replying("unused");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let tags = assistant(transport.clone())
            .tags(&long_text(80), 2, &cancel)
            .await;
        assert_eq!(tags, ["技术", "开发"]);
        assert_eq!(transport.calls(), 0);
    }

    // ── wiring ──

    #[tokio::test]
    async fn test_from_config_end_to_end() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-e2e"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Rust，Tokio，异步" } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = Config::default();
        config.provider.api_key = "sk-e2e".into();
        config.provider.api_base = Some(mock_server.uri());

        let assistant = WritingAssistant::from_config(&config).unwrap();
        let tags = assistant
            .tags(&long_text(80), 5, &CancellationToken::new())
            .await;
        assert_eq!(tags, ["Rust", "Tokio", "异步"]);
    }
}
