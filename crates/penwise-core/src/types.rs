//! Core types for Penwise — the chat-completions wire format and the
//! structured results handed back to the CMS.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format, serialized with a `role` tag.
///
/// Every request is a single user turn.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Generation request
// ─────────────────────────────────────────────

/// One prompt to send upstream, with its sampling parameters.
///
/// Built fresh for every call; fields are read-only once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    max_output_tokens: u32,
    model_id: String,
    temperature: f64,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        max_output_tokens: u32,
        model_id: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
            model_id: model_id.into(),
            temperature,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Render the request as a chat-completions body (single user turn, no streaming).
    pub fn to_chat_request(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model_id.clone(),
            messages: vec![Message::user(self.prompt.clone())],
            max_tokens: self.max_output_tokens,
            temperature: self.temperature,
            stream: false,
        }
    }
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

/// Raw chat completion response from an OpenAI-compatible API.
/// Used internally for deserialization.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the upstream returned any.
    pub fn into_first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

// ─────────────────────────────────────────────
// Outline
// ─────────────────────────────────────────────

/// An article outline: a title plus ordered sections of talking points.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Outline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<OutlineSection>,
}

/// One section of an [`Outline`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutlineSection {
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

impl OutlineSection {
    pub fn new(title: impl Into<String>, points: &[&str]) -> Self {
        Self {
            title: title.into(),
            points: points.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Register the outline is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutlineStyle {
    #[default]
    Professional,
    Popular,
    Academic,
    Concise,
}

impl OutlineStyle {
    /// The label embedded in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            OutlineStyle::Professional => "专业",
            OutlineStyle::Popular => "通俗",
            OutlineStyle::Academic => "学术",
            OutlineStyle::Concise => "简洁",
        }
    }
}

impl FromStr for OutlineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "专业" | "professional" => Ok(OutlineStyle::Professional),
            "通俗" | "popular" => Ok(OutlineStyle::Popular),
            "学术" | "academic" => Ok(OutlineStyle::Academic),
            "简洁" | "concise" => Ok(OutlineStyle::Concise),
            other => Err(format!("unknown outline style: {other}")),
        }
    }
}

// ─────────────────────────────────────────────
// Writing improvement
// ─────────────────────────────────────────────

/// What kind of rewrite to ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImproveKind {
    /// Fix grammar and spelling only.
    Grammar,
    /// Polish wording and flow.
    #[default]
    Style,
    /// Add technical depth (roughly 1.5–2× the length).
    Expand,
}

impl ImproveKind {
    /// Parse a kind name; anything unrecognised means [`ImproveKind::Style`].
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "grammar" => ImproveKind::Grammar,
            "expand" => ImproveKind::Expand,
            _ => ImproveKind::Style,
        }
    }
}

/// A 1–10 quality rating, rendered as `"N/10"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct QualityScore(u8);

impl QualityScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Build a score, clamping into `[1, 10]`.
    pub fn clamped(raw: u64) -> Self {
        QualityScore(raw.clamp(Self::MIN as u64, Self::MAX as u64) as u8)
    }
}

impl Default for QualityScore {
    fn default() -> Self {
        QualityScore(8)
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

impl Serialize for QualityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of a writing-improvement request.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImprovementResult {
    pub improved_text: String,
    /// At most three suggestions.
    pub suggestions: Vec<String>,
    pub quality_score: QualityScore,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
