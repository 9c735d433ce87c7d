//! Response interpreters — best-effort extraction with a typed fallback.
//!
//! The model is *asked* for JSON, a bare number, or a delimited list, but
//! nothing enforces it. Each interpreter pairs an `extract` that may fail with
//! a deterministic `fallback`; [`Interpreter::interpret`] never fails.

use std::collections::HashSet;

use tracing::warn;

use penwise_core::types::{Outline, OutlineSection, QualityScore};
use penwise_core::utils::{char_len, ellipsize};

/// Suggestions returned when none could be extracted.
pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "建议：优化技术术语的使用一致性",
    "建议：增加具体的代码或配置示例",
    "建议：改善段落之间的逻辑衔接",
];

/// Tag pool used when no tags could be extracted; clipped to the requested count.
pub const FALLBACK_TAGS: [&str; 5] = ["技术", "开发", "文档", "实践", "总结"];

/// Most suggestions kept from one reply.
pub const MAX_SUGGESTIONS: usize = 3;

/// A per-task decoder of free-form model text.
pub trait Interpreter {
    type Output;

    /// Task name for logs.
    fn task(&self) -> &'static str;

    /// Try to pull a structured value out of `reply`.
    fn extract(&self, reply: &str) -> Option<Self::Output>;

    /// Deterministic substitute, independent of any reply.
    fn fallback(&self) -> Self::Output;

    /// Extract, or fall back if the reply doesn't fit the expected shape.
    fn interpret(&self, reply: &str) -> Self::Output {
        match self.extract(reply) {
            Some(value) => value,
            None => {
                warn!(
                    task = self.task(),
                    reply_chars = char_len(reply),
                    "reply did not match expected format, using fallback"
                );
                self.fallback()
            }
        }
    }
}

// ─────────────────────────────────────────────
// Outline
// ─────────────────────────────────────────────

/// Parses the first balanced `{…}` span of the reply as an [`Outline`].
#[derive(Clone, Copy, Debug)]
pub struct OutlineInterpreter<'a> {
    topic: &'a str,
}

impl<'a> OutlineInterpreter<'a> {
    pub fn new(topic: &'a str) -> Self {
        Self { topic }
    }
}

impl Interpreter for OutlineInterpreter<'_> {
    type Output = Outline;

    fn task(&self) -> &'static str {
        "outline"
    }

    fn extract(&self, reply: &str) -> Option<Outline> {
        let span = first_balanced_object(reply)?;
        let mut outline: Outline = serde_json::from_str(span).ok()?;
        if outline.sections.is_empty() {
            return None;
        }
        if outline.title.trim().is_empty() {
            outline.title = self.topic.to_string();
        }
        Some(outline)
    }

    fn fallback(&self) -> Outline {
        Outline {
            title: self.topic.to_string(),
            sections: vec![
                OutlineSection::new("引言", &["背景介绍", "问题陈述", "目标意义"]),
                OutlineSection::new("核心内容", &["关键概念", "技术原理", "实施步骤"]),
                OutlineSection::new("实践应用", &["使用场景", "最佳实践", "注意事项"]),
                OutlineSection::new("总结", &["内容回顾", "核心价值", "未来展望"]),
            ],
        }
    }
}

/// The first `{…}` span whose braces balance, skipping braces inside JSON strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

// ─────────────────────────────────────────────
// Quality score
// ─────────────────────────────────────────────

/// First run of digits in the reply, clamped to 1–10.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreInterpreter;

impl Interpreter for ScoreInterpreter {
    type Output = QualityScore;

    fn task(&self) -> &'static str {
        "rating"
    }

    fn extract(&self, reply: &str) -> Option<QualityScore> {
        let reply: String = reply.chars().map(to_ascii_digit).collect();
        let start = reply.find(|c: char| c.is_ascii_digit())?;
        let digits: &str = reply[start..]
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .unwrap_or_default();
        // Too many digits to fit is still "a big number".
        let raw = digits.parse::<u64>().unwrap_or(u64::MAX);
        Some(QualityScore::clamped(raw))
    }

    fn fallback(&self) -> QualityScore {
        QualityScore::default()
    }
}

/// Full-width digits (`０`–`９`) as their ASCII counterparts.
fn to_ascii_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10).unwrap_or(c),
        _ => c,
    }
}

// ─────────────────────────────────────────────
// Suggestions
// ─────────────────────────────────────────────

/// Semicolon-separated suggestions, at most [`MAX_SUGGESTIONS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SuggestionsInterpreter;

impl Interpreter for SuggestionsInterpreter {
    type Output = Vec<String>;

    fn task(&self) -> &'static str {
        "suggestions"
    }

    fn extract(&self, reply: &str) -> Option<Vec<String>> {
        let suggestions: Vec<String> = reply
            .split([';', '；'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(MAX_SUGGESTIONS)
            .map(String::from)
            .collect();
        (!suggestions.is_empty()).then_some(suggestions)
    }

    fn fallback(&self) -> Vec<String> {
        FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }
}

// ─────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────

/// Delimited tag list, de-duplicated in order of first appearance.
#[derive(Clone, Debug)]
pub struct TagInterpreter {
    count: usize,
    delimiters: Vec<char>,
}

impl TagInterpreter {
    /// Split on the full-width comma (what the prompt asks for) or an ASCII comma.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            delimiters: vec!['，', ','],
        }
    }

    pub fn with_delimiters(mut self, delimiters: &[char]) -> Self {
        self.delimiters = delimiters.to_vec();
        self
    }
}

impl Interpreter for TagInterpreter {
    type Output = Vec<String>;

    fn task(&self) -> &'static str {
        "tags"
    }

    fn extract(&self, reply: &str) -> Option<Vec<String>> {
        let mut seen = HashSet::new();
        let tags: Vec<String> = reply
            .split(self.delimiters.as_slice())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(*t))
            .take(self.count)
            .map(String::from)
            .collect();
        (!tags.is_empty()).then_some(tags)
    }

    fn fallback(&self) -> Vec<String> {
        FALLBACK_TAGS
            .iter()
            .take(self.count)
            .map(|t| t.to_string())
            .collect()
    }
}

// ─────────────────────────────────────────────
// Summary
// ─────────────────────────────────────────────

/// The raw reply, hard-clipped to `max_length` characters.
///
/// Falls back to clipping the source content itself.
#[derive(Clone, Copy, Debug)]
pub struct SummaryInterpreter<'a> {
    content: &'a str,
    max_length: usize,
}

impl<'a> SummaryInterpreter<'a> {
    pub fn new(content: &'a str, max_length: usize) -> Self {
        Self {
            content,
            max_length,
        }
    }
}

impl Interpreter for SummaryInterpreter<'_> {
    type Output = String;

    fn task(&self) -> &'static str {
        "summary"
    }

    fn extract(&self, reply: &str) -> Option<String> {
        let reply = reply.trim();
        (!reply.is_empty()).then(|| ellipsize(reply, self.max_length))
    }

    fn fallback(&self) -> String {
        ellipsize(self.content, self.max_length)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
