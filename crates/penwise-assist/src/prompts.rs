//! Prompt builders — one pure function per writing task.
//!
//! Caller content is clipped to a per-task character budget before it is
//! embedded, which bounds upstream token cost. The clip is silent and lossy:
//! a rating or tag prompt only ever sees the head of a long article.

use penwise_core::types::{ImproveKind, OutlineStyle};
use penwise_core::utils::take_chars;

/// Characters of content embedded in the suggestions prompt.
pub const SUGGESTIONS_BUDGET: usize = 800;
/// Characters of content embedded in the quality-rating prompt.
pub const RATING_BUDGET: usize = 500;
/// Characters of content embedded in the summary prompt.
pub const SUMMARY_BUDGET: usize = 3000;
/// Characters of content embedded in the tag prompt.
pub const TAGS_BUDGET: usize = 1500;

/// Outline for `topic` as strict JSON.
pub fn outline(topic: &str, style: OutlineStyle) -> String {
    format!(
        r#"请为主题"{topic}"生成一个{style}风格的文章大纲。

要求：
1. 包含清晰的章节结构（3-5个主要章节）
2. 每个章节要有3-5个具体的内容要点
3. 适合技术文档的格式
4. 包含引言和总结部分
5. 返回严格的JSON格式

JSON格式示例：
{{
    "title": "文章标题",
    "sections": [
        {{
            "title": "章节标题",
            "points": ["要点1", "要点2", "要点3"]
        }}
    ]
}}

请直接返回JSON，不要其他文字。"#,
        style = style.label()
    )
}

/// Rewrite of the full `content`.
pub fn improve(content: &str, kind: ImproveKind) -> String {
    match kind {
        ImproveKind::Grammar => format!(
            "请修正以下内容的语法错误和拼写错误，保持原意不变：\n\n{content}\n\n\
             要求：\n\
             1. 只修正错误，不要改变内容结构\n\
             2. 保持专业的技术文档风格\n\
             3. 直接返回修正后的内容"
        ),
        ImproveKind::Style => format!(
            "请优化以下内容的写作风格，使其更加专业、流畅：\n\n{content}\n\n\
             要求：\n\
             1. 保持核心内容不变\n\
             2. 优化句子结构和表达方式\n\
             3. 提升技术文档的专业性和可读性\n\
             4. 直接返回优化后的内容"
        ),
        ImproveKind::Expand => format!(
            "请扩展以下内容，增加技术细节和深度：\n\n{content}\n\n\
             要求：\n\
             1. 保持原文主旨和技术准确性\n\
             2. 增加相关的技术细节和实际例子\n\
             3. 扩展后的内容应该是原文的1.5-2倍长度\n\
             4. 直接返回扩展后的内容"
        ),
    }
}

/// Three writing suggestions, separated by semicolons.
pub fn suggestions(content: &str) -> String {
    format!(
        "请为以下技术内容提供3条具体的写作改进建议：\n\n{}\n\n\
         要求：\n\
         1. 针对技术文档的特点提出建议\n\
         2. 每条建议要具体可行\n\
         3. 用中文返回，用分号分隔\n\
         4. 不要编号，直接返回建议内容",
        take_chars(content, SUGGESTIONS_BUDGET)
    )
}

/// A bare 1–10 score.
pub fn rating(content: &str) -> String {
    format!(
        "请从技术文档的角度评估以下内容的写作质量（满分10分）：\n\n{}\n\n\
         要求：\n\
         1. 从专业性、清晰度、逻辑性等方面评估\n\
         2. 只返回分数数字\n\
         3. 不要其他文字",
        take_chars(content, RATING_BUDGET)
    )
}

/// Summary of at most `max_length` characters.
pub fn summary(content: &str, max_length: usize) -> String {
    format!(
        "请为以下技术文章生成一个简洁的摘要，长度不超过{max_length}字：\n\n{}\n\n\
         要求：\n\
         1. 抓住技术核心观点和关键信息\n\
         2. 突出技术要点和实践价值\n\
         3. 语言精炼，逻辑清晰\n\
         4. 直接返回摘要内容",
        take_chars(content, SUMMARY_BUDGET)
    )
}

/// `count` tags joined by the full-width comma.
pub fn tags(content: &str, count: usize) -> String {
    format!(
        "根据以下技术内容，生成{count}个相关的技术标签：\n\n{}\n\n\
         要求：\n\
         1. 标签要体现技术关键词\n\
         2. 每个标签2-4个汉字\n\
         3. 用中文逗号分隔返回\n\
         4. 不要其他文字",
        take_chars(content, TAGS_BUDGET)
    )
}

/// Continue writing `prompt` given the surrounding `context`.
pub fn completion(prompt: &str, context: &str) -> String {
    format!("上下文：{context}\n\n请继续写作：{prompt}")
}
