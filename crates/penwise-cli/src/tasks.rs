//! One-shot writing commands: generate, complete, outline, improve,
//! summarize, tags.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use penwise_assist::WritingAssistant;
use penwise_core::types::{ImproveKind, ImprovementResult, Outline, OutlineStyle};

use crate::helpers;

pub async fn generate(
    assistant: &WritingAssistant,
    message: &str,
    max_tokens: Option<u32>,
    cancel: &CancellationToken,
) -> Result<()> {
    helpers::print_thinking();
    let reply = assistant.generate(message, max_tokens, cancel).await;
    helpers::clear_thinking();
    helpers::print_response(&reply.context("generation failed")?);
    Ok(())
}

pub async fn complete(
    assistant: &WritingAssistant,
    prompt: &str,
    context: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    helpers::print_thinking();
    let reply = assistant.complete(prompt, context, cancel).await;
    helpers::clear_thinking();
    helpers::print_response(&reply.context("completion failed")?);
    Ok(())
}

pub async fn outline(
    assistant: &WritingAssistant,
    topic: &str,
    style: &str,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let style: OutlineStyle = style.parse().map_err(anyhow::Error::msg)?;
    let outline = assistant.outline(topic, style, cancel).await;
    if json {
        print_json(&outline)
    } else {
        print!("{}", render_outline(&outline));
        Ok(())
    }
}

pub async fn improve(
    assistant: &WritingAssistant,
    content: &str,
    kind: &str,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    helpers::print_thinking();
    let result = assistant
        .improve(content, ImproveKind::parse_lenient(kind), cancel)
        .await;
    helpers::clear_thinking();
    if json {
        print_json(&result)
    } else {
        print!("{}", render_improvement(&result));
        Ok(())
    }
}

pub async fn summarize(
    assistant: &WritingAssistant,
    content: &str,
    max_length: usize,
    cancel: &CancellationToken,
) -> Result<()> {
    let summary = assistant.summarize(content, max_length, cancel).await;
    println!("{summary}");
    Ok(())
}

pub async fn tags(
    assistant: &WritingAssistant,
    content: &str,
    count: usize,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let tags = assistant.tags(content, count, cancel).await;
    if json {
        print_json(&tags)
    } else {
        println!("{}", tags.join("，"));
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_outline(outline: &Outline) -> String {
    let mut out = format!("{}\n", outline.title.bold());
    for (i, section) in outline.sections.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, section.title));
        for point in &section.points {
            out.push_str(&format!("     · {point}\n"));
        }
    }
    out
}

fn render_improvement(result: &ImprovementResult) -> String {
    let mut out = format!("{}\n{}\n\n", "Improved".cyan().bold(), result.improved_text);
    out.push_str(&format!("{}\n", "Suggestions".cyan().bold()));
    for suggestion in &result.suggestions {
        out.push_str(&format!("  - {suggestion}\n"));
    }
    out.push_str(&format!(
        "\n{} {}\n",
        "Quality:".cyan().bold(),
        result.quality_score
    ));
    out
}
