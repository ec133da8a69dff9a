//! CLI command implementations for prism inspections.
//!
//! Provides subcommand handlers for:
//! - `prism request <input>` — inspect a captured request body
//! - `prism response <input>` — inspect a captured response body or SSE stream
//! - `prism stats <input>` — tool usage and message statistics for a request
//! - `prism export <input>` — write the analysis document
//! - `prism detect <input>` — report the sniffed payload shape
//!
//! Inputs are file paths, `-` for stdin, or `http(s)://` URLs.

use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::PrismConfig;
use crate::export;
use crate::inspector::request::RequestModel;
use crate::inspector::response::{ContentBody, ResponseModel};
use crate::inspector::{InspectorSession, ParsedModel, PayloadKind, sniff};
use crate::utils::input::load_payload;

/// Output format for terminal commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// prism request
// ---------------------------------------------------------------------------

/// Inspect a request payload. With `--output`, writes the rendered HTML
/// document; otherwise prints a terminal summary in the chosen format.
pub fn run_request(
    input: &str,
    format: OutputFormat,
    output: Option<&str>,
    config: &PrismConfig,
) -> Result<()> {
    let raw = load_payload(input, config.fetch.timeout_secs)?;
    let mut session = InspectorSession::inspect_as(&raw, PayloadKind::Request);
    session.set_newest_first(config.render.newest_first);

    if let Some(path) = output {
        return write_document(&session, path);
    }

    let Some(ParsedModel::Request(model)) = &session.model else {
        anyhow::bail!("request parser produced no model");
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session.model_json())?),
        OutputFormat::Csv => print_tool_stats_csv(model),
        OutputFormat::Table => print_request_table(model),
    }
    warn_on_errors(&model.errors);

    Ok(())
}

fn print_request_table(model: &RequestModel) {
    println!("{}", "PRISM Request Inspection".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    let overview = &model.overview;
    println!("  {} {}", "Model:           ".bold(), overview.model);
    println!(
        "  {} {}",
        "Max tokens:      ".bold(),
        overview
            .max_tokens
            .map_or_else(|| "not set".to_string(), |n| n.to_string())
    );
    println!("  {} {}", "Messages:        ".bold(), overview.message_count);
    println!("  {} {}", "Tools:           ".bold(), overview.tool_count);
    println!(
        "  {} {}",
        "System prompt:   ".bold(),
        if overview.has_system { "yes" } else { "no" }
    );
    if overview.thinking_enabled {
        println!(
            "  {} {} tokens",
            "Thinking budget: ".bold(),
            overview.thinking_budget
        );
    }
    println!(
        "  {} ~{}",
        "Estimated tokens:".bold(),
        format_number(overview.estimated_tokens)
    );
    println!();

    let stats = model.message_stats();
    println!("{}", "Conversation".bold().cyan());
    println!(
        "  User: {}  Assistant: {}  Reminders: {}  Tool calls: {}",
        stats.user, stats.assistant, stats.total_system_reminders, stats.total_tool_calls,
    );

    let tool_stats = model.tool_usage_stats();
    if !tool_stats.is_empty() {
        println!();
        println!("{}", "Tool Calls by Name".bold().cyan());
        println!(
            "  {:<24} {:>6} {:>8} {:>6}",
            "Tool", "Count", "Success", "Error"
        );
        println!("  {}", "-".repeat(48));
        for (name, stat) in &tool_stats {
            println!(
                "  {:<24} {:>6} {:>8} {:>6}",
                truncate(name, 24),
                stat.count,
                stat.success,
                stat.error,
            );
        }
    }

    if !model.orphan_results.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} unmatched tool result(s)", model.orphan_results.len()).yellow()
        );
    }
}

// ---------------------------------------------------------------------------
// prism response
// ---------------------------------------------------------------------------

/// Inspect a response payload. `force_streaming` skips detection and treats
/// the input as an SSE stream.
pub fn run_response(
    input: &str,
    force_streaming: bool,
    format: OutputFormat,
    output: Option<&str>,
    config: &PrismConfig,
) -> Result<()> {
    let raw = load_payload(input, config.fetch.timeout_secs)?;
    let kind = if force_streaming || sniff::detect(&raw) == PayloadKind::StreamingResponse {
        PayloadKind::StreamingResponse
    } else {
        PayloadKind::Response
    };
    let session = InspectorSession::inspect_as(&raw, kind);

    if let Some(path) = output {
        return write_document(&session, path);
    }

    let Some(ParsedModel::Response(model)) = &session.model else {
        anyhow::bail!("response parser produced no model");
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session.model_json())?),
        OutputFormat::Csv => print_content_csv(model),
        OutputFormat::Table => print_response_table(model),
    }
    warn_on_errors(&model.errors);

    Ok(())
}

fn print_response_table(model: &ResponseModel) {
    println!("{}", "PRISM Response Inspection".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    let meta = &model.metadata;
    let unknown = || "unknown".to_string();
    println!(
        "  {} {}",
        "Model:      ".bold(),
        meta.model.clone().unwrap_or_else(unknown)
    );
    println!(
        "  {} {}",
        "Stop reason:".bold(),
        meta.stop_reason.clone().unwrap_or_else(unknown)
    );
    println!(
        "  {} {}",
        "Streaming:  ".bold(),
        if meta.is_streaming { "yes" } else { "no" }
    );

    if let Some(usage) = &model.usage {
        println!();
        println!("{}", "Token Usage".bold().cyan());
        println!(
            "  Input: {}  Cache creation: {}  Cache read: {}",
            usage.input_tokens, usage.cache_creation_input_tokens, usage.cache_read_input_tokens,
        );
        println!(
            "  Total input: {}  Output: {}  Total: {}",
            usage.total_input_tokens,
            usage.output_tokens,
            format_number(usage.total_tokens as usize),
        );
        println!(
            "  Cache efficiency: {}%  Output ratio: {}%",
            usage.cache_efficiency, usage.output_ratio,
        );
    }

    println!();
    println!("{}", "Content Blocks".bold().cyan());
    for block in &model.content {
        let label = match &block.body {
            ContentBody::Text {
                character_count,
                word_count,
                ..
            } => format!("text — {character_count} chars, {word_count} words"),
            ContentBody::ToolUse {
                name, input_size, ..
            } => format!(
                "tool_use — {}, {input_size} byte input",
                name.as_deref().unwrap_or("unnamed")
            ),
            ContentBody::Thinking {
                character_count, ..
            } => format!("thinking — {character_count} chars"),
            ContentBody::Other { .. } => "unknown block type".to_string(),
        };
        println!("  [{}] {}", block.index + 1, label);
    }

    if let Some(info) = &model.streaming_info {
        println!();
        println!(
            "  {} {} events ({})",
            "Stream:".bold(),
            info.total_events,
            info.event_types.join(", ")
        );
    }
}

fn print_content_csv(model: &ResponseModel) {
    println!("index,type,size");
    for block in &model.content {
        let (kind, size) = match &block.body {
            ContentBody::Text {
                character_count, ..
            } => ("text", *character_count),
            ContentBody::ToolUse { input_size, .. } => ("tool_use", *input_size),
            ContentBody::Thinking {
                character_count, ..
            } => ("thinking", *character_count),
            ContentBody::Other { value } => ("other", value.to_string().len()),
        };
        println!("{},{},{}", block.index, kind, size);
    }
}

// ---------------------------------------------------------------------------
// prism stats
// ---------------------------------------------------------------------------

/// Show tool usage and message statistics for a request payload.
pub fn run_stats(input: &str, format: OutputFormat, config: &PrismConfig) -> Result<()> {
    let raw = load_payload(input, config.fetch.timeout_secs)?;
    let model = crate::inspector::request::parse(&raw);

    if !model.errors.is_empty() {
        warn_on_errors(&model.errors);
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&model)?,
        OutputFormat::Csv => print_tool_stats_csv(&model),
        OutputFormat::Table => print_stats_table(&model),
    }

    Ok(())
}

fn print_stats_table(model: &RequestModel) {
    let stats = model.message_stats();

    println!("{}", "PRISM Conversation Statistics".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "User messages:     ".bold(), stats.user);
    println!("  {} {}", "Assistant messages:".bold(), stats.assistant);
    println!("  {} {}", "System prompt:     ".bold(), stats.system);
    println!(
        "  {} {}",
        "System reminders:  ".bold(),
        stats.total_system_reminders
    );
    println!(
        "  {} {}",
        "Paired tool calls: ".bold(),
        stats.total_tool_calls
    );

    let tool_stats = model.tool_usage_stats();
    if tool_stats.is_empty() {
        println!();
        println!("{}", "No tool calls in this conversation.".yellow());
        return;
    }

    println!();
    println!("{}", "Tool Usage".bold().cyan());
    println!(
        "  {:<24} {:>6} {:>8} {:>6}",
        "Tool", "Count", "Success", "Error"
    );
    println!("  {}", "-".repeat(48));
    for (name, stat) in &tool_stats {
        let line = format!(
            "  {:<24} {:>6} {:>8} {:>6}",
            truncate(name, 24),
            stat.count,
            stat.success,
            stat.error,
        );
        if stat.error > 0 {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}

fn print_stats_json(model: &RequestModel) -> Result<()> {
    let value = serde_json::json!({
        "messages": model.message_stats(),
        "tools": model.tool_usage_stats(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_tool_stats_csv(model: &RequestModel) {
    println!("tool,count,success,error");
    for (name, stat) in &model.tool_usage_stats() {
        println!("{},{},{},{}", name, stat.count, stat.success, stat.error);
    }
}

// ---------------------------------------------------------------------------
// prism export
// ---------------------------------------------------------------------------

/// Write the analysis document for a payload, to a file or stdout.
pub fn run_export(input: &str, output: Option<&str>, config: &PrismConfig) -> Result<()> {
    let raw = load_payload(input, config.fetch.timeout_secs)?;
    let session = InspectorSession::inspect(&raw);

    let document = export::analysis_document(&session)
        .with_context(|| format!("payload shape not recognized: {}", session.kind.as_str()))?;
    let serialized = export::to_json_string(&document, config.export.pretty)?;

    match output {
        Some(path) => {
            fs::write(path, &serialized)
                .with_context(|| format!("failed writing analysis to {path}"))?;
            println!("{} {}", "Wrote analysis to".green(), path);
        }
        None => println!("{serialized}"),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// prism detect
// ---------------------------------------------------------------------------

/// Print the sniffed payload shape.
pub fn run_detect(input: &str, config: &PrismConfig) -> Result<()> {
    let raw = load_payload(input, config.fetch.timeout_secs)?;
    let kind = sniff::detect(&raw);

    let label = match kind {
        PayloadKind::Request => kind.as_str().green(),
        PayloadKind::Response | PayloadKind::StreamingResponse => kind.as_str().blue(),
        PayloadKind::Unrecognized => kind.as_str().yellow(),
    };
    println!("{label}");

    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn write_document(session: &InspectorSession, path: &str) -> Result<()> {
    let document = session.render_document();
    fs::write(path, &document).with_context(|| format!("failed writing inspection to {path}"))?;
    println!("{} {}", "Wrote inspection to".green(), path);
    Ok(())
}

fn warn_on_errors(errors: &[String]) {
    for error in errors {
        eprintln!("{} {}", "parse error:".red(), error);
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
