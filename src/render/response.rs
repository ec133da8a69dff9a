//! Response view — project a [`ResponseModel`] into the section tree.

use serde_json::Value;

use crate::inspector::response::{ContentBlock, ContentBody, ResponseModel};
use crate::inspector::usage::UsageReport;

use super::{SectionKind, ViewNode};

pub fn view(model: &ResponseModel) -> ViewNode {
    let mut sections = vec![overview_section(model)];

    if let Some(usage) = &model.usage {
        if usage.total_tokens > 0 {
            sections.push(usage_section(usage));
        }
    }

    sections.push(ViewNode::section(
        "response-content",
        SectionKind::Group,
        format!("Response Content ({} blocks)", model.content.len()),
        model.content.iter().map(content_block_section).collect(),
    ));

    if let Some(info) = &model.streaming_info {
        sections.push(ViewNode::section(
            "streaming-info",
            SectionKind::Summary,
            "Streaming",
            vec![
                ViewNode::key_value("Total events", info.total_events.to_string()),
                ViewNode::key_value("Event types", info.event_types.join(", ")),
            ],
        ));
    }

    if !model.errors.is_empty() {
        sections.push(ViewNode::section(
            "parse-errors",
            SectionKind::Errors,
            "Parse Errors",
            model
                .errors
                .iter()
                .map(|e| ViewNode::Alert(e.clone()))
                .collect(),
        ));
    }

    ViewNode::Fragment(sections)
}

// ---------------------------------------------------------------------------
// Summary sections
// ---------------------------------------------------------------------------

fn overview_section(model: &ResponseModel) -> ViewNode {
    let meta = &model.metadata;
    let unknown = || "unknown".to_string();
    let mut rows = vec![
        ViewNode::key_value("Model", meta.model.clone().unwrap_or_else(unknown)),
        ViewNode::key_value("Stop reason", meta.stop_reason.clone().unwrap_or_else(unknown)),
        ViewNode::key_value("Streaming", if meta.is_streaming { "yes" } else { "no" }),
    ];
    if let Some(id) = &meta.id {
        rows.push(ViewNode::key_value("Message id", id.as_str()));
    }
    if let Some(stop_sequence) = &meta.stop_sequence {
        rows.push(ViewNode::key_value("Stop sequence", stop_sequence.as_str()));
    }

    ViewNode::section(
        "response-overview",
        SectionKind::Summary,
        "Response Overview",
        rows,
    )
}

fn usage_section(usage: &UsageReport) -> ViewNode {
    ViewNode::section(
        "token-usage",
        SectionKind::Summary,
        "Token Usage",
        vec![
            ViewNode::key_value("Input", usage.input_tokens.to_string()),
            ViewNode::key_value(
                "Cache creation",
                usage.cache_creation_input_tokens.to_string(),
            ),
            ViewNode::key_value("Cache read", usage.cache_read_input_tokens.to_string()),
            ViewNode::key_value("Total input", usage.total_input_tokens.to_string()),
            ViewNode::key_value("Output", usage.output_tokens.to_string()),
            ViewNode::key_value("Total", usage.total_tokens.to_string()),
            ViewNode::key_value("Cache efficiency", format!("{}%", usage.cache_efficiency)),
            ViewNode::key_value("Cache status", cache_status(&usage.cache_efficiency)),
            ViewNode::key_value("Output ratio", format!("{}%", usage.output_ratio)),
        ],
    )
}

/// Tier the cache hit rate for an at-a-glance verdict.
fn cache_status(efficiency: &str) -> &'static str {
    let pct: f64 = efficiency.parse().unwrap_or(0.0);
    if pct > 30.0 {
        "efficient"
    } else if pct > 10.0 {
        "moderate"
    } else {
        "low"
    }
}

// ---------------------------------------------------------------------------
// Content blocks
// ---------------------------------------------------------------------------

fn content_block_section(block: &ContentBlock) -> ViewNode {
    let id = format!("response-content-{}", block.index);
    let position = block.index + 1;

    match &block.body {
        ContentBody::Text {
            content,
            character_count,
            word_count,
        } => ViewNode::section(
            id,
            SectionKind::ContentBlock,
            format!("[{position}] text — {character_count} chars, {word_count} words"),
            vec![ViewNode::Code(content.clone())],
        ),
        ContentBody::ToolUse {
            id: tool_id,
            name,
            input,
            input_size,
        } => {
            let name = name.clone().unwrap_or_else(|| "unnamed".to_string());
            let mut children = Vec::new();
            if let Some(tool_id) = tool_id {
                children.push(ViewNode::key_value("Tool id", tool_id.as_str()));
            }
            children.push(ViewNode::key_value("Input", ""));
            children.push(ViewNode::Code(pretty(input)));

            ViewNode::section(
                id,
                SectionKind::ContentBlock,
                format!("[{position}] tool_use — {name}, {input_size} byte input"),
                children,
            )
        }
        ContentBody::Thinking {
            content,
            character_count,
        } => ViewNode::section(
            id,
            SectionKind::ContentBlock,
            format!("[{position}] thinking — {character_count} chars"),
            vec![
                ViewNode::key_value("Note", "internal reasoning trace, not shown to the user"),
                ViewNode::Code(content.clone()),
            ],
        ),
        ContentBody::Other { value } => ViewNode::section(
            id,
            SectionKind::ContentBlock,
            format!("[{position}] unknown block type"),
            vec![ViewNode::Code(pretty(value))],
        ),
    }
}

fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::response::parse;
    use crate::render::{CollapseState, to_html};
    use serde_json::json;

    fn render(model: &ResponseModel) -> String {
        let tree = view(model);
        to_html(&tree, &CollapseState::seeded_from(&tree))
    }

    fn sample() -> String {
        json!({
            "id": "msg_01",
            "model": "claude-3-5-sonnet",
            "role": "assistant",
            "stop_reason": "end_turn",
            "content": [
                {"type": "text", "text": "Hello there."},
                {"type": "tool_use", "id": "t1", "name": "bash", "input": {"cmd": "ls"}}
            ],
            "usage": {"input_tokens": 60, "output_tokens": 40,
                      "cache_read_input_tokens": 40}
        })
        .to_string()
    }

    #[test]
    fn renders_overview_usage_and_content() {
        let html = render(&parse(&sample()));

        assert!(html.contains("Response Overview"));
        assert!(html.contains("Token Usage"));
        assert!(html.contains("Response Content (2 blocks)"));
        assert!(html.contains("[1] text — 12 chars, 2 words"));
        assert!(html.contains("[2] tool_use — bash"));
        assert!(!html.contains("Total events"), "no streaming section for complete responses");
    }

    #[test]
    fn cache_status_tiers() {
        assert_eq!(cache_status("45.0"), "efficient");
        assert_eq!(cache_status("20.0"), "moderate");
        assert_eq!(cache_status("3.0"), "low");
        assert_eq!(cache_status("0.0"), "low");
    }

    #[test]
    fn usage_section_skipped_for_all_zero_usage() {
        let body = json!({
            "id": "m", "content": [],
            "usage": {"input_tokens": 0, "output_tokens": 0}
        })
        .to_string();
        let html = render(&parse(&body));

        assert!(!html.contains("Token Usage"));
    }

    #[test]
    fn response_text_is_escaped() {
        let body = json!({
            "id": "m",
            "content": [{"type": "text", "text": "<svg onload=alert(1)>"}],
            "usage": {"input_tokens": 1}
        })
        .to_string();
        let html = render(&parse(&body));

        assert!(!html.contains("<svg"));
        assert!(html.contains("&lt;svg"));
    }

    #[test]
    fn streaming_info_renders_event_summary() {
        let raw = "\
event: message_start
data: {\"type\":\"message_start\",\"message\":{\"id\":\"m\",\"model\":\"c\",\"role\":\"assistant\"}}
event: message_stop
data: {\"type\":\"message_stop\"}
";
        let html = render(&crate::inspector::response::parse_streaming(raw));

        assert!(html.contains("Streaming"));
        assert!(html.contains("message_start, message_stop"));
    }
}
