//! Request view — project a [`RequestModel`] into the section tree.
//!
//! Pure presentation: nothing in here mutates the model or re-parses.

use serde_json::Value;

use crate::inspector::pairing::{OrphanResult, PairedToolCall, ToolRecord, ToolStatus};
use crate::inspector::request::{Message, RequestModel, Role, ToolSpec};

use super::{SectionKind, ViewNode};

/// Build the request view. `newest_first` reverses the already-parsed
/// message list at view level only.
pub fn view(model: &RequestModel, newest_first: bool) -> ViewNode {
    let mut sections = vec![overview_section(model)];

    let mut messages: Vec<&Message> = model.messages.iter().collect();
    if newest_first {
        messages.reverse();
    }
    sections.push(ViewNode::section(
        "conversation",
        SectionKind::Group,
        format!("Conversation ({} messages)", model.messages.len()),
        messages.iter().map(|m| message_section(m)).collect(),
    ));

    sections.push(system_section(model));

    if !model.orphan_results.is_empty() {
        sections.push(orphan_section(&model.orphan_results));
    }

    if !model.errors.is_empty() {
        sections.push(errors_section(&model.errors));
    }

    ViewNode::Fragment(sections)
}

fn errors_section(errors: &[String]) -> ViewNode {
    ViewNode::section(
        "parse-errors",
        SectionKind::Errors,
        "Parse Errors",
        errors.iter().map(|e| ViewNode::Alert(e.clone())).collect(),
    )
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn overview_section(model: &RequestModel) -> ViewNode {
    let overview = &model.overview;
    let mut stats = vec![
        ViewNode::stat("Model", overview.model.as_str()),
        ViewNode::stat(
            "Max tokens",
            overview
                .max_tokens
                .map_or_else(|| "not set".to_string(), |n| n.to_string()),
        ),
        ViewNode::stat("Messages", overview.message_count.to_string()),
        ViewNode::stat("Tools", overview.tool_count.to_string()),
    ];
    if overview.thinking_enabled {
        stats.push(ViewNode::stat(
            "Thinking budget",
            format!("{} tokens", overview.thinking_budget),
        ));
    }
    if overview.estimated_tokens > 0 {
        stats.push(ViewNode::stat(
            "Estimated tokens",
            format!("~{}", overview.estimated_tokens),
        ));
    }

    ViewNode::section(
        "request-overview",
        SectionKind::Overview,
        "Request Overview",
        stats,
    )
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

fn message_section(message: &Message) -> ViewNode {
    let mut children = Vec::new();

    for (i, content) in message.content.iter().enumerate() {
        let id = format!("message-{}-content-{i}", message.index);
        children.push(ViewNode::section(
            id,
            SectionKind::TextContent,
            format!("Text ({} chars)", content.text.chars().count()),
            vec![ViewNode::Code(content.text.clone())],
        ));
        children.push(ViewNode::Preview(content.preview.clone()));
    }

    if !message.system_reminders.is_empty() {
        children.push(reminders_section(message));
    }

    // Assistant messages show the paired view; user messages show the raw
    // records (that is where tool results physically live).
    match message.role {
        Role::Assistant if !message.paired_tool_calls.is_empty() => {
            children.push(paired_calls_section(message));
        }
        Role::User | Role::Other if !message.tool_uses.is_empty() => {
            children.push(raw_records_section(message));
        }
        _ => {}
    }

    ViewNode::section(
        format!("message-{}", message.index),
        SectionKind::Message,
        format!("[{}] {}", message.index, role_label(message.role)),
        children,
    )
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
        Role::Other => "Other",
    }
}

fn reminders_section(message: &Message) -> ViewNode {
    let items = message
        .system_reminders
        .iter()
        .enumerate()
        .map(|(i, reminder)| {
            ViewNode::section(
                format!("reminder-{}-{i}", message.index),
                SectionKind::ReminderItem,
                format!("{}: {}", reminder.kind.as_str(), reminder.preview),
                vec![ViewNode::Code(reminder.content.clone())],
            )
        })
        .collect();

    ViewNode::section(
        format!("message-{}-reminders", message.index),
        SectionKind::Reminders,
        format!("System Reminders ({})", message.system_reminders.len()),
        items,
    )
}

fn paired_calls_section(message: &Message) -> ViewNode {
    let items = message
        .paired_tool_calls
        .iter()
        .enumerate()
        .map(|(i, call)| paired_call_item(call, message.index, i))
        .collect();

    ViewNode::section(
        format!("message-{}-tools", message.index),
        SectionKind::ToolCalls,
        format!("Tool Calls ({})", message.paired_tool_calls.len()),
        items,
    )
}

fn paired_call_item(call: &PairedToolCall, message_index: usize, i: usize) -> ViewNode {
    let status = match call.status {
        ToolStatus::Pending => "pending",
        ToolStatus::Success => "success",
        ToolStatus::Error => "error",
    };
    let thinking = if call.is_thinking { " (thinking)" } else { "" };

    let mut children = vec![
        ViewNode::key_value("Status", status),
        ViewNode::key_value("Input", ""),
        ViewNode::Code(pretty(&call.input)),
    ];
    match &call.result {
        Some(result) => {
            children.push(ViewNode::key_value("Result", ""));
            children.push(ViewNode::Code(pretty(result)));
        }
        None => children.push(ViewNode::key_value("Result", "awaiting result")),
    }

    ViewNode::section(
        format!("toolcall-{message_index}-{i}"),
        SectionKind::ToolCallItem,
        format!("{} — {status}{thinking}", call.name),
        children,
    )
}

fn raw_records_section(message: &Message) -> ViewNode {
    let items = message
        .tool_uses
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let id = format!("user-tool-{}-{i}", message.index);
            match record {
                ToolRecord::Use(tool_use) => ViewNode::section(
                    id,
                    SectionKind::ToolCallItem,
                    format!("{} (use)", tool_use.name),
                    vec![ViewNode::Code(pretty(&tool_use.input))],
                ),
                ToolRecord::Result(result) => ViewNode::section(
                    id,
                    SectionKind::ToolCallItem,
                    format!(
                        "Result for {}{}",
                        result.id,
                        if result.is_error { " — error" } else { "" }
                    ),
                    vec![ViewNode::Code(pretty(&result.result))],
                ),
            }
        })
        .collect();

    ViewNode::section(
        format!("message-{}-user-tools", message.index),
        SectionKind::ToolCalls,
        format!("Tool Records ({})", message.tool_uses.len()),
        items,
    )
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

fn system_section(model: &RequestModel) -> ViewNode {
    let mut children = Vec::new();

    if let Some(system) = &model.system {
        children.push(ViewNode::section(
            "system-prompt",
            SectionKind::SystemPrompt,
            format!(
                "System Prompt ({} chars, {} words)",
                system.character_count, system.word_count
            ),
            vec![ViewNode::Code(system.content.clone())],
        ));
    }

    if !model.tools.is_empty() {
        children.push(ViewNode::section(
            "declared-tools",
            SectionKind::ToolsList,
            format!("Declared Tools ({})", model.tools.len()),
            model.tools.iter().map(tool_item).collect(),
        ));
    }

    if children.is_empty() {
        children.push(ViewNode::key_value(
            "System",
            "no system prompt or tools declared",
        ));
    }

    ViewNode::section(
        "system-config",
        SectionKind::Group,
        "System Configuration",
        children,
    )
}

fn tool_item(tool: &ToolSpec) -> ViewNode {
    let mut children = Vec::new();

    if !tool.description.is_empty() {
        children.push(ViewNode::section(
            format!("tool-desc-{}", tool.name),
            SectionKind::ToolDetail,
            "Description",
            vec![ViewNode::Code(tool.description.clone())],
        ));
    }

    if !tool.parameters.is_empty() {
        let params = tool
            .parameters
            .iter()
            .map(|param| {
                let mut value = format!("({})", param.param_type);
                value.push_str(if param.required {
                    " required"
                } else {
                    " optional"
                });
                if !param.description.is_empty() {
                    value.push_str(" — ");
                    value.push_str(&param.description);
                }
                if let Some(allowed) = &param.allowed_values {
                    value.push_str(&format!(" [{}]", allowed.join(", ")));
                }
                ViewNode::key_value(param.name.as_str(), value)
            })
            .collect();

        children.push(ViewNode::section(
            format!("tool-params-{}", tool.name),
            SectionKind::ToolDetail,
            format!("Parameters ({})", tool.parameters.len()),
            params,
        ));
    }

    ViewNode::section(
        format!("tool-{}", tool.name),
        SectionKind::ToolItem,
        tool.name.as_str(),
        children,
    )
}

// ---------------------------------------------------------------------------
// Orphan results
// ---------------------------------------------------------------------------

fn orphan_section(orphans: &[OrphanResult]) -> ViewNode {
    let items = orphans
        .iter()
        .enumerate()
        .map(|(i, orphan)| {
            ViewNode::section(
                format!("orphan-{i}"),
                SectionKind::ToolCallItem,
                format!(
                    "{} (message {}){}",
                    orphan.id,
                    orphan.message_index,
                    if orphan.is_error { " — error" } else { "" }
                ),
                vec![ViewNode::Code(pretty(&orphan.result))],
            )
        })
        .collect();

    ViewNode::section(
        "orphan-results",
        SectionKind::OrphanResults,
        format!("Unmatched Tool Results ({})", orphans.len()),
        items,
    )
}

/// Pretty-print a JSON value; bare strings print without quoting noise.
fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
