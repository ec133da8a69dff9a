//! Analysis export — serialize an inspection into a downloadable JSON
//! document.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Value, json};

use crate::inspector::response::{ContentBlock, ContentBody, ResponseModel};
use crate::inspector::request::RequestModel;
use crate::inspector::{InspectorSession, ParsedModel};

/// Document format version, bumped when the export shape changes.
const EXPORT_VERSION: &str = "1.0";

/// Build the analysis document for whatever the session parsed.
///
/// Returns `None` for sessions without a model (unrecognized payloads).
pub fn analysis_document(session: &InspectorSession) -> Option<Value> {
    match session.model.as_ref()? {
        ParsedModel::Request(model) => Some(request_analysis(model)),
        ParsedModel::Response(model) => Some(response_analysis(model)),
    }
}

/// Request analysis: overview plus aggregate statistics, not the full
/// conversation — the raw payload is already available to whoever exports.
pub fn request_analysis(model: &RequestModel) -> Value {
    let message_stats = model.message_stats();
    let tool_stats = model.tool_usage_stats();

    json!({
        "metadata": {
            "export_time": Utc::now().to_rfc3339(),
            "version": EXPORT_VERSION,
        },
        "overview": model.overview,
        "statistics": {
            "messages": message_stats,
            "tools": tool_stats,
            "total_tool_calls": message_stats.total_tool_calls,
            "total_system_reminders": message_stats.total_system_reminders,
        },
        "summary": {
            "message_count": model.messages.len(),
            "tool_count": model.tools.len(),
            "has_system_prompt": model.system.is_some(),
            "has_errors": !model.errors.is_empty(),
        },
    })
}

/// Response analysis: metadata, usage, per-block size summary.
pub fn response_analysis(model: &ResponseModel) -> Value {
    json!({
        "metadata": model.metadata,
        "usage": model.usage,
        "content_summary": model.content.iter().map(block_summary).collect::<Vec<_>>(),
        "streaming_info": model.streaming_info,
        "export_time": Utc::now().to_rfc3339(),
    })
}

fn block_summary(block: &ContentBlock) -> Value {
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
    json!({ "type": kind, "size": size })
}

/// Serialize a document for writing, pretty or compact.
pub fn to_json_string(document: &Value, pretty: bool) -> Result<String> {
    let serialized = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    serialized.context("failed serializing analysis document")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
