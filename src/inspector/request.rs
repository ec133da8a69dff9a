//! Request parsing — reconstruct a structured conversation model from a raw
//! messages-API request body.
//!
//! The parser runs synchronously to completion over the in-memory string.
//! A top-level JSON failure is recorded as a single entry in the model's
//! `errors` and leaves the rest of the model at its defaults; sub-steps fall
//! back to safe defaults (unknown role, empty input, skipped item) instead
//! of aborting the parse. Nothing ever throws past the public boundary.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::utils::token_estimate::estimate_tokens;

use super::pairing::{self, OrphanResult, PairedToolCall, ToolRecord, ToolResult, ToolStatus, ToolUse};
use super::reminders::{self, Reminder};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// The fully parsed request. Created fresh per inspection, discarded when
/// the next one starts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestModel {
    pub overview: Overview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,
    pub tools: Vec<ToolSpec>,
    pub messages: Vec<Message>,
    /// Tool results whose id never matched a use anywhere in the
    /// conversation.
    pub orphan_results: Vec<OrphanResult>,
    pub errors: Vec<String>,
}

/// Headline figures, derived and recomputed on every parse.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overview {
    pub model: String,
    /// `None` means the request did not set a limit — distinct from an
    /// explicit 0.
    pub max_tokens: Option<u64>,
    pub message_count: usize,
    pub tool_count: usize,
    pub has_system: bool,
    pub estimated_tokens: usize,
    pub thinking_enabled: bool,
    pub thinking_budget: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemPrompt {
    pub content: String,
    pub character_count: usize,
    pub word_count: usize,
}

/// A declared tool with its flattened parameter list.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: Value,
    pub parameters: Vec<ToolParam>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    /// True iff the name appears in the schema's `required` array.
    pub required: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Other,
}

impl Role {
    fn parse(role: &str) -> Self {
        match role {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other => "other",
        }
    }
}

/// A visible text block with its precomputed preview.
#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub text: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// 1-based position in the original request.
    pub index: usize,
    pub role: Role,
    pub content: Vec<TextContent>,
    pub system_reminders: Vec<Reminder>,
    /// Raw use/result records in order of appearance.
    pub tool_uses: Vec<ToolRecord>,
    /// Derived: every use in this message joined with its result.
    pub paired_tool_calls: Vec<PairedToolCall>,
}

// ---------------------------------------------------------------------------
// Statistics (consumed by `stats` output and the export document)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolUsageStat {
    pub count: usize,
    pub success: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageStats {
    pub user: usize,
    pub assistant: usize,
    pub system: usize,
    pub total_system_reminders: usize,
    pub total_tool_calls: usize,
}

impl RequestModel {
    /// Per-tool-name invocation counts across all paired calls.
    pub fn tool_usage_stats(&self) -> BTreeMap<String, ToolUsageStat> {
        let mut stats: BTreeMap<String, ToolUsageStat> = BTreeMap::new();
        for message in &self.messages {
            for call in &message.paired_tool_calls {
                let entry = stats.entry(call.name.clone()).or_default();
                entry.count += 1;
                match call.status {
                    ToolStatus::Success => entry.success += 1,
                    ToolStatus::Error => entry.error += 1,
                    ToolStatus::Pending => {}
                }
            }
        }
        stats
    }

    /// Conversation-level counts.
    pub fn message_stats(&self) -> MessageStats {
        let mut stats = MessageStats {
            system: usize::from(self.system.is_some()),
            ..Default::default()
        };
        for message in &self.messages {
            match message.role {
                Role::User => stats.user += 1,
                Role::Assistant => stats.assistant += 1,
                Role::Other => {}
            }
            stats.total_system_reminders += message.system_reminders.len();
            stats.total_tool_calls += message.paired_tool_calls.len();
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a raw request body into a [`RequestModel`].
pub fn parse(raw: &str) -> RequestModel {
    let mut model = RequestModel::default();

    let data: Value = match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(e) => {
            model.errors.push(format!("request body is not valid JSON: {e}"));
            return model;
        }
    };

    model.overview = parse_overview(&data);
    model.system = parse_system(&data);
    model.tools = parse_tools(&data);
    model.messages = parse_messages(&data);

    let records: Vec<(usize, &[ToolRecord])> = model
        .messages
        .iter()
        .map(|m| (m.index, m.tool_uses.as_slice()))
        .collect();
    let outcome = pairing::pair(&records);
    for (message, paired) in model.messages.iter_mut().zip(outcome.per_message) {
        message.paired_tool_calls = paired;
    }
    model.orphan_results = outcome.orphan_results;

    model
}

fn parse_overview(data: &Value) -> Overview {
    let thinking = data.get("thinking");
    Overview {
        model: data
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        max_tokens: data.get("max_tokens").and_then(Value::as_u64),
        message_count: data
            .get("messages")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        tool_count: data
            .get("tools")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        has_system: data.get("system").is_some(),
        estimated_tokens: estimate_tokens(&data.to_string()),
        thinking_enabled: thinking
            .and_then(|t| t.get("enabled"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        thinking_budget: thinking
            .and_then(|t| t.get("budget_tokens"))
            .and_then(Value::as_u64)
            .unwrap_or(0),
    }
}

fn parse_system(data: &Value) -> Option<SystemPrompt> {
    let system = data.get("system")?;
    // System prompts are usually plain strings, but structured variants
    // (content-block arrays) appear too; serialize those as-is.
    let content = match system {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(SystemPrompt {
        character_count: content.chars().count(),
        word_count: content.split_whitespace().count(),
        content,
    })
}

fn parse_tools(data: &Value) -> Vec<ToolSpec> {
    let Some(tools) = data.get("tools").and_then(Value::as_array) else {
        return Vec::new();
    };

    tools
        .iter()
        .map(|tool| {
            let schema = tool.get("input_schema").cloned().unwrap_or(Value::Null);
            ToolSpec {
                name: tool
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: tool
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                parameters: parse_tool_params(&schema),
                schema,
            }
        })
        .collect()
}

fn parse_tool_params(schema: &Value) -> Vec<ToolParam> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, prop)| ToolParam {
            name: name.clone(),
            param_type: prop
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            description: prop
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            required: required.contains(&name.as_str()),
            allowed_values: prop.get("enum").and_then(Value::as_array).map(|values| {
                values
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            }),
        })
        .collect()
}

fn parse_messages(data: &Value) -> Vec<Message> {
    let Some(messages) = data.get("messages").and_then(Value::as_array) else {
        return Vec::new();
    };

    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let mut parsed = Message {
                index: i + 1,
                role: message
                    .get("role")
                    .and_then(Value::as_str)
                    .map_or(Role::Other, Role::parse),
                content: Vec::new(),
                system_reminders: Vec::new(),
                tool_uses: Vec::new(),
                paired_tool_calls: Vec::new(),
            };

            match message.get("content") {
                Some(Value::Array(items)) => {
                    for item in items {
                        parse_content_item(item, &mut parsed);
                    }
                }
                Some(Value::String(text)) => parse_text_content(text, &mut parsed),
                _ => {}
            }

            parsed
        })
        .collect()
}

fn parse_content_item(item: &Value, message: &mut Message) {
    match item.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = item.get("text").and_then(Value::as_str) {
                parse_text_content(text, message);
            }
        }
        Some("tool_use") => {
            message.tool_uses.push(ToolRecord::Use(ToolUse {
                id: item
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                name: item
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                input: item.get("input").cloned().unwrap_or(Value::Null),
            }));
        }
        Some("tool_result") => {
            message.tool_uses.push(ToolRecord::Result(ToolResult {
                id: item
                    .get("tool_use_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                result: item.get("content").cloned().unwrap_or(Value::Null),
                is_error: item
                    .get("is_error")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }));
        }
        // Unknown item types are skipped, not fatal.
        _ => {}
    }
}

/// Split a text block into reminders and the remaining visible body.
fn parse_text_content(text: &str, message: &mut Message) {
    message.system_reminders.extend(reminders::extract(text));

    let clean = reminders::strip(text);
    if !clean.is_empty() {
        message.content.push(TextContent {
            preview: reminders::preview(&clean),
            text: clean,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
