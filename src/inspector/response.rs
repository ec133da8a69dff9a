//! Response parsing — metadata, usage accounting, and content blocks from a
//! complete JSON response or a reassembled SSE stream.
//!
//! Both paths converge on the same [`ContentBlock`] variants, so the
//! renderer never needs to know whether the payload was streamed.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::sse;
use super::usage::{self, RawUsage, UsageReport};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseModel {
    pub metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageReport>,
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming_info: Option<StreamingInfo>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseMetadata {
    pub id: Option<String>,
    pub model: Option<String>,
    pub role: Option<String>,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub is_streaming: bool,
    /// RFC 3339 timestamp of when this model was assembled.
    pub completed_at: String,
}

/// Present only when the source was a streamed payload.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingInfo {
    pub total_events: usize,
    /// Distinct event types in first-seen order.
    pub event_types: Vec<String>,
}

/// One classified content block, carrying its original array position.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    pub index: usize,
    #[serde(flatten)]
    pub body: ContentBody,
}

/// The block variants a response can carry. Anything unrecognized is kept
/// raw rather than dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBody {
    Text {
        content: String,
        character_count: usize,
        word_count: usize,
    },
    ToolUse {
        id: Option<String>,
        name: Option<String>,
        input: Value,
        /// Length of the serialized input, a rough size signal.
        input_size: usize,
    },
    Thinking {
        content: String,
        character_count: usize,
    },
    Other {
        value: Value,
    },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a complete (non-streaming) JSON response body.
pub fn parse(raw: &str) -> ResponseModel {
    let mut model = ResponseModel::default();

    let data: Value = match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(e) => {
            model
                .errors
                .push(format!("response body is not valid JSON: {e}"));
            return model;
        }
    };

    model.metadata = ResponseMetadata {
        id: string_field(&data, "id"),
        model: string_field(&data, "model"),
        role: string_field(&data, "role"),
        stop_reason: string_field(&data, "stop_reason"),
        stop_sequence: string_field(&data, "stop_sequence"),
        is_streaming: false,
        completed_at: Utc::now().to_rfc3339(),
    };

    if let Some(raw_usage) = data.get("usage") {
        model.usage = Some(usage::derive(&RawUsage::from_value(raw_usage)));
    }

    if let Some(content) = data.get("content").and_then(Value::as_array) {
        model.content = content
            .iter()
            .enumerate()
            .map(|(i, block)| classify_block(block, i))
            .collect();
    }

    model
}

/// Parse a streamed SSE response body by replaying its events.
pub fn parse_streaming(raw: &str) -> ResponseModel {
    let events = sse::parse_events(raw);
    let merged = sse::reduce(&events);

    let content = merged
        .blocks
        .values()
        .enumerate()
        .map(|(i, block)| classify_streamed_block(block, i))
        .collect();

    ResponseModel {
        metadata: ResponseMetadata {
            id: merged.id,
            model: merged.model,
            role: merged.role,
            stop_reason: merged.stop_reason,
            stop_sequence: None,
            is_streaming: true,
            completed_at: Utc::now().to_rfc3339(),
        },
        usage: merged.saw_usage.then(|| usage::derive(&merged.usage)),
        content,
        streaming_info: Some(StreamingInfo {
            total_events: merged.total_events,
            event_types: merged.event_types,
        }),
        errors: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Block classification
// ---------------------------------------------------------------------------

fn classify_block(block: &Value, index: usize) -> ContentBlock {
    let body = match block.get("type").and_then(Value::as_str) {
        Some("text") => text_body(
            block
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        Some("tool_use") => tool_use_body(
            string_field(block, "id"),
            string_field(block, "name"),
            block.get("input").cloned().unwrap_or(Value::Null),
        ),
        Some("thinking") => thinking_body(
            block
                .get("thinking")
                .or_else(|| block.get("content"))
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        _ => ContentBody::Other {
            value: block.clone(),
        },
    };
    ContentBlock { index, body }
}

/// Streamed blocks accumulate text in `text` regardless of their kind, so
/// the classifier reads from the accumulator rather than the wire shape.
fn classify_streamed_block(block: &sse::BlockAccumulator, index: usize) -> ContentBlock {
    let body = match block.kind.as_str() {
        "text" => text_body(&block.text),
        "tool_use" => tool_use_body(
            block.id.clone(),
            block.name.clone(),
            block.input.clone().unwrap_or(Value::Null),
        ),
        "thinking" => thinking_body(&block.text),
        _ => ContentBody::Other {
            value: serde_json::json!({
                "type": block.kind,
                "content": block.text,
            }),
        },
    };
    ContentBlock { index, body }
}

fn text_body(text: &str) -> ContentBody {
    ContentBody::Text {
        character_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        content: text.to_string(),
    }
}

fn tool_use_body(id: Option<String>, name: Option<String>, input: Value) -> ContentBody {
    ContentBody::ToolUse {
        input_size: input.to_string().len(),
        id,
        name,
        input,
    }
}

fn thinking_body(text: &str) -> ContentBody {
    ContentBody::Thinking {
        character_count: text.chars().count(),
        content: text.to_string(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> String {
        json!({
            "id": "msg_01",
            "type": "message",
            "model": "claude-3-5-sonnet",
            "role": "assistant",
            "stop_reason": "tool_use",
            "stop_sequence": null,
            "content": [
                {"type": "thinking", "thinking": "User wants weather."},
                {"type": "text", "text": "Let me check that for you."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_weather",
                 "input": {"city": "Oslo"}}
            ],
            "usage": {
                "input_tokens": 100,
                "output_tokens": 50,
                "cache_creation_input_tokens": 20,
                "cache_read_input_tokens": 30
            }
        })
        .to_string()
    }

    #[test]
    fn parses_metadata() {
        let model = parse(&sample_response());

        assert_eq!(model.metadata.id.as_deref(), Some("msg_01"));
        assert_eq!(model.metadata.stop_reason.as_deref(), Some("tool_use"));
        assert!(!model.metadata.is_streaming);
        assert!(model.streaming_info.is_none());
        assert!(!model.metadata.completed_at.is_empty());
    }

    #[test]
    fn derives_usage_totals() {
        let model = parse(&sample_response());
        let usage = model.usage.unwrap();

        assert_eq!(usage.total_input_tokens, 150);
        assert_eq!(usage.total_tokens, 200);
        assert_eq!(usage.cache_efficiency, "20.0");
        assert_eq!(usage.output_ratio, "25.0");
    }

    #[test]
    fn classifies_blocks_in_array_order() {
        let model = parse(&sample_response());

        assert_eq!(model.content.len(), 3);
        assert!(matches!(model.content[0].body, ContentBody::Thinking { .. }));
        assert!(matches!(model.content[1].body, ContentBody::Text { .. }));
        assert!(matches!(model.content[2].body, ContentBody::ToolUse { .. }));
        assert_eq!(model.content[2].index, 2);
    }

    #[test]
    fn text_blocks_carry_counts() {
        let model = parse(&sample_response());
        let ContentBody::Text {
            character_count,
            word_count,
            ..
        } = &model.content[1].body
        else {
            panic!("expected text block");
        };

        assert_eq!(*character_count, 26);
        assert_eq!(*word_count, 6);
    }

    #[test]
    fn unknown_block_types_are_kept_raw() {
        let body = json!({
            "id": "msg",
            "content": [{"type": "server_tool_use", "weird": true}],
            "usage": {"input_tokens": 1}
        })
        .to_string();
        let model = parse(&body);

        let ContentBody::Other { value } = &model.content[0].body else {
            panic!("expected raw block");
        };
        assert_eq!(value.get("weird"), Some(&json!(true)));
    }

    #[test]
    fn missing_usage_yields_none() {
        let model = parse(r#"{"id": "msg", "content": []}"#);
        assert!(model.usage.is_none());
    }

    #[test]
    fn malformed_body_records_single_error() {
        let model = parse("event: not json");

        assert_eq!(model.errors.len(), 1);
        assert!(model.content.is_empty());
        assert!(model.usage.is_none());
        assert!(model.metadata.id.is_none());
    }

    #[test]
    fn streaming_parse_reduces_to_final_shape() {
        let raw = "\
event: message_start
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_s\",\"model\":\"claude-3-5-haiku\",\"role\":\"assistant\",\"usage\":{\"input_tokens\":10}}}
event: content_block_start
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}
event: content_block_delta
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}
event: content_block_delta
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" there\"}}
event: content_block_stop
data: {\"type\":\"content_block_stop\",\"index\":0}
event: message_delta
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":3}}
event: message_stop
data: {\"type\":\"message_stop\"}
";
        let model = parse_streaming(raw);

        assert!(model.metadata.is_streaming);
        assert_eq!(model.metadata.id.as_deref(), Some("msg_s"));
        assert_eq!(model.metadata.stop_reason.as_deref(), Some("end_turn"));

        assert_eq!(model.content.len(), 1);
        let ContentBody::Text { content, .. } = &model.content[0].body else {
            panic!("expected text block");
        };
        assert_eq!(content, "Hi there");

        let usage = model.usage.unwrap();
        assert_eq!(usage.input_tokens, 10);
        assert_eq!(usage.output_tokens, 3);

        let info = model.streaming_info.unwrap();
        assert_eq!(info.total_events, 7);
        assert!(info.event_types.contains(&"message_stop".to_string()));
    }

    #[test]
    fn streaming_without_usage_yields_none() {
        let raw = "event: ping\ndata: {\"type\":\"ping\"}\n";
        let model = parse_streaming(raw);

        assert!(model.usage.is_none());
        assert_eq!(model.streaming_info.unwrap().total_events, 1);
    }
}
