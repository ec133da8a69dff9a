//! Server-Sent-Events reassembly — parse a raw SSE capture into ordered
//! typed events, then replay them into one merged response snapshot.
//!
//! The wire format is newline-delimited `event: <type>` / `data: <json>`
//! pairs. A streamed response arrives as deltas (`content_block_delta`
//! appends text fragments, `message_delta` updates usage snapshots) that
//! must be reduced, strictly in arrival order, into the same shape a
//! non-streaming response would have had.

use std::collections::BTreeMap;

use serde_json::Value;

use super::sniff::{SSE_DATA_PREFIX, SSE_EVENT_PREFIX};
use super::usage::RawUsage;

// ---------------------------------------------------------------------------
// Event scanning
// ---------------------------------------------------------------------------

/// One parsed SSE event. `data` is the JSON payload of the `data:` line, or
/// a JSON string wrapping the raw line when it does not parse; `None` when
/// the event had no `data:` line at all.
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub kind: String,
    pub data: Option<Value>,
}

/// Scan raw SSE text into ordered events.
///
/// An event opens at each `event: ` line and is flushed when the next one
/// starts; the final event is flushed at end of input. `data: ` lines seen
/// before any `event: ` line have no event to attach to and are dropped.
pub fn parse_events(raw: &str) -> Vec<SseEvent> {
    let mut events = Vec::new();
    let mut current: Option<SseEvent> = None;

    for line in raw.lines() {
        if let Some(kind) = line.strip_prefix(SSE_EVENT_PREFIX) {
            if let Some(event) = current.take() {
                events.push(event);
            }
            current = Some(SseEvent {
                kind: kind.to_string(),
                data: None,
            });
        } else if let Some(payload) = line.strip_prefix(SSE_DATA_PREFIX) {
            if let Some(event) = current.as_mut() {
                let data = serde_json::from_str(payload)
                    .unwrap_or_else(|_| Value::String(payload.to_string()));
                event.data = Some(data);
            }
        }
    }

    if let Some(event) = current.take() {
        events.push(event);
    }

    events
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// A content block under accumulation, addressed by its wire `index`.
#[derive(Debug, Clone, Default)]
pub struct BlockAccumulator {
    pub kind: String,
    pub text: String,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Side buffer for streamed tool-input JSON fragments. Cleared at
    /// `content_block_stop` whether or not the parse succeeds.
    input_json: String,
    pub input: Option<Value>,
}

/// The merged result of replaying a stream.
#[derive(Debug, Clone, Default)]
pub struct MergedStream {
    pub id: Option<String>,
    pub model: Option<String>,
    pub role: Option<String>,
    pub stop_reason: Option<String>,
    pub usage: RawUsage,
    /// True once any event carried a `usage` object.
    pub saw_usage: bool,
    /// Blocks keyed by wire index. Index values need not be contiguous or
    /// arrive in order, so slots live in an ordered map rather than a
    /// positional array.
    pub blocks: BTreeMap<u64, BlockAccumulator>,
    pub total_events: usize,
    /// Distinct event types in first-seen order.
    pub event_types: Vec<String>,
}

/// Replay `events` in arrival order into one merged snapshot.
pub fn reduce(events: &[SseEvent]) -> MergedStream {
    let mut merged = MergedStream {
        total_events: events.len(),
        ..Default::default()
    };

    for event in events {
        if !merged.event_types.iter().any(|t| t == &event.kind) {
            merged.event_types.push(event.kind.clone());
        }

        let Some(data) = event.data.as_ref() else {
            continue;
        };

        match event.kind.as_str() {
            "message_start" => apply_message_start(&mut merged, data),
            "content_block_start" => apply_block_start(&mut merged, data),
            "content_block_delta" => apply_block_delta(&mut merged, data),
            "content_block_stop" => apply_block_stop(&mut merged, data),
            "message_delta" => apply_message_delta(&mut merged, data),
            // `ping`, `message_stop` and unknown types carry nothing to
            // merge; they still count toward streaming info.
            _ => {}
        }
    }

    merged
}

fn apply_message_start(merged: &mut MergedStream, data: &Value) {
    let Some(message) = data.get("message") else {
        return;
    };
    merged.id = string_field(message, "id");
    merged.model = string_field(message, "model");
    merged.role = string_field(message, "role");
    if let Some(usage) = message.get("usage") {
        merged.usage.merge_from(usage);
        merged.saw_usage = true;
    }
}

fn apply_block_start(merged: &mut MergedStream, data: &Value) {
    let Some(index) = data.get("index").and_then(Value::as_u64) else {
        return;
    };
    let Some(block) = data.get("content_block") else {
        return;
    };

    merged.blocks.insert(
        index,
        BlockAccumulator {
            kind: string_field(block, "type").unwrap_or_default(),
            text: string_field(block, "text").unwrap_or_default(),
            id: string_field(block, "id"),
            name: string_field(block, "name"),
            input_json: String::new(),
            input: None,
        },
    );
}

fn apply_block_delta(merged: &mut MergedStream, data: &Value) {
    let Some(index) = data.get("index").and_then(Value::as_u64) else {
        return;
    };
    // Deltas for an index that never saw a start have nowhere to land.
    let Some(block) = merged.blocks.get_mut(&index) else {
        return;
    };
    let Some(delta) = data.get("delta") else {
        return;
    };

    match delta.get("type").and_then(Value::as_str) {
        Some("text_delta") => {
            if let Some(text) = delta.get("text").and_then(Value::as_str) {
                block.text.push_str(text);
            }
        }
        Some("input_json_delta") => {
            if let Some(partial) = delta.get("partial_json").and_then(Value::as_str) {
                block.input_json.push_str(partial);
            }
        }
        _ => {}
    }
}

fn apply_block_stop(merged: &mut MergedStream, data: &Value) {
    let Some(index) = data.get("index").and_then(Value::as_u64) else {
        return;
    };
    let Some(block) = merged.blocks.get_mut(&index) else {
        return;
    };

    if !block.input_json.is_empty() {
        let buffer = std::mem::take(&mut block.input_json);
        // Keep the raw accumulated string when the fragments never formed
        // valid JSON (truncated stream).
        block.input =
            Some(serde_json::from_str(&buffer).unwrap_or_else(|_| Value::String(buffer)));
    }
}

fn apply_message_delta(merged: &mut MergedStream, data: &Value) {
    if let Some(delta) = data.get("delta") {
        if let Some(reason) = delta.get("stop_reason").and_then(Value::as_str) {
            merged.stop_reason = Some(reason.to_string());
        }
    }
    if let Some(usage) = data.get("usage") {
        merged.usage.merge_from(usage);
        merged.saw_usage = true;
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
