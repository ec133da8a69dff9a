//! Tool-call pairing — correlate tool invocations with their results across
//! the message sequence.
//!
//! A tool use issued by the assistant in message N is answered by a
//! `tool_result` carrying the same id, usually in a *later* user message.
//! Pairing therefore runs in two passes over the full ordered message list:
//! first collect every use and result into an id-keyed map (first use wins,
//! last result wins), then emit one paired call per use, attached to the
//! message that contains the use — with whatever result the map holds by
//! the end of the scan.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A tool invocation issued by the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// A returned tool value, correlated to its use by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub id: String,
    pub result: Value,
    pub is_error: bool,
}

/// A raw tool record as it appeared in a message's content array.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolRecord {
    Use(ToolUse),
    Result(ToolResult),
}

// ---------------------------------------------------------------------------
// Paired calls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// No result seen anywhere in the conversation.
    Pending,
    Success,
    Error,
}

/// A use joined with its (possibly later-arriving) result. Owned by the
/// message containing the use.
#[derive(Debug, Clone, Serialize)]
pub struct PairedToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
    pub result: Option<Value>,
    pub is_error: bool,
    pub status: ToolStatus,
    pub is_thinking: bool,
}

/// A result whose id never matched a use. Kept visible at the model level
/// so no record silently disappears from the paired view.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanResult {
    pub id: String,
    pub result: Value,
    pub is_error: bool,
    /// 1-based index of the message that carried the result.
    pub message_index: usize,
}

/// Result of pairing: one paired-call list per input message (parallel to
/// the input order) plus the orphaned results.
#[derive(Debug, Clone, Default)]
pub struct PairingOutcome {
    pub per_message: Vec<Vec<PairedToolCall>>,
    pub orphan_results: Vec<OrphanResult>,
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

struct PairSlot<'a> {
    tool_use: Option<&'a ToolUse>,
    result: Option<&'a ToolResult>,
    result_message: usize,
}

/// Pair tool records across messages. Each input entry is the message's
/// 1-based index and its raw records in original order. Deterministic and
/// idempotent: the same input always yields the same outcome.
pub fn pair<'a>(records_by_message: &[(usize, &'a [ToolRecord])]) -> PairingOutcome {
    let mut slots: HashMap<&'a str, PairSlot<'a>> = HashMap::new();
    let mut id_order: Vec<&'a str> = Vec::new();

    let empty_slot = || PairSlot {
        tool_use: None,
        result: None,
        result_message: 0,
    };

    // Pass 1: collect. The first use for an id claims the slot and is never
    // overwritten; a later result overwrites an earlier one.
    for (message_index, records) in records_by_message {
        for record in *records {
            match record {
                ToolRecord::Use(tool_use) => {
                    let slot = slots.entry(tool_use.id.as_str()).or_insert_with(empty_slot);
                    if slot.tool_use.is_none() && slot.result.is_none() {
                        id_order.push(tool_use.id.as_str());
                    }
                    if slot.tool_use.is_none() {
                        slot.tool_use = Some(tool_use);
                    }
                }
                ToolRecord::Result(result) => {
                    let slot = slots.entry(result.id.as_str()).or_insert_with(empty_slot);
                    if slot.tool_use.is_none() && slot.result.is_none() {
                        id_order.push(result.id.as_str());
                    }
                    slot.result = Some(result);
                    slot.result_message = *message_index;
                }
            }
        }
    }

    // Pass 2: emit. Every use surfaces as a paired call on its own message;
    // results attach from the fully built map, so a use in message 1 can
    // carry a result recorded in message 3.
    let per_message = records_by_message
        .iter()
        .map(|(_, records)| {
            records
                .iter()
                .filter_map(|record| match record {
                    ToolRecord::Use(tool_use) => {
                        let slot = slots.get(tool_use.id.as_str())?;
                        Some(paired_call(tool_use, slot.result))
                    }
                    ToolRecord::Result(_) => None,
                })
                .collect()
        })
        .collect();

    let orphan_results = id_order
        .iter()
        .filter_map(|id| {
            let slot = &slots[id];
            if slot.tool_use.is_some() {
                return None;
            }
            let result = slot.result?;
            Some(OrphanResult {
                id: result.id.clone(),
                result: result.result.clone(),
                is_error: result.is_error,
                message_index: slot.result_message,
            })
        })
        .collect();

    PairingOutcome {
        per_message,
        orphan_results,
    }
}

fn paired_call(tool_use: &ToolUse, result: Option<&ToolResult>) -> PairedToolCall {
    let status = match result {
        None => ToolStatus::Pending,
        Some(r) if r.is_error => ToolStatus::Error,
        Some(_) => ToolStatus::Success,
    };

    PairedToolCall {
        id: tool_use.id.clone(),
        name: tool_use.name.clone(),
        input: tool_use.input.clone(),
        result: result.map(|r| r.result.clone()),
        is_error: result.is_some_and(|r| r.is_error),
        status,
        is_thinking: result.is_some_and(is_thinking_result),
    }
}

/// Heuristic for results that are actually reasoning traces: a `thinking`
/// marker anywhere in the serialized result, or an object tagged
/// `type: "thinking"`.
fn is_thinking_result(result: &ToolResult) -> bool {
    if result.result.get("type").and_then(Value::as_str) == Some("thinking") {
        return true;
    }
    let serialized = match &result.result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    serialized.contains("<thinking>") || serialized.contains("thinking")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
