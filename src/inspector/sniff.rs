//! Payload shape detection — decide whether a raw capture looks like a
//! messages-API request, a complete response, or a streamed SSE response.
//!
//! This is shape sniffing, not validation: the probes check for the minimal
//! field set each shape carries and nothing more.

use serde_json::Value;

// ---------------------------------------------------------------------------
// Probe fields
// ---------------------------------------------------------------------------

/// A request must carry a `model` string and a `messages` array.
pub const REQUEST_PROBES: [&str; 2] = ["model", "messages"];

/// A complete response must carry a `content` array and a `usage` object.
pub const RESPONSE_PROBES: [&str; 2] = ["content", "usage"];

/// Line prefixes that identify an SSE stream.
pub const SSE_EVENT_PREFIX: &str = "event: ";
pub const SSE_DATA_PREFIX: &str = "data: ";

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// The recognized payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Request,
    Response,
    StreamingResponse,
    Unrecognized,
}

impl PayloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::StreamingResponse => "streaming-response",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Sniff the shape of a raw payload.
///
/// Valid JSON is probed for the request field set first, then the response
/// set. Non-JSON text is a streamed response iff it contains both an
/// `event: ` line and a `data: ` line.
pub fn detect(raw: &str) -> PayloadKind {
    if let Ok(data) = serde_json::from_str::<Value>(raw) {
        if is_request_shape(&data) {
            return PayloadKind::Request;
        }
        if is_response_shape(&data) {
            return PayloadKind::Response;
        }
        return PayloadKind::Unrecognized;
    }

    if looks_like_sse(raw) {
        return PayloadKind::StreamingResponse;
    }

    PayloadKind::Unrecognized
}

fn is_request_shape(data: &Value) -> bool {
    let [model, messages] = REQUEST_PROBES;
    data.get(model).is_some_and(Value::is_string)
        && data.get(messages).is_some_and(Value::is_array)
}

fn is_response_shape(data: &Value) -> bool {
    let [content, usage] = RESPONSE_PROBES;
    data.get(content).is_some_and(Value::is_array) && data.get(usage).is_some_and(Value::is_object)
}

fn looks_like_sse(raw: &str) -> bool {
    let mut has_event = false;
    let mut has_data = false;
    for line in raw.lines() {
        has_event |= line.starts_with(SSE_EVENT_PREFIX);
        has_data |= line.starts_with(SSE_DATA_PREFIX);
        if has_event && has_data {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_request_shape() {
        let raw = r#"{"model": "claude-3-5-sonnet", "messages": [], "max_tokens": 100}"#;
        assert_eq!(detect(raw), PayloadKind::Request);
    }

    #[test]
    fn detects_response_shape() {
        let raw = r#"{"id": "msg_1", "content": [], "usage": {"input_tokens": 1}}"#;
        assert_eq!(detect(raw), PayloadKind::Response);
    }

    #[test]
    fn request_shape_wins_over_response_shape() {
        // Both field sets present: the request probe runs first.
        let raw = r#"{"model": "m", "messages": [], "content": [], "usage": {}}"#;
        assert_eq!(detect(raw), PayloadKind::Request);
    }

    #[test]
    fn detects_sse_stream() {
        let raw = "event: message_start\ndata: {\"type\":\"message_start\"}\n";
        assert_eq!(detect(raw), PayloadKind::StreamingResponse);
    }

    #[test]
    fn json_with_wrong_fields_is_unrecognized() {
        assert_eq!(detect(r#"{"foo": 1}"#), PayloadKind::Unrecognized);
        // `model` present but `messages` is not an array
        assert_eq!(
            detect(r#"{"model": "m", "messages": "nope"}"#),
            PayloadKind::Unrecognized
        );
    }

    #[test]
    fn plain_text_is_unrecognized() {
        assert_eq!(detect("just some text"), PayloadKind::Unrecognized);
        assert_eq!(detect("event: lonely\n"), PayloadKind::Unrecognized);
    }
}
