//! Payload inspection core.
//!
//! Two symmetric pipelines — one for requests, one for responses — each
//! with a parser (raw text → structured model) and a renderer projection
//! (model → collapsible section tree, in [`crate::render`]). The
//! [`InspectorSession`] is the single owner of one inspection's state:
//! detected payload kind, parsed model, and view collapse state.

pub mod pairing;
pub mod reminders;
pub mod request;
pub mod response;
pub mod sniff;
pub mod sse;
pub mod usage;

use serde_json::Value;

use crate::render::{self, CollapseState, ViewNode};

pub use sniff::PayloadKind;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The parsed model held by a session — exactly one of the two shapes.
#[derive(Debug, Clone)]
pub enum ParsedModel {
    Request(request::RequestModel),
    Response(response::ResponseModel),
}

/// One inspection, from raw payload to rendered view.
///
/// Created fresh per inspection and passed explicitly into render and
/// export calls; dropping it discards all inspection state. Collapse
/// toggling mutates only the view-state map, never the parsed model, and
/// re-rendering never re-invokes the parser.
#[derive(Debug, Clone)]
pub struct InspectorSession {
    pub kind: PayloadKind,
    pub model: Option<ParsedModel>,
    collapse: CollapseState,
    /// View-level message ordering; flipping it is pure presentation.
    newest_first: bool,
}

impl InspectorSession {
    /// Sniff the payload shape and parse accordingly. `Unrecognized`
    /// payloads produce a session with no model; callers render a
    /// diagnostic instead.
    pub fn inspect(raw: &str) -> Self {
        Self::inspect_as(raw, sniff::detect(raw))
    }

    /// Parse with an explicit kind, bypassing detection. Used when the
    /// caller already knows the capture is e.g. a streamed response.
    pub fn inspect_as(raw: &str, kind: PayloadKind) -> Self {
        let model = match kind {
            PayloadKind::Request => Some(ParsedModel::Request(request::parse(raw))),
            PayloadKind::Response => Some(ParsedModel::Response(response::parse(raw))),
            PayloadKind::StreamingResponse => {
                Some(ParsedModel::Response(response::parse_streaming(raw)))
            }
            PayloadKind::Unrecognized => None,
        };

        let mut session = Self {
            kind,
            model,
            collapse: CollapseState::default(),
            newest_first: false,
        };
        session.collapse = CollapseState::seeded_from(&session.view());
        session
    }

    /// Project the parsed model into a section tree. Pure: the same session
    /// state always yields the same tree.
    pub fn view(&self) -> ViewNode {
        match &self.model {
            Some(ParsedModel::Request(model)) => render::request::view(model, self.newest_first),
            Some(ParsedModel::Response(model)) => render::response::view(model),
            None => render::unrecognized_view(),
        }
    }

    /// Render the current view to an HTML fragment.
    pub fn render_html(&self) -> String {
        render::to_html(&self.view(), &self.collapse)
    }

    /// Render a complete standalone HTML document.
    pub fn render_document(&self) -> String {
        render::to_document(&self.view(), &self.collapse, self.title())
    }

    /// Flip one section's collapse state. View state only.
    pub fn toggle(&mut self, section_id: &str) {
        self.collapse.toggle(section_id);
    }

    /// Flip message ordering (newest first). Reorders the already-parsed
    /// list at view time; the model is untouched.
    pub fn set_newest_first(&mut self, newest_first: bool) {
        self.newest_first = newest_first;
    }

    /// The parsed model as plain JSON, for API consumers.
    pub fn model_json(&self) -> Value {
        match &self.model {
            Some(ParsedModel::Request(model)) => {
                serde_json::to_value(model).unwrap_or(Value::Null)
            }
            Some(ParsedModel::Response(model)) => {
                serde_json::to_value(model).unwrap_or(Value::Null)
            }
            None => Value::Null,
        }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            PayloadKind::Request => "Request Inspection",
            PayloadKind::Response | PayloadKind::StreamingResponse => "Response Inspection",
            PayloadKind::Unrecognized => "Inspection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_and_parses_a_request() {
        let session = InspectorSession::inspect(r#"{"model": "m", "messages": []}"#);

        assert_eq!(session.kind, PayloadKind::Request);
        assert!(matches!(session.model, Some(ParsedModel::Request(_))));
    }

    #[test]
    fn explicit_kind_bypasses_detection() {
        let raw = "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"m\"}}\n";
        let session = InspectorSession::inspect_as(raw, PayloadKind::StreamingResponse);

        let Some(ParsedModel::Response(model)) = &session.model else {
            panic!("expected response model");
        };
        assert!(model.metadata.is_streaming);
    }

    #[test]
    fn unrecognized_payload_has_no_model() {
        let session = InspectorSession::inspect("garbage");

        assert_eq!(session.kind, PayloadKind::Unrecognized);
        assert!(session.model.is_none());
        assert_eq!(session.model_json(), Value::Null);
        // Still renders a diagnostic view rather than panicking.
        assert!(session.render_html().contains("not recognized"));
    }

    #[test]
    fn toggle_changes_view_state_not_model() {
        let mut session = InspectorSession::inspect(r#"{"model": "m", "messages": []}"#);
        let before_model = session.model_json();
        let before_html = session.render_html();

        session.toggle("request-overview");
        let after_html = session.render_html();

        assert_eq!(session.model_json(), before_model);
        assert_ne!(before_html, after_html);
    }
}
