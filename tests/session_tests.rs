use prism::export;
use prism::inspector::{InspectorSession, ParsedModel, PayloadKind, sniff};
use serde_json::json;

// ---------------------------------------------------------------------------
// Shape detection
// ---------------------------------------------------------------------------

#[test]
fn detect_distinguishes_the_three_shapes() {
    let request = r#"{"model": "claude-3-5-sonnet", "messages": []}"#;
    let response = r#"{"id": "m", "content": [], "usage": {"input_tokens": 1}}"#;
    let stream = "event: message_start\ndata: {\"type\":\"message_start\"}\n";

    assert_eq!(sniff::detect(request), PayloadKind::Request);
    assert_eq!(sniff::detect(response), PayloadKind::Response);
    assert_eq!(sniff::detect(stream), PayloadKind::StreamingResponse);
    assert_eq!(sniff::detect("hello"), PayloadKind::Unrecognized);
}

#[test]
fn session_routes_each_shape_to_the_right_parser() {
    let request = InspectorSession::inspect(r#"{"model": "m", "messages": []}"#);
    assert!(matches!(request.model, Some(ParsedModel::Request(_))));

    let response =
        InspectorSession::inspect(r#"{"id": "m", "content": [], "usage": {"input_tokens": 1}}"#);
    assert!(matches!(response.model, Some(ParsedModel::Response(_))));

    let stream = InspectorSession::inspect(
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"s\"}}\n",
    );
    let Some(ParsedModel::Response(model)) = &stream.model else {
        panic!("expected streamed response model");
    };
    assert!(model.metadata.is_streaming);
}

// ---------------------------------------------------------------------------
// Rendering through the session
// ---------------------------------------------------------------------------

fn request_payload() -> String {
    json!({
        "model": "claude-3-5-sonnet",
        "max_tokens": 1024,
        "system": "be helpful",
        "messages": [
            {"role": "user", "content": "run `ls` for me & tell me <what> you see"},
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "t1", "name": "bash", "input": {"command": "ls"}}
            ]}
        ]
    })
    .to_string()
}

#[test]
fn rendered_document_is_standalone_html() {
    let session = InspectorSession::inspect(&request_payload());
    let doc = session.render_document();

    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert!(doc.contains("Request Inspection"));
    assert!(doc.contains("function prismToggle"));
    assert!(doc.contains("Request Overview"));
}

#[test]
fn untrusted_payload_strings_never_reach_output_unescaped() {
    let body = json!({
        "model": "claude\" onmouseover=\"alert(1)",
        "system": "<iframe src=evil></iframe>",
        "messages": [
            {"role": "user", "content": "click <a href='x'>here</a>"},
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "t1", "name": "<b>bold-tool</b>",
                 "input": {"html": "<script>boom()</script>"}}
            ]}
        ]
    })
    .to_string();
    let session = InspectorSession::inspect(&body);
    let html = session.render_html();

    assert!(!html.contains("<iframe"));
    assert!(!html.contains("<script>boom"));
    assert!(!html.contains("<b>bold-tool</b>"));
    assert!(!html.contains("<a href='x'>"));
    assert!(html.contains("&lt;iframe"));
    assert!(html.contains("&lt;script&gt;boom()&lt;/script&gt;"));
}

#[test]
fn toggling_a_section_survives_re_render_without_reparsing() {
    let mut session = InspectorSession::inspect(&request_payload());

    let collapsed = session.render_html();
    assert!(collapsed.contains("id=\"request-overview\" style=\"display: none;\""));

    session.toggle("request-overview");
    let expanded = session.render_html();
    assert!(expanded.contains("id=\"request-overview\" style=\"display: block;\""));

    // Model is untouched by view-state changes.
    assert_eq!(
        session.model_json()["overview"]["model"],
        json!("claude-3-5-sonnet")
    );
}

#[test]
fn newest_first_is_applied_at_view_time() {
    let mut session = InspectorSession::inspect(&request_payload());
    session.set_newest_first(true);
    let html = session.render_html();

    let assistant = html.find("[2] Assistant").expect("assistant header");
    let user = html.find("[1] User").expect("user header");
    assert!(assistant < user);
}

// ---------------------------------------------------------------------------
// Export through the session
// ---------------------------------------------------------------------------

#[test]
fn request_export_matches_the_parsed_model() {
    let session = InspectorSession::inspect(&request_payload());
    let doc = export::analysis_document(&session).unwrap();

    assert_eq!(doc["summary"]["message_count"], 2);
    assert_eq!(doc["summary"]["has_system_prompt"], true);
    assert_eq!(doc["statistics"]["tools"]["bash"]["count"], 1);
    assert_eq!(doc["overview"]["max_tokens"], 1024);
}

#[test]
fn response_export_includes_streaming_info_for_streams() {
    let raw = "\
event: message_start
data: {\"type\":\"message_start\",\"message\":{\"id\":\"s\",\"model\":\"c\",\"role\":\"assistant\",\"usage\":{\"input_tokens\":2}}}
event: message_delta
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":1}}
";
    let session = InspectorSession::inspect(raw);
    let doc = export::analysis_document(&session).unwrap();

    assert_eq!(doc["streaming_info"]["total_events"], 2);
    assert_eq!(doc["usage"]["total_tokens"], 3);
    assert_eq!(doc["metadata"]["is_streaming"], true);
}

#[test]
fn unrecognized_payloads_export_nothing_but_still_render() {
    let session = InspectorSession::inspect("plain text, nothing to see");

    assert!(export::analysis_document(&session).is_none());
    assert!(session.render_html().contains("not recognized"));
}
