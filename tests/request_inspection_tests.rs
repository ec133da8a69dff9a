use prism::inspector::pairing::ToolStatus;
use prism::inspector::reminders;
use prism::inspector::request;
use prism::utils::token_estimate::estimate_tokens;
use serde_json::json;

// ---------------------------------------------------------------------------
// Full request parse — a realistic agent transcript
// ---------------------------------------------------------------------------

fn agent_request() -> String {
    json!({
        "model": "claude-3-5-sonnet-20241022",
        "max_tokens": 8192,
        "system": "You are a coding agent. Keep answers short.",
        "tools": [
            {
                "name": "read_file",
                "description": "Read a file from disk",
                "input_schema": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "Absolute path"},
                        "encoding": {"type": "string", "enum": ["utf-8", "latin-1"]}
                    },
                    "required": ["path"]
                }
            },
            {
                "name": "bash",
                "description": "Run a shell command",
                "input_schema": {
                    "type": "object",
                    "properties": {
                        "command": {"type": "string"}
                    },
                    "required": ["command"]
                }
            }
        ],
        "messages": [
            {"role": "user", "content":
                "Fix the failing test.\n<system-reminder>Follow the repo's \
                 instructions and keep diffs minimal.</system-reminder>"},
            {"role": "assistant", "content": [
                {"type": "text", "text": "Looking at the test file first."},
                {"type": "tool_use", "id": "toolu_aa", "name": "read_file",
                 "input": {"path": "/src/test.rs"}}
            ]},
            {"role": "user", "content": [
                {"type": "tool_result", "tool_use_id": "toolu_aa",
                 "content": "fn broken() { assert!(false) }"}
            ]},
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "toolu_bb", "name": "bash",
                 "input": {"command": "cargo test"}}
            ]},
            {"role": "user", "content": [
                {"type": "tool_result", "tool_use_id": "toolu_bb",
                 "content": "test failed: assertion failed", "is_error": true}
            ]}
        ]
    })
    .to_string()
}

#[test]
fn full_transcript_parses_into_expected_shape() {
    let model = request::parse(&agent_request());

    assert!(model.errors.is_empty());
    assert_eq!(model.overview.model, "claude-3-5-sonnet-20241022");
    assert_eq!(model.overview.message_count, 5);
    assert_eq!(model.overview.tool_count, 2);
    assert_eq!(model.messages.len(), 5);
    assert_eq!(model.tools.len(), 2);
    assert!(model.system.is_some());
    assert!(model.orphan_results.is_empty());
}

#[test]
fn each_use_pairs_with_its_cross_message_result() {
    let model = request::parse(&agent_request());

    let read_call = &model.messages[1].paired_tool_calls[0];
    assert_eq!(read_call.name, "read_file");
    assert_eq!(read_call.status, ToolStatus::Success);
    assert!(read_call.result.is_some());

    let bash_call = &model.messages[3].paired_tool_calls[0];
    assert_eq!(bash_call.name, "bash");
    assert_eq!(bash_call.status, ToolStatus::Error);
    assert!(bash_call.is_error);
}

#[test]
fn pairing_is_stable_across_reparses() {
    let first = request::parse(&agent_request());
    let second = request::parse(&agent_request());

    let statuses = |m: &request::RequestModel| {
        m.messages
            .iter()
            .flat_map(|msg| msg.paired_tool_calls.iter())
            .map(|c| (c.id.clone(), c.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(statuses(&first), statuses(&second));
}

#[test]
fn reminder_is_extracted_and_classified_from_string_content() {
    let model = request::parse(&agent_request());
    let first = &model.messages[0];

    assert_eq!(first.system_reminders.len(), 1);
    assert_eq!(first.system_reminders[0].kind, reminders::ReminderKind::Instruction);
    assert_eq!(first.content.len(), 1);
    assert_eq!(first.content[0].text, "Fix the failing test.");
}

#[test]
fn required_flag_follows_the_schema_required_set() {
    let model = request::parse(&agent_request());
    let read_file = &model.tools[0];

    let path = read_file.parameters.iter().find(|p| p.name == "path").unwrap();
    let encoding = read_file
        .parameters
        .iter()
        .find(|p| p.name == "encoding")
        .unwrap();

    assert!(path.required);
    assert!(!encoding.required);
    assert_eq!(
        encoding.allowed_values.as_deref(),
        Some(&["utf-8".to_string(), "latin-1".to_string()][..])
    );
}

// ---------------------------------------------------------------------------
// Reminder round-trip property
// ---------------------------------------------------------------------------

#[test]
fn extraction_plus_removal_preserves_all_characters() {
    let text = "prefix <system-reminder>alpha</system-reminder> middle \
                <system-reminder>beta</system-reminder> suffix";

    let extracted = reminders::extract(text);
    let remainder = reminders::strip(text);

    // Every character outside the tags survives in the remainder, and the
    // tag contents survive in the extraction — nothing is lost but markup.
    assert_eq!(extracted.len(), 2);
    assert_eq!(extracted[0].content, "alpha");
    assert_eq!(extracted[1].content, "beta");
    for word in ["prefix", "middle", "suffix"] {
        assert!(remainder.contains(word), "{word} must survive removal");
    }
}

#[test]
fn unterminated_tag_neither_matches_nor_hangs() {
    let text = "real text <system-reminder>this never ends";
    let model = request::parse(
        &json!({"model": "m", "messages": [{"role": "user", "content": text}]}).to_string(),
    );

    let message = &model.messages[0];
    assert!(message.system_reminders.is_empty());
    assert_eq!(message.content[0].text, text);
}

// ---------------------------------------------------------------------------
// Token estimation properties
// ---------------------------------------------------------------------------

#[test]
fn estimator_components_are_ceiled_separately() {
    assert_eq!(estimate_tokens(&"中".repeat(10)), 7);
    assert_eq!(estimate_tokens(&"a".repeat(40)), 10);

    // CJK-then-ASCII and ASCII-then-CJK must agree.
    let cjk_first = format!("{}{}", "中".repeat(10), "a".repeat(40));
    let ascii_first = format!("{}{}", "a".repeat(40), "中".repeat(10));
    assert_eq!(estimate_tokens(&cjk_first), 17);
    assert_eq!(estimate_tokens(&ascii_first), 17);
}

#[test]
fn overview_estimate_covers_the_whole_serialized_request() {
    let small = request::parse(r#"{"model": "m", "messages": []}"#);
    let large = request::parse(
        &json!({"model": "m", "messages": [
            {"role": "user", "content": "x".repeat(4000)}
        ]})
        .to_string(),
    );

    assert!(large.overview.estimated_tokens > small.overview.estimated_tokens + 900);
}

// ---------------------------------------------------------------------------
// Failure behavior
// ---------------------------------------------------------------------------

#[test]
fn invalid_json_gives_one_error_and_defaults_everywhere_else() {
    let model = request::parse("]{ definitely not json");

    assert_eq!(model.errors.len(), 1);
    assert_eq!(model.overview.model, "");
    assert_eq!(model.overview.message_count, 0);
    assert!(!model.overview.thinking_enabled);
    assert!(model.messages.is_empty());
    assert!(model.tools.is_empty());
    assert!(model.orphan_results.is_empty());
}
