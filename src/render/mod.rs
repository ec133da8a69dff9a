//! View rendering — project parsed models into a tree of labeled sections
//! and emit it as HTML.
//!
//! The split is deliberate: renderers in [`request`] and [`response`] build
//! a [`ViewNode`] tree (pure projection, no markup), and [`to_html`] turns
//! tree + collapse state into markup. Collapse state is an explicit
//! per-section boolean map seeded from fixed per-kind defaults, so the
//! emitted structure is a pure function of (model, state map) and can be
//! snapshot-tested without a DOM.
//!
//! Every model-derived string is HTML-escaped at the emission boundary —
//! section titles included, since they carry tool names and previews.

pub mod request;
pub mod response;

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// View tree
// ---------------------------------------------------------------------------

/// Section categories. The kind fixes a section's initial collapse state
/// and its CSS class; it is not user-configurable at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Request overview stat grid.
    Overview,
    /// Non-collapsible grouping header (conversation, system config).
    Group,
    /// One message's container.
    Message,
    /// A message's visible text body.
    TextContent,
    /// Reminder list under a message.
    Reminders,
    /// One extracted reminder.
    ReminderItem,
    /// Paired/raw tool call list under a message. Open by default: tool
    /// activity is usually what the operator came to see.
    ToolCalls,
    /// One tool call with input/result details.
    ToolCallItem,
    /// System prompt body.
    SystemPrompt,
    /// Declared tool list.
    ToolsList,
    /// One declared tool.
    ToolItem,
    /// Description/parameter subsection of a declared tool.
    ToolDetail,
    /// Results that never matched a use.
    OrphanResults,
    /// Compact non-collapsible response summary (overview, usage, stream).
    Summary,
    /// One response content block.
    ContentBlock,
    /// Parse error list.
    Errors,
}

impl SectionKind {
    pub fn collapsible(self) -> bool {
        !matches!(self, Self::Group | Self::Message | Self::Summary | Self::Errors)
    }

    /// Initial expanded/collapsed state for sections of this kind.
    pub fn default_expanded(self) -> bool {
        match self {
            Self::ToolCalls => true,
            _ => !self.collapsible(),
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Group => "group",
            Self::Message => "message",
            Self::TextContent => "text-content",
            Self::Reminders => "reminders",
            Self::ReminderItem => "reminder-item",
            Self::ToolCalls => "tool-calls",
            Self::ToolCallItem => "tool-call",
            Self::SystemPrompt => "system-prompt",
            Self::ToolsList => "tools-list",
            Self::ToolItem => "tool-item",
            Self::ToolDetail => "tool-detail",
            Self::OrphanResults => "orphan-results",
            Self::Summary => "summary",
            Self::ContentBlock => "content-block",
            Self::Errors => "errors",
        }
    }
}

/// One node of the view tree.
#[derive(Debug, Clone)]
pub enum ViewNode {
    /// A labeled, possibly collapsible container.
    Section {
        id: String,
        kind: SectionKind,
        title: String,
        children: Vec<ViewNode>,
    },
    /// Invisible root/wrapper.
    Fragment(Vec<ViewNode>),
    /// A stat card (label over value).
    Stat { label: String, value: String },
    /// A compact label/value row.
    KeyValue { label: String, value: String },
    /// Preformatted content.
    Code(String),
    /// One-line preview shown outside a collapsed body.
    Preview(String),
    /// An error or notice line.
    Alert(String),
}

impl ViewNode {
    pub fn section(
        id: impl Into<String>,
        kind: SectionKind,
        title: impl Into<String>,
        children: Vec<ViewNode>,
    ) -> Self {
        Self::Section {
            id: id.into(),
            kind,
            title: title.into(),
            children,
        }
    }

    pub fn stat(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Stat {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn key_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::KeyValue {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Diagnostic tree for payloads the sniffer could not place.
pub fn unrecognized_view() -> ViewNode {
    ViewNode::section(
        "unrecognized",
        SectionKind::Errors,
        "Inspection",
        vec![ViewNode::Alert(
            "payload shape not recognized: expected a messages-API request, \
             a response object, or an SSE stream"
                .to_string(),
        )],
    )
}

// ---------------------------------------------------------------------------
// Collapse state
// ---------------------------------------------------------------------------

/// Per-section expanded/collapsed booleans, keyed by section id.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    states: HashMap<String, bool>,
}

impl CollapseState {
    /// Seed every section in `tree` with its kind's default state.
    pub fn seeded_from(tree: &ViewNode) -> Self {
        let mut state = Self::default();
        state.seed(tree);
        state
    }

    fn seed(&mut self, node: &ViewNode) {
        match node {
            ViewNode::Section {
                id, kind, children, ..
            } => {
                self.states.insert(id.clone(), kind.default_expanded());
                for child in children {
                    self.seed(child);
                }
            }
            ViewNode::Fragment(children) => {
                for child in children {
                    self.seed(child);
                }
            }
            _ => {}
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.states.get(id).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, id: &str) {
        let expanded = self.is_expanded(id);
        self.states.insert(id.to_string(), !expanded);
    }
}

// ---------------------------------------------------------------------------
// HTML emission
// ---------------------------------------------------------------------------

/// Escape a string for embedding in HTML text or attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Section ids land in HTML id attributes; restrict them to a safe set.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Emit the tree as an HTML fragment.
pub fn to_html(tree: &ViewNode, collapse: &CollapseState) -> String {
    let mut out = String::new();
    emit(tree, collapse, &mut out);
    out
}

fn emit(node: &ViewNode, collapse: &CollapseState, out: &mut String) {
    match node {
        ViewNode::Section {
            id,
            kind,
            title,
            children,
        } => emit_section(id, *kind, title, children, collapse, out),
        ViewNode::Fragment(children) => {
            for child in children {
                emit(child, collapse, out);
            }
        }
        ViewNode::Stat { label, value } => {
            out.push_str(&format!(
                "<div class=\"stat\"><div class=\"stat-label\">{}</div>\
                 <div class=\"stat-value\">{}</div></div>\n",
                escape(label),
                escape(value)
            ));
        }
        ViewNode::KeyValue { label, value } => {
            out.push_str(&format!(
                "<div class=\"kv\"><span class=\"kv-label\">{}</span>\
                 <span class=\"kv-value\">{}</span></div>\n",
                escape(label),
                escape(value)
            ));
        }
        ViewNode::Code(text) => {
            out.push_str(&format!("<pre class=\"code\">{}</pre>\n", escape(text)));
        }
        ViewNode::Preview(text) => {
            out.push_str(&format!("<div class=\"preview\">{}</div>\n", escape(text)));
        }
        ViewNode::Alert(text) => {
            out.push_str(&format!("<div class=\"alert\">{}</div>\n", escape(text)));
        }
    }
}

fn emit_section(
    id: &str,
    kind: SectionKind,
    title: &str,
    children: &[ViewNode],
    collapse: &CollapseState,
    out: &mut String,
) {
    let dom_id = sanitize_id(id);
    out.push_str(&format!(
        "<div class=\"section {}\">\n",
        kind.css_class()
    ));

    if kind.collapsible() {
        let expanded = collapse.is_expanded(id);
        let icon = if expanded { "▼" } else { "▶" };
        let display = if expanded { "block" } else { "none" };
        out.push_str(&format!(
            "<div class=\"section-header\" onclick=\"prismToggle('{dom_id}')\">\
             <span class=\"collapse-icon\" id=\"{dom_id}-icon\">{icon}</span> {}</div>\n",
            escape(title)
        ));
        out.push_str(&format!(
            "<div class=\"section-body\" id=\"{dom_id}\" style=\"display: {display};\">\n"
        ));
    } else {
        out.push_str(&format!(
            "<div class=\"section-title\">{}</div>\n<div class=\"section-body\">\n",
            escape(title)
        ));
    }

    for child in children {
        emit(child, collapse, out);
    }
    out.push_str("</div>\n</div>\n");
}

/// Wrap a fragment in a complete standalone document with embedded styles
/// and the collapse-toggle script.
pub fn to_document(tree: &ViewNode, collapse: &CollapseState, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n\
         <div class=\"inspection\">\n<h1>{}</h1>\n{}</div>\n\
         <script>{}</script>\n</body>\n</html>\n",
        escape(title),
        DOCUMENT_CSS,
        escape(title),
        to_html(tree, collapse),
        TOGGLE_JS,
    )
}

/// Flips a section body and its icon. Client-side view state only.
pub const TOGGLE_JS: &str = "\
function prismToggle(id) {
  const body = document.getElementById(id);
  const icon = document.getElementById(id + '-icon');
  if (!body) return;
  const hidden = body.style.display === 'none';
  body.style.display = hidden ? 'block' : 'none';
  if (icon) icon.textContent = hidden ? '\\u25bc' : '\\u25b6';
}";

/// Standalone-document styles, kept in the dashboard's palette.
const DOCUMENT_CSS: &str = "\
:root { --bg: #0d1117; --surface: #161b22; --border: #30363d; --text: #e6edf3;
  --text-muted: #8b949e; --accent: #58a6ff; --red: #f85149; --radius: 8px;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-size: 14px; line-height: 1.5;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; }
.inspection { max-width: 960px; margin: 0 auto; padding: 24px; }
h1 { font-size: 20px; margin-bottom: 16px; }
.section { background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); margin-bottom: 8px; }
.section .section { margin: 8px; }
.section-header { padding: 8px 12px; cursor: pointer; font-weight: 600; }
.section-header:hover { color: var(--accent); }
.section-title { padding: 8px 12px; font-weight: 600; border-bottom: 1px solid var(--border); }
.section-body { padding: 8px 12px; }
.collapse-icon { color: var(--text-muted); margin-right: 4px; }
.stat { display: inline-block; min-width: 140px; margin: 4px 12px 4px 0; }
.stat-label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }
.stat-value { font-size: 18px; font-weight: 600; }
.kv { padding: 2px 0; }
.kv-label { color: var(--text-muted); margin-right: 8px; }
.code { background: var(--bg); border: 1px solid var(--border); border-radius: var(--radius);
  padding: 8px; overflow-x: auto; font-family: var(--mono); font-size: 13px;
  white-space: pre-wrap; word-break: break-word; }
.preview { color: var(--text-muted); font-size: 13px; padding: 2px 0 6px; }
.alert { color: var(--red); border: 1px solid var(--red); border-radius: var(--radius);
  padding: 8px 12px; margin: 4px 0; }
.errors .section-title { color: var(--red); }";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#39;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn section_titles_are_escaped() {
        let tree = ViewNode::section(
            "s1",
            SectionKind::ToolCallItem,
            "<img src=x onerror=alert(1)>",
            vec![],
        );
        let html = to_html(&tree, &CollapseState::seeded_from(&tree));

        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn code_bodies_are_escaped() {
        let tree = ViewNode::Code("</pre><b>break out</b>".to_string());
        let html = to_html(&tree, &CollapseState::default());

        assert!(!html.contains("</pre><b>"));
        assert!(html.contains("&lt;/pre&gt;"));
    }

    #[test]
    fn collapsed_sections_start_hidden() {
        let tree = ViewNode::section("s1", SectionKind::TextContent, "Body", vec![]);
        let state = CollapseState::seeded_from(&tree);
        let html = to_html(&tree, &state);

        assert!(html.contains("display: none"));
        assert!(html.contains("▶"));
    }

    #[test]
    fn tool_calls_start_expanded() {
        let tree = ViewNode::section("s1", SectionKind::ToolCalls, "Tool Calls", vec![]);
        let state = CollapseState::seeded_from(&tree);
        let html = to_html(&tree, &state);

        assert!(html.contains("display: block"));
        assert!(html.contains("▼"));
    }

    #[test]
    fn toggling_flips_rendered_state() {
        let tree = ViewNode::section("s1", SectionKind::TextContent, "Body", vec![]);
        let mut state = CollapseState::seeded_from(&tree);

        assert!(to_html(&tree, &state).contains("display: none"));
        state.toggle("s1");
        assert!(to_html(&tree, &state).contains("display: block"));
    }

    #[test]
    fn emission_is_deterministic() {
        let tree = ViewNode::Fragment(vec![
            ViewNode::section(
                "a",
                SectionKind::Overview,
                "Overview",
                vec![ViewNode::stat("Model", "claude")],
            ),
            ViewNode::section("b", SectionKind::Errors, "Errors", vec![]),
        ]);
        let state = CollapseState::seeded_from(&tree);

        assert_eq!(to_html(&tree, &state), to_html(&tree, &state));
    }

    #[test]
    fn section_ids_are_sanitized_for_dom_use() {
        let tree = ViewNode::section(
            "tool weird\"name",
            SectionKind::ToolItem,
            "t",
            vec![],
        );
        let html = to_html(&tree, &CollapseState::seeded_from(&tree));

        assert!(html.contains("id=\"tool_weird_name\""));
        assert!(!html.contains("weird\"name"));
    }

    #[test]
    fn document_embeds_fragment_and_toggle_script() {
        let tree = ViewNode::section("s1", SectionKind::Overview, "Overview", vec![]);
        let state = CollapseState::seeded_from(&tree);
        let doc = to_document(&tree, &state, "Request Inspection");

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("Request Inspection"));
        assert!(doc.contains("function prismToggle"));
    }
}
