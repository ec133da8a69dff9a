//! System-reminder extraction — pull `<system-reminder>…</system-reminder>`
//! annotation blocks out of message text and classify them.
//!
//! Reminder blocks are injected inline into message text by agent tooling.
//! The inspector surfaces them separately from the visible message body, so
//! this module provides both sides of the split: extraction of the annotated
//! blocks and removal of their spans from the original text.
//!
//! Unterminated or malformed tags are simply not matched; their text stays
//! inline as ordinary content.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Delimiter syntax
// ---------------------------------------------------------------------------

// The delimiter pair lives here and nowhere else. Callers only see
// `extract` / `strip`, so swapping the tag syntax is a one-file change.
const OPEN_TAG: &str = "<system-reminder>";
const CLOSE_TAG: &str = "</system-reminder>";

/// Non-greedy, multi-occurrence match over the full tag span. `(?s)` lets
/// `.` cross newlines since reminder bodies are frequently multi-line.
static REMINDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?s){}(.*?){}",
        regex::escape(OPEN_TAG),
        regex::escape(CLOSE_TAG)
    ))
    .expect("reminder regex must compile")
});

/// Maximum characters shown in a collapsed preview line.
pub const PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Classification of a reminder block, decided by a case-insensitive keyword
/// scan over its content. The scan order is a fixed priority: an annotation
/// mentioning both "context" and "tool" classifies as `Context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Context,
    Tool,
    Reminder,
    Instruction,
    General,
}

impl ReminderKind {
    fn classify(content: &str) -> Self {
        let lower = content.to_lowercase();
        if lower.contains("context") {
            Self::Context
        } else if lower.contains("tool") {
            Self::Tool
        } else if lower.contains("reminder") {
            Self::Reminder
        } else if lower.contains("instruction") {
            Self::Instruction
        } else {
            Self::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Tool => "tool",
            Self::Reminder => "reminder",
            Self::Instruction => "instruction",
            Self::General => "general",
        }
    }
}

/// One extracted reminder block.
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    /// Inner text of the tag, trimmed.
    pub content: String,
    /// First [`PREVIEW_CHARS`] characters of the content, with a trailing
    /// ellipsis when truncated.
    pub preview: String,
    pub kind: ReminderKind,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extract all reminder blocks from `text`, in order of appearance.
pub fn extract(text: &str) -> Vec<Reminder> {
    REMINDER_RE
        .captures_iter(text)
        .map(|caps| {
            let content = caps[1].trim().to_string();
            Reminder {
                preview: preview(&content),
                kind: ReminderKind::classify(&content),
                content,
            }
        })
        .collect()
}

/// Remove every matched reminder span from `text` and trim the remainder.
pub fn strip(text: &str) -> String {
    REMINDER_RE.replace_all(text, "").trim().to_string()
}

/// Truncate `text` to a preview line of at most [`PREVIEW_CHARS`] characters,
/// appending an ellipsis when anything was cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{truncated}...")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
