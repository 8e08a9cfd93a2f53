//! Rendering collaborators.
//!
//! The processor decides *what* appears and in which order; a [`Renderer`] only turns one piece
//! into a string. Fragments may or may not end in a newline; the processor normalises that.

pub mod plain;

pub use plain::PlainRenderer;

use serde_json::Value;
use stream_events::{ResultEvent, SystemEvent};

use crate::session::SessionState;
use crate::tracker::ToolInvocation;

/// Everything known about a finished tool call at the moment its result is rendered.
#[derive(Debug, Clone, Copy)]
pub struct ToolResultContext<'a> {
    pub invocation: &'a ToolInvocation,
    pub content: Option<&'a Value>,
    pub is_error: bool,
    /// Structured `tool_use_result` payload from the same user event, when present.
    pub side_channel: Option<&'a Value>,
}

impl ToolResultContext<'_> {
    /// Result content flattened to text. Arrays of parts keep only their text parts.
    pub fn content_text(&self) -> String {
        match self.content {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(parts)) => parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(text) => Some(text.as_str()),
                    other => other.get("text").and_then(Value::as_str),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Some(other) => other.to_string(),
        }
    }
}

pub trait Renderer {
    fn system(&self, event: &SystemEvent) -> String;

    fn text(&self, text: &str) -> String;

    /// One incremental piece of a streamed text block.
    fn text_delta(&self, text: &str) -> String {
        text.to_string()
    }

    fn assistant_error(&self, error: &str) -> String;

    fn tool_header(&self, invocation: &ToolInvocation) -> String;

    fn tool_result(&self, context: &ToolResultContext<'_>) -> String;

    /// Stand-in body for a call that never received a result.
    fn no_result(&self, invocation: &ToolInvocation, marker: &str) -> String;

    /// `preview` is already reduced to a single line.
    fn subagent_prompt(&self, preview: &str) -> String;

    fn result_summary(&self, event: &ResultEvent, session: &SessionState) -> String;
}
