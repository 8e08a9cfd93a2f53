//! Incremental terminal rendering for coding-agent `stream-json` transcripts.
//!
//! Invariant: one event in, one fragment out. [`EventProcessor::process`] handles each event to
//! completion before the next line is read, so nothing here locks or suspends.
//!
//! # Public API Overview
//! - Decode lines with [`parse_line`] (re-exported from `stream_events`).
//! - Feed events to an [`EventProcessor`] built with a [`Renderer`] and a [`ProcessorConfig`].
//! - Inspect pending tool calls via [`ToolUseTracker`] and running totals via [`SessionState`].
//! - Use the text helpers for ANSI-safe width and truncation.

pub mod config;
pub mod logging;
pub mod processor;
pub mod render;
pub mod session;
pub mod stream_state;
pub mod text;
pub mod tracker;

pub use stream_events::{parse_line, ContentBlock, Event, ParseError, ToolInput};

/// Settings and environment configuration.
pub use crate::config::{EnvConfig, ProcessorConfig};
/// Event orchestration.
pub use crate::processor::{EventProcessor, Processed, NO_RESULT_MARKER};
/// Rendering collaborators.
pub use crate::render::{PlainRenderer, Renderer, ToolResultContext};
/// Session totals.
pub use crate::session::{CurrentTool, SessionState, TodoItem, TodoStatus};
/// Streaming suppression.
pub use crate::stream_state::{StreamState, StreamTransition};
/// Pending tool call tracking.
pub use crate::tracker::{
    FlushedToolUse, PendingSnapshot, PendingToolUse, ResolvedToolUse, ToolInvocation, ToolMatch,
    ToolUseTracker,
};

/// Visible width helper that ignores ANSI control sequences.
pub use crate::text::visible_width;
/// ANSI-aware truncation helper.
pub use crate::text::truncate_to_width;
