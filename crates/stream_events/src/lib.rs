//! Typed model and line parser for agent `stream-json` output.
//!
//! Every input line is one self-describing JSON object whose `type` field selects one of five
//! payload shapes. [`parse_line`] classifies the line and decodes it into an [`Event`]; decode
//! failures are carried as [`Event::ParseError`] so callers can report them and keep reading.
//!
//! Tool invocation arguments are kept opaque ([`ToolInput`]) and only interpreted by whoever
//! renders a specific tool.

pub mod content;
pub mod error;
pub mod events;
pub mod parse;

pub use content::{ContentBlock, ToolInput, Usage};
pub use error::ParseError;
pub use events::{
    AssistantEvent, AssistantMessage, BlockDelta, Event, McpServer, MessageDeltaInfo,
    PermissionDenial, ResultEvent, StreamBlock, StreamDelta, StreamEvent, SystemEvent, UserEvent,
    UserMessage,
};
pub use parse::parse_line;
