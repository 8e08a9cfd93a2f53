#![allow(unused_imports)]

use tape_stream::{
    parse_line, truncate_to_width, visible_width, ContentBlock, CurrentTool, EnvConfig, Event,
    EventProcessor, FlushedToolUse, ParseError, PendingSnapshot, PendingToolUse, PlainRenderer,
    Processed, ProcessorConfig, Renderer, ResolvedToolUse, SessionState, StreamState,
    StreamTransition, TodoItem, TodoStatus, ToolInput, ToolInvocation, ToolMatch,
    ToolResultContext, ToolUseTracker, NO_RESULT_MARKER,
};

#[test]
fn public_api_exports_compile() {}

#[test]
fn default_config_values() {
    let config = ProcessorConfig::default();
    assert_eq!(config.nested_prefix, "  │ ");
    assert_eq!(config.prompt_preview_width, 80);
    assert_eq!(config.result_preview_lines, 8);
    assert!(config.color);
    assert_eq!(NO_RESULT_MARKER, "(no result)");
}
