//! Per-event orchestration.
//!
//! [`EventProcessor`] owns the tracker, the streaming flags and the session totals for one
//! session. Each call handles one event to completion and returns the text to print for it.
//!
//! Tool calls are not rendered when the assistant announces them. The header is held back until
//! the matching result arrives so header and output stay adjacent, even when other output
//! (sub-agent chatter, streamed text) lands in between.

use stream_events::{
    AssistantEvent, ContentBlock, Event, ResultEvent, StreamEvent, SystemEvent, ToolInput,
    UserEvent,
};
use tracing::{debug, trace, warn};

use crate::config::ProcessorConfig;
use crate::render::{PlainRenderer, Renderer, ToolResultContext};
use crate::session::{todos_from_input, SessionState};
use crate::stream_state::{StreamState, StreamTransition};
use crate::text::{ensure_trailing_newline, first_line, prefix_lines, truncate_to_width};
use crate::tracker::{ToolInvocation, ToolUseTracker};

/// Body rendered under a tool call that never received a result.
pub const NO_RESULT_MARKER: &str = "(no result)";

const TODO_WRITE_TOOL: &str = "TodoWrite";

/// Output of one [`EventProcessor::process`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processed {
    pub fragment: String,
    /// Whether tool calls are still waiting for results after this event.
    pub has_pending_tools: bool,
}

pub struct EventProcessor {
    renderer: Box<dyn Renderer>,
    config: ProcessorConfig,
    tracker: ToolUseTracker,
    stream_state: StreamState,
    session: SessionState,
    /// Whether the next streamed text starts a fresh output line.
    delta_at_line_start: bool,
}

impl EventProcessor {
    pub fn new(renderer: Box<dyn Renderer>, config: ProcessorConfig) -> Self {
        Self {
            renderer,
            config,
            tracker: ToolUseTracker::new(),
            stream_state: StreamState::new(),
            session: SessionState::new(),
            delta_at_line_start: true,
        }
    }

    pub fn with_plain_renderer(config: ProcessorConfig) -> Self {
        let renderer = PlainRenderer::from_config(&config);
        Self::new(Box::new(renderer), config)
    }

    /// Handles one event.
    ///
    /// `None` and parse errors change nothing and render nothing; reporting bad lines is the
    /// host's job.
    pub fn process(&mut self, event: Option<&Event>) -> Processed {
        let Some(event) = event else {
            return Processed::default();
        };
        trace!(kind = event.kind(), "processing event");

        let fragment = match event {
            Event::System(system) => self.on_system(system),
            Event::Assistant(assistant) => self.on_assistant(assistant),
            Event::User(user) => self.on_user(user),
            Event::Stream(stream) => self.on_stream(stream),
            Event::Result(result) => self.on_result(result),
            Event::ParseError(_) => return Processed::default(),
        };

        Processed {
            fragment,
            has_pending_tools: !self.tracker.is_empty(),
        }
    }

    pub fn tracker(&self) -> &ToolUseTracker {
        &self.tracker
    }

    pub fn stream_state(&self) -> &StreamState {
        &self.stream_state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Short description of what the agent is busy with, for a spinner.
    pub fn progress_label(&self) -> Option<String> {
        if let Some(tool) = &self.session.current_tool {
            return Some(tool.label());
        }
        if let Some(kind) = self.stream_state.active_block_kind() {
            return Some(kind.replace('_', " "));
        }
        (!self.tracker.is_empty()).then(|| format!("{} tools pending", self.tracker.len()))
    }

    fn on_system(&mut self, event: &SystemEvent) -> String {
        self.session.apply_system(event);
        ensure_trailing_newline(self.renderer.system(event))
    }

    fn on_assistant(&mut self, event: &AssistantEvent) -> String {
        let blocks = &event.message.content;
        let parent = event
            .parent_tool_use_id
            .as_deref()
            .filter(|id| !id.is_empty());

        self.session.record_turn();
        let buffered = self.tracker.buffer_from_assistant_message(
            blocks,
            parent,
            self.stream_state.in_tool_use_block(),
        );
        if buffered {
            if let Some(first) = blocks.iter().find_map(ToolInvocation::from_block) {
                self.session
                    .set_current_tool(first.name.clone(), first.primary_arg());
            }
        }

        for block in blocks {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == TODO_WRITE_TOOL {
                    if let Some(todos) = todos_from_input(input) {
                        self.session.replace_todos(todos);
                    }
                }
            }
        }

        let nested = parent.is_some_and(|id| self.tracker.get(id).is_some());
        let mut fragment = String::new();
        if let Some(error) = event.error.as_deref().filter(|error| !error.is_empty()) {
            fragment.push_str(&ensure_trailing_newline(self.renderer.assistant_error(error)));
        }
        if self.stream_state.in_text_block() {
            trace!("assistant text already streamed");
        } else {
            for text in blocks.iter().filter_map(ContentBlock::as_text) {
                let rendered = ensure_trailing_newline(self.renderer.text(text));
                fragment.push_str(&self.nest(rendered, nested));
            }
        }

        self.stream_state.reset();
        self.delta_at_line_start = true;
        fragment
    }

    fn on_user(&mut self, event: &UserEvent) -> String {
        if event.is_subagent_prompt() {
            return self.on_subagent_prompt(event);
        }

        let matches = self.tracker.match_from_user_message(&event.message.content);
        let result_count = event
            .message
            .content
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolResult { .. }))
            .count();
        // The side channel describes a single result; it is ambiguous when several share a message.
        let side_channel = (result_count == 1)
            .then_some(event.tool_use_result.as_ref())
            .flatten();

        let mut fragment = String::new();
        for matched in &matches {
            let mut piece = String::new();
            if !matched.header_already_shown {
                piece.push_str(&ensure_trailing_newline(
                    self.renderer.tool_header(&matched.invocation),
                ));
            }
            let context = ToolResultContext {
                invocation: &matched.invocation,
                content: matched.content.as_ref(),
                is_error: matched.is_error,
                side_channel,
            };
            piece.push_str(&ensure_trailing_newline(self.renderer.tool_result(&context)));
            fragment.push_str(&self.nest(piece, matched.is_nested));
        }

        // Calls first seen through streaming deltas are never tracked, so their results arrive
        // unmatched. Render the body without a header rather than dropping it.
        for block in &event.message.content {
            let ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } = block
            else {
                continue;
            };
            if matches
                .iter()
                .any(|matched| &matched.invocation.id == tool_use_id)
            {
                continue;
            }
            warn!(id = %tool_use_id, "tool result without a pending tool use");
            let invocation = ToolInvocation::new(tool_use_id.clone(), "", ToolInput::default());
            let context = ToolResultContext {
                invocation: &invocation,
                content: content.as_ref(),
                is_error: *is_error,
                side_channel,
            };
            fragment.push_str(&ensure_trailing_newline(self.renderer.tool_result(&context)));
        }

        if self.tracker.is_empty() {
            self.session.clear_current_tool();
        }
        fragment
    }

    fn on_subagent_prompt(&mut self, event: &UserEvent) -> String {
        let Some(parent) = event
            .parent_tool_use_id
            .as_deref()
            .filter(|id| !id.is_empty())
        else {
            return String::new();
        };

        let mut fragment = String::new();
        if let Some(resolved) = self.tracker.resolve_parent_early(parent) {
            debug!(id = parent, name = %resolved.invocation.name, "showing sub-agent header early");
            let header = ensure_trailing_newline(self.renderer.tool_header(&resolved.invocation));
            fragment.push_str(&self.nest(header, resolved.is_nested));
        }

        let prompt = event
            .message
            .content
            .iter()
            .filter_map(ContentBlock::as_text)
            .map(first_line)
            .find(|line| !line.is_empty());
        if let Some(prompt) = prompt {
            let preview = truncate_to_width(prompt, self.config.prompt_preview_width, "…");
            let rendered = ensure_trailing_newline(self.renderer.subagent_prompt(&preview));
            let nested = self.tracker.get(parent).is_some();
            fragment.push_str(&self.nest(rendered, nested));
        }
        fragment
    }

    fn on_stream(&mut self, event: &StreamEvent) -> String {
        match self.stream_state.apply(&event.event) {
            StreamTransition::BlockStarted { kind, name } => {
                if kind == "tool_use" {
                    self.session.set_current_tool(name.unwrap_or(kind), None);
                }
                String::new()
            }
            StreamTransition::TextDelta(text) => {
                let nested = event
                    .parent_tool_use_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .is_some_and(|id| self.tracker.get(id).is_some());
                let rendered = self.renderer.text_delta(text);
                self.nest_delta(rendered, nested)
            }
            StreamTransition::TextBlockStopped { needs_newline } => {
                self.delta_at_line_start = true;
                if needs_newline {
                    "\n".to_string()
                } else {
                    String::new()
                }
            }
            StreamTransition::Ignored => String::new(),
        }
    }

    fn on_result(&mut self, event: &ResultEvent) -> String {
        let orphans = self.tracker.flush_all();
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "flushing tool uses without results");
        }

        let mut fragment = String::new();
        for orphan in &orphans {
            let mut piece = String::new();
            if !orphan.header_already_shown {
                piece.push_str(&ensure_trailing_newline(
                    self.renderer.tool_header(&orphan.invocation),
                ));
            }
            piece.push_str(&ensure_trailing_newline(
                self.renderer.no_result(&orphan.invocation, NO_RESULT_MARKER),
            ));
            fragment.push_str(&self.nest(piece, orphan.is_nested));
        }

        self.session.clear_current_tool();
        self.session.apply_result(event);
        self.stream_state.reset();
        self.delta_at_line_start = true;
        fragment.push_str(&ensure_trailing_newline(
            self.renderer.result_summary(event, &self.session),
        ));
        fragment
    }

    /// Like [`Self::nest`] for text that may stop mid-line; only line starts get the prefix.
    fn nest_delta(&mut self, fragment: String, nested: bool) -> String {
        if fragment.is_empty() {
            return fragment;
        }
        let mut out = String::with_capacity(fragment.len());
        for piece in fragment.split_inclusive('\n') {
            let blank = piece == "\n" || piece == "\r\n";
            if nested && self.delta_at_line_start && !blank {
                out.push_str(&self.config.nested_prefix);
            }
            out.push_str(piece);
            self.delta_at_line_start = piece.ends_with('\n');
        }
        out
    }

    fn nest(&self, fragment: String, nested: bool) -> String {
        if nested {
            prefix_lines(&fragment, &self.config.nested_prefix)
        } else {
            fragment
        }
    }
}
