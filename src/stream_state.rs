//! Streaming suppression state.
//!
//! Partial-message deltas for a block arrive before the full assistant event that repeats the
//! same content. The flags here record what was already shown incrementally so the full event can
//! skip it. They are cleared in bulk once the owning assistant event has been processed, never by
//! block stops.

use stream_events::{BlockDelta, StreamDelta};

/// What applying one delta means for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTransition<'a> {
    Ignored,
    BlockStarted {
        kind: &'a str,
        name: Option<&'a str>,
    },
    TextDelta(&'a str),
    /// A streamed text block ended. `needs_newline` is set when the streamed text did not end
    /// with one.
    TextBlockStopped {
        needs_newline: bool,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamState {
    in_text_block: bool,
    in_tool_use_block: bool,
    active_kind: Option<String>,
    open_text_index: Option<usize>,
    streamed_text: bool,
    ends_with_newline: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<'a>(&mut self, delta: &'a StreamDelta) -> StreamTransition<'a> {
        match delta {
            StreamDelta::ContentBlockStart {
                index,
                content_block,
            } => {
                let kind = content_block.kind.as_str();
                match kind {
                    "text" => {
                        self.in_text_block = true;
                        self.open_text_index = Some(*index);
                        self.streamed_text = false;
                        self.ends_with_newline = false;
                    }
                    "tool_use" => self.in_tool_use_block = true,
                    _ => {}
                }
                self.active_kind = Some(kind.to_string());
                let name = Some(content_block.name.as_str()).filter(|name| !name.is_empty());
                StreamTransition::BlockStarted { kind, name }
            }
            StreamDelta::ContentBlockDelta {
                index,
                delta: BlockDelta::TextDelta { text },
            } => {
                if text.is_empty() {
                    return StreamTransition::Ignored;
                }
                // Text can only be shown once; a delta without a start still claims the block.
                if !self.in_text_block {
                    self.in_text_block = true;
                    self.open_text_index = Some(*index);
                }
                self.streamed_text = true;
                self.ends_with_newline = text.ends_with('\n');
                StreamTransition::TextDelta(text)
            }
            StreamDelta::ContentBlockStop { index } if self.open_text_index == Some(*index) => {
                self.open_text_index = None;
                let needs_newline = self.streamed_text && !self.ends_with_newline;
                self.streamed_text = false;
                self.ends_with_newline = false;
                StreamTransition::TextBlockStopped { needs_newline }
            }
            _ => StreamTransition::Ignored,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn in_text_block(&self) -> bool {
        self.in_text_block
    }

    pub fn in_tool_use_block(&self) -> bool {
        self.in_tool_use_block
    }

    /// Kind of the most recently started block, for progress displays.
    pub fn active_block_kind(&self) -> Option<&str> {
        self.active_kind.as_deref()
    }

    pub fn is_idle(&self) -> bool {
        !self.in_text_block && !self.in_tool_use_block
    }
}
