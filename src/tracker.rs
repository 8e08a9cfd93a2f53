//! Tool invocations waiting for their results.
//!
//! The assistant announces a tool call (`tool_use`) one event before the matching `tool_result`
//! arrives in a user event, and sub-agent tools may launch further tools before they finish.
//! [`ToolUseTracker`] holds every invocation that has been seen but not yet answered, keyed by
//! id, with an optional link to the invocation that spawned it.
//!
//! Invariant: nesting is never stored. An entry is nested only while its parent is still
//! pending, so [`ToolUseTracker::is_nested`] answers from current membership every time.

use std::collections::HashMap;

use serde_json::Value;
use stream_events::{ContentBlock, ToolInput};
use tracing::{debug, trace};

/// Argument keys tried in order when summarising a call on one line.
const PRIMARY_ARG_KEYS: [&str; 9] = [
    "command",
    "file_path",
    "notebook_path",
    "pattern",
    "path",
    "url",
    "query",
    "description",
    "prompt",
];

/// A tool call as announced by the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub input: ToolInput,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: ToolInput) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Builds an invocation from a `tool_use` block carrying a non-empty id.
    pub fn from_block(block: &ContentBlock) -> Option<Self> {
        match block {
            ContentBlock::ToolUse { id, name, input } if !id.is_empty() => {
                Some(Self::new(id.clone(), name.clone(), input.clone()))
            }
            _ => None,
        }
    }

    /// The single argument that best identifies what the call does.
    pub fn primary_arg(&self) -> Option<&str> {
        PRIMARY_ARG_KEYS
            .iter()
            .find_map(|key| self.input.field_str(key))
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolUse {
    pub invocation: ToolInvocation,
    pub parent_id: Option<String>,
    header_shown: bool,
    seq: u64,
}

impl PendingToolUse {
    pub fn id(&self) -> &str {
        &self.invocation.id
    }

    /// Whether the header was already rendered ahead of the result.
    pub fn header_shown(&self) -> bool {
        self.header_shown
    }
}

/// A pending call paired with the result that resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolMatch {
    pub invocation: ToolInvocation,
    pub is_nested: bool,
    pub header_already_shown: bool,
    pub content: Option<Value>,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedToolUse {
    pub invocation: ToolInvocation,
    pub is_nested: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlushedToolUse {
    pub id: String,
    pub invocation: ToolInvocation,
    pub is_nested: bool,
    pub header_already_shown: bool,
}

/// Read-only view of one pending call for progress displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub id: String,
    pub name: String,
    pub nested: bool,
}

#[derive(Debug, Default)]
pub struct ToolUseTracker {
    pending: HashMap<String, PendingToolUse>,
    next_seq: u64,
}

impl ToolUseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `invocation`. Callers filter out empty ids.
    ///
    /// Re-adding an id that is still pending replaces the earlier entry.
    pub fn add(&mut self, invocation: ToolInvocation, parent_id: Option<String>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(
            id = %invocation.id,
            name = %invocation.name,
            parent = ?parent_id,
            "tracking tool use"
        );
        let id = invocation.id.clone();
        self.pending.insert(
            id,
            PendingToolUse {
                invocation,
                parent_id: parent_id.filter(|parent| !parent.is_empty()),
                header_shown: false,
                seq,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&PendingToolUse> {
        self.pending.get(id)
    }

    pub fn is_nested(&self, entry: &PendingToolUse) -> bool {
        entry
            .parent_id
            .as_deref()
            .is_some_and(|parent| self.pending.contains_key(parent))
    }

    pub fn remove(&mut self, id: &str) -> Option<PendingToolUse> {
        self.pending.remove(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Visits every pending entry. Order is insertion order but callers must not rely on it.
    pub fn for_each(&self, mut visitor: impl FnMut(&PendingToolUse)) {
        for entry in self.ordered() {
            visitor(entry);
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Tracks every `tool_use` block of an assistant message.
    ///
    /// Nothing is tracked while the block was already shown through streaming deltas. Returns
    /// whether at least one block was newly tracked.
    pub fn buffer_from_assistant_message(
        &mut self,
        blocks: &[ContentBlock],
        parent_id: Option<&str>,
        already_streaming_tool_use: bool,
    ) -> bool {
        if already_streaming_tool_use {
            let skipped = blocks.iter().filter_map(ToolInvocation::from_block).count();
            if skipped > 0 {
                debug!(skipped, "tool use already streamed; not tracking");
            }
            return false;
        }

        let mut buffered = false;
        for invocation in blocks.iter().filter_map(ToolInvocation::from_block) {
            self.add(invocation, parent_id.map(str::to_string));
            buffered = true;
        }
        buffered
    }

    /// Resolves every `tool_result` in a user message against pending calls.
    ///
    /// Nesting is classified before each entry is removed. Results with no pending call are
    /// skipped. Output follows the order of the blocks.
    pub fn match_from_user_message(&mut self, blocks: &[ContentBlock]) -> Vec<ToolMatch> {
        let mut matches = Vec::new();
        for block in blocks {
            let ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } = block
            else {
                continue;
            };
            if tool_use_id.is_empty() {
                continue;
            }

            let Some(entry) = self.pending.get(tool_use_id) else {
                trace!(id = %tool_use_id, "no pending entry for tool result");
                continue;
            };
            let is_nested = self.is_nested(entry);
            let Some(entry) = self.pending.remove(tool_use_id) else {
                continue;
            };

            matches.push(ToolMatch {
                invocation: entry.invocation,
                is_nested,
                header_already_shown: entry.header_shown,
                content: content.clone(),
                is_error: *is_error,
            });
        }
        matches
    }

    /// Hands out a parent's header before its result arrives.
    ///
    /// Used when a sub-agent's prompt shows up: the launching call should be visible above it.
    /// Returns the record once; later calls (or an unknown id) return `None`. The entry stays
    /// pending.
    pub fn resolve_parent_early(&mut self, parent_id: &str) -> Option<ResolvedToolUse> {
        let entry = self.pending.get(parent_id)?;
        if entry.header_shown {
            return None;
        }
        let resolved = ResolvedToolUse {
            invocation: entry.invocation.clone(),
            is_nested: self.is_nested(entry),
        };
        if let Some(entry) = self.pending.get_mut(parent_id) {
            entry.header_shown = true;
        }
        Some(resolved)
    }

    /// Drains every pending call.
    ///
    /// Nesting is classified against the full pre-flush set, so a parent and child flushed
    /// together still report the child as nested.
    pub fn flush_all(&mut self) -> Vec<FlushedToolUse> {
        let flushed = self
            .ordered()
            .into_iter()
            .map(|entry| FlushedToolUse {
                id: entry.invocation.id.clone(),
                invocation: entry.invocation.clone(),
                is_nested: self.is_nested(entry),
                header_already_shown: entry.header_shown,
            })
            .collect();
        self.pending.clear();
        flushed
    }

    pub fn snapshot(&self) -> Vec<PendingSnapshot> {
        self.ordered()
            .into_iter()
            .map(|entry| PendingSnapshot {
                id: entry.invocation.id.clone(),
                name: entry.invocation.name.clone(),
                nested: self.is_nested(entry),
            })
            .collect()
    }

    fn ordered(&self) -> Vec<&PendingToolUse> {
        let mut entries: Vec<&PendingToolUse> = self.pending.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }
}
