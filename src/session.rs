//! Running totals for one agent session.
//!
//! The processor only ever writes here; hosts read it for progress lines and summaries.

use serde::Deserialize;
use stream_events::{ResultEvent, SystemEvent, ToolInput, Usage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTool {
    pub name: String,
    pub arg: Option<String>,
}

impl CurrentTool {
    pub fn label(&self) -> String {
        match &self.arg {
            Some(arg) => format!("{}: {arg}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl From<String> for TodoStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
    #[serde(rename = "activeForm", default)]
    pub active_form: String,
}

#[derive(Debug, Deserialize)]
struct TodoWriteInput {
    #[serde(default)]
    todos: Vec<TodoItem>,
}

/// Todo list carried by a `TodoWrite` call, if the input has that shape.
pub fn todos_from_input(input: &ToolInput) -> Option<Vec<TodoItem>> {
    input
        .parse::<TodoWriteInput>()
        .ok()
        .map(|parsed| parsed.todos)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session_id: String,
    pub model: String,
    pub cwd: String,
    pub tools: Vec<String>,
    pub permission_mode: String,
    pub version: String,
    pub agents: Vec<String>,
    pub turns: u32,
    pub total_cost_usd: f64,
    pub duration_ms: u64,
    pub duration_api_ms: u64,
    pub usage: Usage,
    pub current_tool: Option<CurrentTool>,
    pub todos: Vec<TodoItem>,
    pub is_error: bool,
    pub result_subtype: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies metadata from a `system` event. Only `init` carries the session description;
    /// other subtypes can still refresh the session id.
    pub fn apply_system(&mut self, event: &SystemEvent) {
        if !event.session_id.is_empty() {
            self.session_id = event.session_id.clone();
        }
        if !event.is_init() {
            return;
        }
        self.model = event.model.clone();
        self.cwd = event.cwd.clone();
        self.tools = event.tools.clone();
        self.permission_mode = event.permission_mode.clone();
        self.version = event.version.clone();
        self.agents = event.agents.clone();
    }

    pub fn record_turn(&mut self) {
        self.turns = self.turns.saturating_add(1);
    }

    pub fn set_current_tool(&mut self, name: impl Into<String>, arg: Option<&str>) {
        self.current_tool = Some(CurrentTool {
            name: name.into(),
            arg: arg.map(str::to_string),
        });
    }

    pub fn clear_current_tool(&mut self) {
        self.current_tool = None;
    }

    pub fn replace_todos(&mut self, todos: Vec<TodoItem>) {
        self.todos = todos;
    }

    pub fn completed_todos(&self) -> usize {
        self.todos
            .iter()
            .filter(|todo| todo.status == TodoStatus::Completed)
            .count()
    }

    /// Folds in the final `result` event. Turn count never goes backwards.
    pub fn apply_result(&mut self, event: &ResultEvent) {
        self.turns = self.turns.max(event.num_turns);
        self.total_cost_usd = event.total_cost_usd;
        self.duration_ms = event.duration_ms;
        self.duration_api_ms = event.duration_api_ms;
        if let Some(usage) = event.usage {
            self.usage = usage;
        }
        self.is_error = event.is_error;
        self.result_subtype = event.subtype.clone();
        if !event.session_id.is_empty() {
            self.session_id = event.session_id.clone();
        }
    }
}
