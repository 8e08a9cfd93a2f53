//! Default renderer: plain text with optional ANSI SGR styling.

use stream_events::{ResultEvent, SystemEvent};

use crate::config::ProcessorConfig;
use crate::render::{Renderer, ToolResultContext};
use crate::session::{todos_from_input, SessionState, TodoStatus};
use crate::text::{first_line, truncate_to_width};
use crate::tracker::ToolInvocation;

const HEADER_ARG_WIDTH: usize = 96;
const RESULT_LINE_WIDTH: usize = 120;
const ELLIPSIS: &str = "…";

#[derive(Debug, Clone)]
pub struct PlainRenderer {
    color: bool,
    preview_lines: usize,
}

impl PlainRenderer {
    pub fn new(color: bool, preview_lines: usize) -> Self {
        Self {
            color,
            preview_lines,
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(config.color, config.result_preview_lines)
    }

    fn ansi_wrap(&self, text: &str, prefix: &str, suffix: &str) -> String {
        if self.color {
            format!("{prefix}{text}{suffix}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[2m", "\x1b[22m")
    }

    fn bold(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[1m", "\x1b[22m")
    }

    fn cyan(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[36m", "\x1b[39m")
    }

    fn red(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[31m", "\x1b[39m")
    }

    fn green(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[32m", "\x1b[39m")
    }

    fn yellow(&self, text: &str) -> String {
        self.ansi_wrap(text, "\x1b[33m", "\x1b[39m")
    }

    fn preview(&self, text: &str) -> String {
        let lines: Vec<&str> = text.trim_end().lines().collect();
        if lines.is_empty() {
            return format!("  ⎿ {}\n", self.dim("(no output)"));
        }

        let mut rendered = String::new();
        for (idx, line) in lines.iter().take(self.preview_lines.max(1)).enumerate() {
            let gutter = if idx == 0 { "  ⎿ " } else { "    " };
            let line = truncate_to_width(line, RESULT_LINE_WIDTH, ELLIPSIS);
            rendered.push_str(gutter);
            rendered.push_str(&self.dim(&line));
            rendered.push('\n');
        }
        let hidden = lines.len().saturating_sub(self.preview_lines.max(1));
        if hidden > 0 {
            rendered.push_str(&format!("    {}\n", self.dim(&format!("… +{hidden} lines"))));
        }
        rendered
    }

    fn todo_lines(&self, invocation: &ToolInvocation) -> Option<String> {
        let todos = todos_from_input(&invocation.input)?;
        let mut rendered = String::from("  ⎿ Updated todos\n");
        for todo in &todos {
            let line = match todo.status {
                TodoStatus::Completed => self.green(&format!("☒ {}", todo.content)),
                TodoStatus::InProgress => self.yellow(&format!("◐ {}", todo.content)),
                TodoStatus::Pending => format!("☐ {}", todo.content),
            };
            rendered.push_str("    ");
            rendered.push_str(&line);
            rendered.push('\n');
        }
        Some(rendered)
    }
}

impl Default for PlainRenderer {
    fn default() -> Self {
        Self::from_config(&ProcessorConfig::default())
    }
}

impl Renderer for PlainRenderer {
    fn system(&self, event: &SystemEvent) -> String {
        if !event.is_init() {
            let subtype = if event.subtype.is_empty() {
                "event"
            } else {
                event.subtype.as_str()
            };
            return format!("{}\n", self.dim(&format!("system: {subtype}")));
        }

        let mut parts = vec![self.bold("● Session started")];
        for value in [&event.model, &event.cwd, &event.permission_mode] {
            if !value.is_empty() {
                parts.push(value.clone());
            }
        }
        let mut rendered = format!("{}\n", parts.join(" · "));

        let mut details = Vec::new();
        if !event.tools.is_empty() {
            details.push(format!("{} tools", event.tools.len()));
        }
        if !event.agents.is_empty() {
            details.push(format!("agents: {}", event.agents.join(", ")));
        }
        if !event.mcp_servers.is_empty() {
            let servers = event
                .mcp_servers
                .iter()
                .map(|server| format!("{} ({})", server.name, server.status))
                .collect::<Vec<_>>()
                .join(", ");
            details.push(format!("mcp: {servers}"));
        }
        if !event.version.is_empty() {
            details.push(format!("v{}", event.version));
        }
        if !details.is_empty() {
            rendered.push_str(&format!("  {}\n", self.dim(&details.join(" · "))));
        }
        rendered
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn assistant_error(&self, error: &str) -> String {
        format!("{}\n", self.red(&format!("✗ {error}")))
    }

    fn tool_header(&self, invocation: &ToolInvocation) -> String {
        let name = self.bold(&invocation.name);
        match invocation.primary_arg() {
            Some(arg) => {
                let arg = truncate_to_width(first_line(arg), HEADER_ARG_WIDTH, ELLIPSIS);
                format!("{} {name}({})\n", self.cyan("⏺"), self.dim(&arg))
            }
            None => format!("{} {name}\n", self.cyan("⏺")),
        }
    }

    fn tool_result(&self, context: &ToolResultContext<'_>) -> String {
        let text = context.content_text();
        if context.is_error {
            let message = first_line(&text);
            let message = if message.is_empty() {
                "tool failed"
            } else {
                message
            };
            let message = truncate_to_width(message, RESULT_LINE_WIDTH, ELLIPSIS);
            return format!("  ⎿ {}\n", self.red(&format!("Error: {message}")));
        }

        match context.invocation.name.as_str() {
            "Read" => {
                let count = text.lines().count();
                let noun = if count == 1 { "line" } else { "lines" };
                format!("  ⎿ {}\n", self.dim(&format!("Read {count} {noun}")))
            }
            "TodoWrite" => self
                .todo_lines(context.invocation)
                .unwrap_or_else(|| self.preview(&text)),
            _ => {
                let side_stdout = context
                    .side_channel
                    .and_then(|side| side.get("stdout"))
                    .and_then(|stdout| stdout.as_str())
                    .filter(|stdout| !stdout.trim().is_empty());
                if text.trim().is_empty() {
                    if let Some(stdout) = side_stdout {
                        return self.preview(stdout);
                    }
                }
                self.preview(&text)
            }
        }
    }

    fn no_result(&self, _invocation: &ToolInvocation, marker: &str) -> String {
        format!("  ⎿ {}\n", self.dim(marker))
    }

    fn subagent_prompt(&self, preview: &str) -> String {
        format!("  ↳ {}\n", self.dim(preview))
    }

    fn result_summary(&self, event: &ResultEvent, session: &SessionState) -> String {
        let status = if event.is_success() {
            self.green("✓ Done")
        } else if event.subtype.is_empty() {
            self.red("✗ Failed")
        } else {
            self.red(&format!("✗ Failed ({})", event.subtype))
        };

        let turns = session.turns;
        let mut parts = vec![
            status,
            format!("{turns} {}", if turns == 1 { "turn" } else { "turns" }),
            format!("${:.4}", session.total_cost_usd),
            format!("{:.1}s", session.duration_ms as f64 / 1000.0),
        ];
        let tokens = session.usage.total();
        if tokens > 0 {
            parts.push(format!("{} tokens", group_thousands(tokens)));
        }
        if !session.todos.is_empty() {
            parts.push(format!(
                "todos {}/{}",
                session.completed_todos(),
                session.todos.len()
            ));
        }

        let mut rendered = format!("{}\n", parts.join(" · "));
        if !event.permission_denials.is_empty() {
            let denied = event
                .permission_denials
                .iter()
                .map(|denial| denial.tool_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            rendered.push_str(&format!(
                "  {}\n",
                self.yellow(&format!("permission denied: {denied}"))
            ));
        }
        rendered
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
