//! Processor settings and environment configuration.

use std::env;

/// Tunables for [`crate::EventProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Prepended to every non-empty line rendered for a nested tool call.
    pub nested_prefix: String,
    /// Columns kept from the first line of a sub-agent prompt.
    pub prompt_preview_width: usize,
    /// Lines of tool output shown before the rest is summarised.
    pub result_preview_lines: usize,
    /// Emit ANSI styling.
    pub color: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            nested_prefix: "  │ ".to_string(),
            prompt_preview_width: 80,
            result_preview_lines: 8,
            color: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub no_color: bool,
    pub preview_width: Option<usize>,
    pub progress: bool,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_switch("TAPE_STREAM_NO_COLOR").unwrap_or(false)
                || env_value("NO_COLOR").is_some(),
            preview_width: env_value("TAPE_STREAM_PREVIEW_WIDTH")
                .and_then(|value| value.parse().ok())
                .filter(|width| *width > 0),
            progress: env_switch("TAPE_STREAM_PROGRESS").unwrap_or(true),
            log_filter: env_value("TAPE_STREAM_LOG"),
        }
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        let defaults = ProcessorConfig::default();
        ProcessorConfig {
            color: !self.no_color,
            prompt_preview_width: self.preview_width.unwrap_or(defaults.prompt_preview_width),
            ..defaults
        }
    }
}

/// Trimmed value of `key`; unset and blank are the same.
fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// On/off switch. `None` when unset or blank; anything other than an off word counts as on.
fn env_switch(key: &str) -> Option<bool> {
    env_value(key).map(|value| {
        !matches!(
            value.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    })
}
