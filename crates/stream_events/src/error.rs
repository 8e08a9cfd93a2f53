use std::fmt;

use serde_json::Error as JsonError;

const DISPLAY_LINE_LIMIT: usize = 200;

/// A line that could not be turned into a typed event.
///
/// `error` is `None` when the JSON was well-formed but carried an unknown `type`; `line` then
/// holds a description instead of the raw input.
#[derive(Debug)]
pub struct ParseError {
    pub error: Option<JsonError>,
    pub line: String,
}

impl ParseError {
    #[must_use]
    pub fn decode(error: JsonError, line: impl Into<String>) -> Self {
        Self {
            error: Some(error),
            line: line.into(),
        }
    }

    #[must_use]
    pub fn unknown_type(kind: &str) -> Self {
        Self {
            error: None,
            line: format!("Unknown event type: {kind}"),
        }
    }

    pub fn is_unknown_type(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = clip(&self.line, DISPLAY_LINE_LIMIT);
        match &self.error {
            Some(error) => write!(f, "failed to parse event ({error}): {line}"),
            None => write!(f, "{line}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error
            .as_ref()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}

fn clip(line: &str, limit: usize) -> String {
    if line.chars().count() <= limit {
        return line.to_string();
    }
    let mut clipped: String = line.chars().take(limit).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::ParseError;

    #[test]
    fn unknown_type_has_no_source() {
        let error = ParseError::unknown_type("telemetry");
        assert!(error.is_unknown_type());
        assert_eq!(error.to_string(), "Unknown event type: telemetry");
        assert!(std::error::Error::source(&error).is_none());
    }

    #[test]
    fn long_lines_are_clipped_in_display() {
        let line = "x".repeat(500);
        let json_error = serde_json::from_str::<serde_json::Value>(&line)
            .expect_err("garbage should not parse");
        let error = ParseError::decode(json_error, line.clone());

        let rendered = error.to_string();
        assert!(rendered.ends_with('…'));
        assert!(rendered.len() < line.len());
        assert_eq!(error.line, line);
    }
}
