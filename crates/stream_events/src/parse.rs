use serde::Deserialize;

use crate::error::ParseError;
use crate::events::Event;

/// Just enough of a line to route it.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

/// Decodes one input line.
///
/// Returns `None` for blank input. Every other line yields an event; lines that cannot be decoded
/// come back as [`Event::ParseError`] rather than an `Err`, since a bad line never stops the
/// stream.
pub fn parse_line(line: &str) -> Option<Event> {
    if line.trim().is_empty() {
        return None;
    }

    let envelope = match serde_json::from_str::<Envelope>(line) {
        Ok(envelope) => envelope,
        Err(error) => return Some(Event::ParseError(ParseError::decode(error, line))),
    };

    let decoded = match envelope.kind.as_str() {
        "system" => serde_json::from_str(line).map(Event::System),
        "assistant" => serde_json::from_str(line).map(Event::Assistant),
        "user" => serde_json::from_str(line).map(Event::User),
        "stream_event" => serde_json::from_str(line).map(Event::Stream),
        "result" => serde_json::from_str(line).map(Event::Result),
        other => return Some(Event::ParseError(ParseError::unknown_type(other))),
    };

    Some(decoded.unwrap_or_else(|error| Event::ParseError(ParseError::decode(error, line))))
}
