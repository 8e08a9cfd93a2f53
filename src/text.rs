//! ANSI-aware width, truncation and line helpers.
//!
//! Pure string-in/string-out functions shared by the processor and renderers. Escape sequences
//! (CSI, OSC, APC, DCS, SS3) never count toward visible width.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;
const ANSI_RESET: &str = "\x1b[0m";

/// Length in bytes of the escape sequence starting at `pos`, if one starts there.
pub fn escape_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => {
            let end = bytes[pos + 2..]
                .iter()
                .position(|byte| (0x40..=0x7e).contains(byte))?;
            Some(end + 3)
        }
        b']' | b'_' | b'P' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        b'O' if pos + 2 < bytes.len() => Some(3),
        _ => None,
    }
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme
        .chars()
        .map(|ch| {
            if ch == '\t' {
                TAB_WIDTH
            } else {
                UnicodeWidthChar::width(ch).unwrap_or(0)
            }
        })
        .sum()
}

/// Removes escape sequences, leaving only printable text.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

/// Cuts `text` to at most `max_width` columns, appending `ellipsis` when anything was dropped.
///
/// Escape sequences before the cut are kept. When any were copied, a reset goes ahead of the
/// ellipsis so styling does not leak past it; plain input stays free of escapes.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(visible_width(ellipsis));
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::with_capacity(text.len());
    let mut current_width = 0;
    let mut idx = 0;
    let mut saw_escape = false;
    'outer: while idx < text.len() {
        if let Some(len) = escape_len(text, idx) {
            truncated.push_str(&text[idx..idx + len]);
            saw_escape = true;
            idx += len;
            continue;
        }

        let run_end = next_escape_or_end(text, idx);
        for grapheme in text[idx..run_end].graphemes(true) {
            let width = grapheme_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    if saw_escape {
        truncated.push_str(ANSI_RESET);
    }
    truncated.push_str(ellipsis);
    truncated
}

fn next_escape_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if escape_len(input, idx).is_some() {
            break;
        }
        match input[idx..].chars().next() {
            Some(ch) => idx += ch.len_utf8(),
            None => break,
        }
    }
    idx
}

/// First non-blank line, trimmed.
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Prepends `prefix` to every non-empty line, preserving line endings.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    if prefix.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let mut prefixed = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.split_inclusive('\n') {
        if line != "\n" && line != "\r\n" {
            prefixed.push_str(prefix);
        }
        prefixed.push_str(line);
    }
    prefixed
}

/// Makes sure a non-empty fragment ends with a newline.
pub fn ensure_trailing_newline(mut text: String) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
