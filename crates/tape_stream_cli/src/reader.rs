//! Bounded line reading.

use std::io::{BufRead, Read};

use crate::error::HostError;

/// Longest accepted input line, excluding the terminator.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Yields non-blank lines with `\n` / `\r\n` stripped.
///
/// A line longer than the limit is fatal; the reader never buffers more than `limit + 1` bytes.
pub struct LineReader<R> {
    inner: R,
    limit: usize,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_LINE_BYTES)
    }

    pub fn with_limit(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// 1-based number of the line most recently read, blank lines included.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next non-blank line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>, HostError> {
        loop {
            self.buffer.clear();
            let read = (&mut self.inner)
                .take(self.limit as u64 + 1)
                .read_until(b'\n', &mut self.buffer)
                .map_err(HostError::read)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if self.buffer.last() == Some(&b'\n') {
                self.buffer.pop();
            }
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
            if self.buffer.len() > self.limit {
                return Err(HostError::LineTooLong {
                    line: self.line_number,
                    limit: self.limit,
                });
            }

            let line = String::from_utf8_lossy(&self.buffer);
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(line.into_owned()));
        }
    }
}
