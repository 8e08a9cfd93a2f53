//! The read, parse, process, write loop.

use std::io::{BufRead, Write};

use stream_events::{parse_line, Event};
use tape_stream::EventProcessor;
use tracing::{debug, warn};

use crate::error::HostError;
use crate::reader::LineReader;

/// Receives the between-line progress label. `None` hides the indicator.
pub trait ProgressSink {
    fn update(&mut self, label: Option<String>);

    /// Erases the indicator before output is written. The next `update` may redraw it.
    fn clear(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _label: Option<String>) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub lines: usize,
    pub events: usize,
    pub parse_errors: usize,
}

pub fn run<R, W>(
    input: R,
    output: &mut W,
    processor: &mut EventProcessor,
    progress: &mut dyn ProgressSink,
) -> Result<RunStats, HostError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    run_reader(LineReader::new(input), output, processor, progress)
}

/// Drives `processor` until the input ends or fails.
///
/// Each line is fully processed and its fragment flushed before the next line is read.
pub fn run_reader<R, W>(
    mut reader: LineReader<R>,
    output: &mut W,
    processor: &mut EventProcessor,
    progress: &mut dyn ProgressSink,
) -> Result<RunStats, HostError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut stats = RunStats::default();

    while let Some(line) = reader.next_line()? {
        stats.lines += 1;
        let event = parse_line(&line);
        match &event {
            Some(Event::ParseError(error)) => {
                stats.parse_errors += 1;
                warn!(line = reader.line_number(), %error, "skipping undecodable line");
                continue;
            }
            Some(event) => {
                stats.events += 1;
                debug!(line = reader.line_number(), kind = event.kind(), "event");
            }
            None => continue,
        }

        let processed = processor.process(event.as_ref());
        if !processed.fragment.is_empty() {
            progress.clear();
            output
                .write_all(processed.fragment.as_bytes())
                .map_err(HostError::write)?;
            output.flush().map_err(HostError::write)?;
        }

        let label = processed
            .has_pending_tools
            .then(|| processor.progress_label())
            .flatten();
        progress.update(label);
    }

    progress.update(None);
    debug!(
        lines = stats.lines,
        events = stats.events,
        parse_errors = stats.parse_errors,
        "input finished"
    );
    Ok(stats)
}
