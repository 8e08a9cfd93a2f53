//! Host loop for the `tape-stream` binary.
//!
//! Reads stream-json lines from any `BufRead`, feeds them through a
//! [`tape_stream::EventProcessor`] and writes each fragment as soon as it is produced.

pub mod error;
pub mod host;
#[cfg(unix)]
pub mod platform;
pub mod progress;
pub mod reader;

pub use error::HostError;
pub use host::{run, run_reader, NoProgress, ProgressSink, RunStats};
pub use progress::Spinner;
pub use reader::{LineReader, MAX_LINE_BYTES};
