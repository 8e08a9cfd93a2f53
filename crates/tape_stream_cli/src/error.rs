use std::io;

use thiserror::Error;

/// Fatal host failures. Undecodable lines are not errors; they are logged and skipped.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("error reading input stream: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    #[error("error reading input stream: line {line} exceeds {limit} bytes")]
    LineTooLong { line: usize, limit: usize },

    #[error("error writing output: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

impl HostError {
    pub(crate) fn read(source: io::Error) -> Self {
        Self::Read { source }
    }

    pub(crate) fn write(source: io::Error) -> Self {
        Self::Write { source }
    }
}
