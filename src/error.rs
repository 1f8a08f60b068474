use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Component of a `HH:MM:SS.fff` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl fmt::Display for TimestampField {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TimestampField::Hours => "hours",
            TimestampField::Minutes => "minutes",
            TimestampField::Seconds => "seconds",
            TimestampField::Milliseconds => "milliseconds",
        };
        write!(fmt, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum CondenseError {
    #[error("Can't convert timestamp '{timestamp}' to a duration, error in {field}")]
    Decode {
        timestamp: String,
        field: TimestampField,
    },

    #[error("Malformed subtitle on line {line}: expected at least {expected} fields, found {found}")]
    MalformedSubtitle {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("No dialog found in subtitle file")]
    EmptyDialog,

    #[error("Malformed dialog timings: interval {start:?} to {end:?} does not end after it starts")]
    MalformedInterval { start: Duration, end: Duration },

    #[error("Failed to probe duration of '{}': {message}", path.display())]
    Probe { path: PathBuf, message: String },

    #[error("Failed to transcode '{}': {message}", path.display())]
    Transcode { path: PathBuf, message: String },

    #[error("'{tool}' was not found in PATH")]
    ToolMissing { tool: &'static str },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CondenseError {
    pub(crate) fn decode(timestamp: &str, field: TimestampField) -> Self {
        CondenseError::Decode {
            timestamp: timestamp.to_string(),
            field,
        }
    }
}
