//! Error types for trace parsing and chart rendering.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a scheduler trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to open trace file {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("Malformed sample on line {line} ({reason}): {content:?}")]
    MalformedSampleLine {
        line: usize,
        content: String,
        reason: String,
    },
}

/// Failures while assigning colors to curves
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlotError {
    #[error("Process {pid} has no palette entry (palette holds {len} colors)")]
    PaletteExhausted { pid: u64, len: usize },

    #[error("Unknown color token: {0:?}")]
    UnknownColor(String),

    #[error("Palette must contain at least one color")]
    EmptyPalette,
}
