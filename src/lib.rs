//! Per-process ready-queue plots from scheduler trace dumps.
//!
//! [`trace::TraceParser`] turns the simulator's line-oriented output into
//! one [`trace::ProcessSeries`] per process ID; [`plot::render`] draws
//! them as a multi-line SVG chart colored from a [`palette::Palette`].

pub mod error;
pub mod palette;
pub mod plot;
pub mod summary;
pub mod trace;

pub use error::{PlotError, TraceError};
pub use palette::Palette;
pub use plot::RenderConfig;
pub use summary::TraceSummary;
pub use trace::{MalformedPolicy, ParseOptions, ParsedTrace, SeriesMap, TraceParser};
