//! Scheduler trace parsing into per-process queue-length series.
//!
//! The simulator dumps its process table once per tick. Each dump opens
//! with a header row starting with `PID`; the rows below it start with the
//! process ID followed by the tracked queue value. Anything else in the
//! file (banners, blank lines, program output) is noise.

use crate::error::TraceError;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;

/// Prefix of the header row that opens a new tick
pub const TICK_MARKER: &str = "PID";

/// Stop once the tick counter passes this value
pub const DEFAULT_TICK_LIMIT: u64 = 400;

/// Queue length of one process at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub tick: u64,
    pub queue_length: i64,
}

/// All samples of one process, in parse order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSeries {
    pub pid: u64,
    pub samples: Vec<Sample>,
}

impl ProcessSeries {
    fn new(pid: u64) -> Self {
        Self {
            pid,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Chart points as (tick, queue length)
    pub fn points(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.samples.iter().map(|s| (s.tick, s.queue_length))
    }
}

/// Process series keyed by PID, iterated in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesMap {
    series: Vec<ProcessSeries>,
    index: HashMap<u64, usize>,
}

impl SeriesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, creating the series on the first sighting of `pid`
    pub fn push(&mut self, pid: u64, sample: Sample) {
        let slot = match self.index.get(&pid) {
            Some(&slot) => slot,
            None => {
                self.series.push(ProcessSeries::new(pid));
                self.index.insert(pid, self.series.len() - 1);
                self.series.len() - 1
            }
        };
        self.series[slot].samples.push(sample);
    }

    pub fn get(&self, pid: u64) -> Option<&ProcessSeries> {
        self.index.get(&pid).map(|&slot| &self.series[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessSeries> {
        self.series.iter()
    }

    pub fn pids(&self) -> impl Iterator<Item = u64> + '_ {
        self.series.iter().map(|s| s.pid)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.series.iter().map(ProcessSeries::len).sum()
    }
}

impl<'a> IntoIterator for &'a SeriesMap {
    type Item = &'a ProcessSeries;
    type IntoIter = std::slice::Iter<'a, ProcessSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

/// What to do with a digit-leading line that does not hold two integers
///
/// The process ID must fit a `u64` and the queue value an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the parse with `TraceError::MalformedSampleLine`
    #[default]
    Fail,
    /// Log the line and carry on
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub tick_limit: u64,
    pub malformed: MalformedPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tick_limit: DEFAULT_TICK_LIMIT,
            malformed: MalformedPolicy::Fail,
        }
    }
}

/// Result of a single pass over a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrace {
    pub series: SeriesMap,
    /// Tick counter at termination, equal to the number of markers read
    pub final_tick: u64,
    pub lines_read: usize,
    pub noise_lines: usize,
    pub skipped_malformed: usize,
    /// True when the pass ended because the tick limit was passed
    pub stopped_at_limit: bool,
}

enum LineKind {
    Marker,
    Noise,
    Sample { pid: u64, queue_length: i64 },
}

fn classify(line: &str) -> Result<LineKind, String> {
    if line.starts_with(TICK_MARKER) {
        return Ok(LineKind::Marker);
    }
    if !line.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return Ok(LineKind::Noise);
    }

    let mut tokens = line.split_whitespace();
    let Some(pid_token) = tokens.next() else {
        return Ok(LineKind::Noise);
    };
    let pid = pid_token
        .parse::<u64>()
        .map_err(|e| format!("invalid process ID {:?}: {}", pid_token, e))?;
    let queue_token = tokens
        .next()
        .ok_or_else(|| "missing queue length".to_string())?;
    let queue_length = queue_token
        .parse::<i64>()
        .map_err(|e| format!("invalid queue length {:?}: {}", queue_token, e))?;

    Ok(LineKind::Sample { pid, queue_length })
}

/// Mutable state threaded through one pass
#[derive(Default)]
struct ParseState {
    tick: u64,
    series: SeriesMap,
    lines_read: usize,
    noise_lines: usize,
    skipped_malformed: usize,
}

impl ParseState {
    fn feed(
        &mut self,
        line_num: usize,
        line: &str,
        options: &ParseOptions,
    ) -> Result<ControlFlow<()>, TraceError> {
        self.lines_read += 1;

        match classify(line) {
            Ok(LineKind::Marker) => self.tick += 1,
            Ok(LineKind::Noise) => self.noise_lines += 1,
            Ok(LineKind::Sample { pid, queue_length }) => self.series.push(
                pid,
                Sample {
                    tick: self.tick,
                    queue_length,
                },
            ),
            Err(reason) => match options.malformed {
                MalformedPolicy::Fail => {
                    return Err(TraceError::MalformedSampleLine {
                        line: line_num,
                        content: line.trim_end().to_string(),
                        reason,
                    });
                }
                MalformedPolicy::Skip => {
                    warn!("Skipping line {}: {}", line_num, reason);
                    self.skipped_malformed += 1;
                }
            },
        }

        if self.tick > options.tick_limit {
            return Ok(ControlFlow::Break(()));
        }
        Ok(ControlFlow::Continue(()))
    }

    fn finish(self, stopped_at_limit: bool) -> ParsedTrace {
        if stopped_at_limit {
            info!(
                "Tick limit passed at tick {} after {} lines",
                self.tick, self.lines_read
            );
        }
        debug!(
            "Parsed {} processes, {} samples, {} noise lines",
            self.series.len(),
            self.series.total_samples(),
            self.noise_lines
        );
        ParsedTrace {
            series: self.series,
            final_tick: self.tick,
            lines_read: self.lines_read,
            noise_lines: self.noise_lines,
            skipped_malformed: self.skipped_malformed,
            stopped_at_limit,
        }
    }
}

/// Single-pass, stateless trace parser
#[derive(Debug, Clone, Default)]
pub struct TraceParser {
    options: ParseOptions,
}

impl TraceParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Open and parse a trace file; the file is closed on every return path
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParsedTrace, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<ParsedTrace, TraceError> {
        let mut state = ParseState::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TraceError::Read {
                line: idx + 1,
                source,
            })?;
            if state.feed(idx + 1, &line, &self.options)?.is_break() {
                return Ok(state.finish(true));
            }
        }
        Ok(state.finish(false))
    }

    /// Parse lines that are already in memory (trailing newlines allowed)
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<ParsedTrace, TraceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = ParseState::default();
        for (idx, line) in lines.into_iter().enumerate() {
            if state.feed(idx + 1, line.as_ref(), &self.options)?.is_break() {
                return Ok(state.finish(true));
            }
        }
        Ok(state.finish(false))
    }
}
