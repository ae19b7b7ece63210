//! Summary statistics over a parsed trace.

use crate::trace::{ParsedTrace, ProcessSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statistics for one process series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub pid: u64,
    pub samples: usize,
    pub first_tick: u64,
    pub last_tick: u64,
    pub min_queue: i64,
    pub max_queue: i64,
    pub avg_queue: f64,
}

impl ProcessSummary {
    fn from_series(series: &ProcessSeries) -> Option<Self> {
        let first = series.samples.first()?;
        let last = series.samples.last()?;
        let queues: Vec<i64> = series.samples.iter().map(|s| s.queue_length).collect();

        Some(Self {
            pid: series.pid,
            samples: series.len(),
            first_tick: first.tick,
            last_tick: last.tick,
            min_queue: queues.iter().copied().min().unwrap_or(0),
            max_queue: queues.iter().copied().max().unwrap_or(0),
            avg_queue: avg(&queues),
        })
    }
}

/// Whole-trace report, printable as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct TraceSummary {
    pub generated_at: DateTime<Utc>,
    pub ticks: u64,
    pub lines_read: usize,
    pub noise_lines: usize,
    pub skipped_malformed: usize,
    pub stopped_at_limit: bool,
    pub total_samples: usize,
    pub processes: Vec<ProcessSummary>,
}

impl TraceSummary {
    pub fn from_trace(trace: &ParsedTrace) -> Self {
        Self {
            generated_at: Utc::now(),
            ticks: trace.final_tick,
            lines_read: trace.lines_read,
            noise_lines: trace.noise_lines,
            skipped_malformed: trace.skipped_malformed,
            stopped_at_limit: trace.stopped_at_limit,
            total_samples: trace.series.total_samples(),
            processes: trace
                .series
                .iter()
                .filter_map(ProcessSummary::from_series)
                .collect(),
        }
    }

    /// Process with the highest peak queue value, first seen wins ties
    pub fn busiest(&self) -> Option<&ProcessSummary> {
        self.processes
            .iter()
            .rev()
            .max_by_key(|p| p.max_queue)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out.push_str("                  READY QUEUE SUMMARY\n");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out.push_str(&format!(
            "Ticks: {}  Processes: {}  Samples: {}\n",
            self.ticks,
            self.processes.len(),
            self.total_samples
        ));
        out.push_str(&format!(
            "Lines read: {} (noise {}, malformed {})\n",
            self.lines_read, self.noise_lines, self.skipped_malformed
        ));
        if self.stopped_at_limit {
            out.push_str("Stopped at tick limit\n");
        }

        if !self.processes.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "{:<6} {:>8} {:>6} {:>6} {:>6} {:>6} {:>8}\n",
                "PID", "Samples", "First", "Last", "Min", "Max", "Avg"
            ));
            out.push_str(&format!("{}\n", "-".repeat(52)));
            for p in &self.processes {
                out.push_str(&format!(
                    "{:<6} {:>8} {:>6} {:>6} {:>6} {:>6} {:>8.2}\n",
                    format!("P{}", p.pid),
                    p.samples,
                    p.first_tick,
                    p.last_tick,
                    p.min_queue,
                    p.max_queue,
                    p.avg_queue
                ));
            }
        }

        if let Some(p) = self.busiest() {
            out.push('\n');
            out.push_str(&format!("Highest queue: P{} peaked at {}\n", p.pid, p.max_queue));
        }
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out
    }
}

fn avg(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| i128::from(v)).sum::<i128>() as f64 / values.len() as f64
}
