//! Queue Plot - chart per-process ready-queue lengths from scheduler traces.
//!
//! Reads the process-table dumps a scheduling simulator prints once per
//! tick and draws one line per process ID against tick number.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use queueplot::plot;
use queueplot::trace::DEFAULT_TICK_LIMIT;
use queueplot::{MalformedPolicy, Palette, ParseOptions, RenderConfig, TraceParser, TraceSummary};
use std::path::PathBuf;

/// Plot per-process ready-queue lengths from a scheduler trace
#[derive(Parser, Debug)]
#[command(name = "queueplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trace file written by the simulator
    #[arg(default_value = "output_file")]
    trace: PathBuf,

    /// Stop reading once the tick counter passes this value
    #[arg(short = 't', long, default_value_t = DEFAULT_TICK_LIMIT)]
    tick_limit: u64,

    /// Comma-separated curve colors, indexed by process ID (names or #rrggbb)
    #[arg(short, long, value_delimiter = ',')]
    palette: Option<Vec<String>>,

    /// Figure width in figure units
    #[arg(long, default_value_t = 30)]
    width: u32,

    /// Figure height in figure units
    #[arg(long, default_value_t = 30)]
    height: u32,

    /// Pixels per figure unit
    #[arg(long, default_value_t = 100)]
    dpi: u32,

    /// Output SVG file
    #[arg(short, long, default_value = "queue_lengths.svg")]
    output: PathBuf,

    /// Skip sample lines that do not hold two integers instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Print a per-process summary
    #[arg(long)]
    summary: bool,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,

    /// Parse only, do not draw the chart
    #[arg(long)]
    no_plot: bool,
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            tick_limit: self.tick_limit,
            malformed: if self.skip_malformed {
                MalformedPolicy::Skip
            } else {
                MalformedPolicy::Fail
            },
        }
    }

    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            dpi: self.dpi,
            ..Default::default()
        }
    }

    fn palette(&self) -> Result<Palette> {
        match &self.palette {
            Some(tokens) => Palette::from_tokens(tokens).context("Invalid --palette"),
            None => Ok(Palette::default()),
        }
    }
}

fn run(args: &Args) -> Result<()> {
    // Resolve the palette before reading anything so a bad flag fails fast
    let palette = args.palette()?;

    eprintln!("Loading trace from: {}", args.trace.display());
    debug!("Parse options: {:?}", args.parse_options());
    let parsed = TraceParser::new(args.parse_options()).parse_file(&args.trace)?;

    eprintln!(
        "Read {} ticks, {} processes, {} samples{}",
        parsed.final_tick,
        parsed.series.len(),
        parsed.series.total_samples(),
        if parsed.stopped_at_limit { " (tick limit reached)" } else { "" }
    );
    if parsed.skipped_malformed > 0 {
        eprintln!("Skipped {} malformed lines", parsed.skipped_malformed);
    }

    if !args.no_plot {
        plot::render(&parsed.series, &palette, &args.render_config(), &args.output)?;
        eprintln!("Wrote figure: {}", args.output.display());
    }

    if args.summary || args.summary_json {
        let summary = TraceSummary::from_trace(&parsed);
        if args.summary {
            println!("\n{}", summary.render_text());
        }
        if args.summary_json {
            println!("{}", summary.to_json()?);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use queueplot::{PlotError, TraceError};
    use std::fs;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("queueplot").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        assert_eq!(args.trace, PathBuf::from("output_file"));
        assert_eq!(args.parse_options(), ParseOptions::default());
        assert_eq!(args.render_config(), RenderConfig::default());
        assert_eq!(args.palette().unwrap(), Palette::default());
        assert_eq!(args.output, PathBuf::from("queue_lengths.svg"));
    }

    #[test]
    fn test_flags_map_to_options() {
        let args = args(&[
            "trace.txt",
            "--tick-limit",
            "12",
            "--skip-malformed",
            "--palette",
            "red,#00ff00",
            "--width",
            "8",
            "--dpi",
            "50",
        ]);
        assert_eq!(args.parse_options().tick_limit, 12);
        assert_eq!(args.parse_options().malformed, MalformedPolicy::Skip);
        assert_eq!(args.palette().unwrap().len(), 2);
        assert_eq!(args.render_config().pixel_size(), (400, 1500));
    }

    #[test]
    fn test_run_writes_figure() {
        let dir = tempfile::tempdir().unwrap();
        let trace = dir.path().join("output_file");
        let output = dir.path().join("out.svg");
        let mut file = fs::File::create(&trace).unwrap();
        writeln!(file, "PID\tPriority\tState").unwrap();
        writeln!(file, "1\t0\trun   ").unwrap();
        writeln!(file, "2\t3\tsleep ").unwrap();
        drop(file);

        let args = args(&[
            trace.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--width",
            "4",
            "--height",
            "3",
        ]);
        run(&args).unwrap();

        assert!(fs::read_to_string(&output).unwrap().contains("P2"));
    }

    #[test]
    fn test_run_accepts_wide_pids_without_plot() {
        let dir = tempfile::tempdir().unwrap();
        let trace = dir.path().join("trace");
        fs::write(&trace, "PID\n4294967296 2\n").unwrap();

        run(&args(&[trace.to_str().unwrap(), "--no-plot", "--summary"])).unwrap();

        let err = run(&args(&[
            trace.to_str().unwrap(),
            "-o",
            dir.path().join("out.svg").to_str().unwrap(),
        ]))
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlotError>(),
            Some(&PlotError::PaletteExhausted { pid: 4_294_967_296, len: 16 })
        );
    }

    #[test]
    fn test_run_surfaces_named_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = run(&args(&[missing.to_str().unwrap(), "--no-plot"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TraceError>(),
            Some(TraceError::SourceUnavailable { .. })
        ));

        let trace = dir.path().join("trace");
        fs::write(&trace, "PID\n17 1\n").unwrap();
        let output = dir.path().join("out.svg");
        let err = run(&args(&[
            trace.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlotError>(),
            Some(&PlotError::PaletteExhausted { pid: 17, len: 16 })
        );
        assert!(!output.exists());
    }
}
