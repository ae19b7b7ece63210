//! Queue-length chart rendering to SVG.

use crate::error::PlotError;
use crate::palette::Palette;
use crate::trace::SeriesMap;
use anyhow::{Context, Result};
use log::info;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Figure size in figure units, scaled to pixels by `dpi`
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub caption: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            dpi: 100,
            caption: "Ready queue per process".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.saturating_mul(self.dpi).max(1),
            self.height.saturating_mul(self.dpi).max(1),
        )
    }
}

/// One process series with its color and legend label resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub pid: u64,
    pub label: String,
    pub color: RGBColor,
    /// (tick, queue length) with the queue axis in `f64`
    pub points: Vec<(u64, f64)>,
}

pub fn legend_label(pid: u64) -> String {
    format!("P{}", pid)
}

/// Resolve colors and labels in map order; fails on the first PID outside the palette
pub fn plan_curves(series: &SeriesMap, palette: &Palette) -> Result<Vec<Curve>, PlotError> {
    series
        .iter()
        .map(|s| {
            palette.color_for(s.pid).map(|color| Curve {
                pid: s.pid,
                label: legend_label(s.pid),
                color,
                points: s.points().map(|(tick, q)| (tick, q as f64)).collect(),
            })
        })
        .collect()
}

fn axis_ranges(curves: &[Curve]) -> (Range<u64>, Range<f64>) {
    let points = || curves.iter().flat_map(|c| c.points.iter());
    let max_tick = points().map(|&(t, _)| t).max().unwrap_or(0).max(1);
    let min_queue = points().map(|&(_, q)| q).fold(0.0, f64::min);
    let max_queue = points().map(|&(_, q)| q).fold(1.0, f64::max);

    (0..max_tick.saturating_add(1), min_queue..max_queue + 1.0)
}

/// Draw every series as a line with a `P<pid>` legend entry and write the SVG
pub fn render<P: AsRef<Path>>(
    series: &SeriesMap,
    palette: &Palette,
    config: &RenderConfig,
    path: P,
) -> Result<()> {
    let curves = plan_curves(series, palette)?;
    draw_curves(&curves, config, path.as_ref())
        .with_context(|| format!("Failed to draw chart: {}", path.as_ref().display()))?;
    info!("Wrote {} curves to {}", curves.len(), path.as_ref().display());
    Ok(())
}

fn draw_curves(curves: &[Curve], config: &RenderConfig, path: &Path) -> Result<()> {
    let (x_range, y_range) = axis_ranges(curves);

    let root = SVGBackend::new(path, config.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.caption, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh()
        .x_desc("Tick")
        .y_desc("Queue")
        .draw()?;

    for curve in curves {
        let color = curve.color;
        chart.draw_series(LineSeries::new(curve.points.iter().copied(), &color))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if !curves.is_empty() {
        chart.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
