//! Scatter plots of sample layouts colored by a categorical label
//!
//! Each label becomes one series with its own legend entry. Labels listed in
//! `PlotOptions::hidden` keep their legend entry and color but draw no points,
//! which is how a toggled-off legend entry is expressed in a static file.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{CompendiumError, Result};
use crate::layout::{LabeledLayout, UNKNOWN_LABEL};

/// Number of most frequent diseases given their own legend entry
pub const TOP_DISEASES: usize = 9;

/// Rendering options
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    /// Labels whose points are not drawn
    pub hidden: BTreeSet<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1400,
            height: 1000,
            point_size: 4,
            hidden: BTreeSet::new(),
        }
    }
}

/// Points of one label, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    /// Palette slot, stable whether or not the series is hidden
    pub color_index: usize,
    pub points: Vec<(f64, f64)>,
    pub hidden: bool,
}

/// Distinct labels in order of first appearance
pub fn unique_labels(labels: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    labels
        .iter()
        .filter(|l| seen.insert(l.as_str()))
        .cloned()
        .collect()
}

/// The `n` most frequent labels; ties keep first-appearance order
pub fn top_labels(labels: &[String], n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    let mut ordered = unique_labels(labels);
    // stable sort keeps first appearance among equal counts
    ordered.sort_by(|a, b| counts[b.as_str()].cmp(&counts[a.as_str()]));
    ordered.truncate(n);
    ordered
}

/// Group points by label, one series per entry of `labels`
pub fn build_series(data: &LabeledLayout, labels: &[String], hidden: &BTreeSet<String>) -> Vec<ScatterSeries> {
    labels
        .iter()
        .enumerate()
        .map(|(color_index, label)| {
            let is_hidden = hidden.contains(label);
            let points = if is_hidden {
                Vec::new()
            } else {
                (0..data.len())
                    .filter(|&i| &data.labels[i] == label)
                    .map(|i| (data.x[i], data.y[i]))
                    .collect()
            };
            ScatterSeries {
                label: label.clone(),
                color_index,
                points,
                hidden: is_hidden,
            }
        })
        .collect()
}

/// Plot colored by compendium of origin, one legend entry per compendium
pub fn compendium_plot<P: AsRef<Path>>(data: &LabeledLayout, opts: &PlotOptions, path: P) -> Result<()> {
    let labels = unique_labels(&data.labels);
    log::info!("Compendium plot: {} samples, {} compendia", data.len(), labels.len());
    render(data, &labels, opts, path.as_ref())
}

/// Disease labels for the legend: lowercased, the nine most common, then `unknown`
pub fn disease_labels(data: &LabeledLayout) -> Vec<String> {
    let mut labels = top_labels(&data.labels, TOP_DISEASES + 1)
        .into_iter()
        .filter(|l| l != UNKNOWN_LABEL)
        .take(TOP_DISEASES)
        .collect::<Vec<_>>();
    labels.push(UNKNOWN_LABEL.to_string());
    labels
}

/// Plot colored by disease. Labels are lowercased first; diseases outside the
/// nine most common are not drawn.
pub fn disease_plot<P: AsRef<Path>>(data: &LabeledLayout, opts: &PlotOptions, path: P) -> Result<()> {
    let mut lowered = data.clone();
    lowered.lowercase_labels();
    let labels = disease_labels(&lowered);
    log::info!("Disease plot: {} samples, {} legend entries", lowered.len(), labels.len());
    render(&lowered, &labels, opts, path.as_ref())
}

fn render(data: &LabeledLayout, labels: &[String], opts: &PlotOptions, path: &Path) -> Result<()> {
    let series = build_series(data, labels, &opts.hidden);
    let size = (opts.width, opts.height);
    let is_png = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("png"));

    let outcome = if is_png {
        draw_scatter(BitMapBackend::new(path, size).into_drawing_area(), data, &series, opts)
    } else {
        draw_scatter(SVGBackend::new(path, size).into_drawing_area(), data, &series, opts)
    };
    outcome.map_err(|e| CompendiumError::Plot { reason: e.to_string() })?;
    log::info!("Plot written to {}", path.display());
    Ok(())
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (-1.0, 1.0);
    }
    if hi - lo <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn draw_scatter<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &LabeledLayout,
    series: &[ScatterSeries],
    opts: &PlotOptions,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(&data.x);
    let (y_min, y_max) = padded_range(&data.y);

    let mut chart = ChartBuilder::on(&root)
        .caption(&opts.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()?;

    for s in series {
        let color = Palette99::pick(s.color_index).mix(1.0);
        let legend_color = if s.hidden { color.mix(0.3) } else { color };
        let size = opts.point_size;
        chart
            .draw_series(s.points.iter().map(|&p| Circle::new(p, size, color.filled())))?
            .label(s.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, legend_color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
