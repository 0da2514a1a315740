//! Minimal SVG rendering of line, scatter and box charts.

use std::fmt::Display;

use itertools::Itertools;

use crate::stats::BoxplotStats;

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];
const N_TICKS: usize = 6;
/// Layout constants are given for a 600 pixel high canvas and scaled with the actual height.
const REFERENCE_HEIGHT: f64 = 600.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Axis {
    pub label: String,
    pub scale: AxisScale,
    /// Fixed `(min, max)`; fitted to the data when `None`.
    pub range: Option<(f64, f64)>,
}

impl Axis {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), ..Default::default() }
    }

    pub fn with_scale(mut self, scale: AxisScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }
}

/// One plotted point. An undefined `y` breaks the line; an undefined `err` draws no error bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: Option<f64>,
    pub err: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: Option<f64>) -> Self {
        Self { x, y, err: None }
    }

    pub fn with_err(x: f64, y: Option<f64>, err: Option<f64>) -> Self {
        Self { x, y, err }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesStyle {
    /// Markers joined by a line.
    Line,
    /// Markers only.
    Scatter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub style: SeriesStyle,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChartBody {
    Series(Vec<Series>),
    /// One labelled box per category, drawn left to right.
    Boxes(Vec<(String, BoxplotStats)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// File stem of the artifact.
    pub name: String,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn file_name(&self) -> String {
        format!("{}.svg", self.name)
    }
}

/// Maps data values of one axis onto a pixel interval.
#[derive(Clone, Copy, Debug)]
struct Projection {
    scale: AxisScale,
    min: f64,
    max: f64,
    start: f64,
    end: f64,
}

impl Projection {
    fn transform(scale: AxisScale, value: f64) -> Option<f64> {
        match scale {
            AxisScale::Linear => Some(value),
            AxisScale::Log => (value > 0.0).then(|| value.log10()),
        }
    }

    fn new(axis: &Axis, values: &[f64], start: f64, end: f64) -> Self {
        let (min, max) = match axis.range {
            Some((min, max)) => (
                Self::transform(axis.scale, min).unwrap_or(0.0),
                Self::transform(axis.scale, max).unwrap_or(1.0),
            ),
            None => fitted_range(values.iter().filter_map(|&v| Self::transform(axis.scale, v))),
        };
        Self { scale: axis.scale, min, max, start, end }
    }

    /// Pixel position of `value`, or `None` when it cannot be shown on this scale.
    fn project(&self, value: f64) -> Option<f64> {
        let transformed = Self::transform(self.scale, value)?;
        let fraction = (transformed - self.min) / (self.max - self.min);
        Some(self.start + fraction * (self.end - self.start))
    }

    fn project_clamped(&self, value: f64) -> f64 {
        let (low, high) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        self.project(value).unwrap_or(self.start).clamp(low, high)
    }

    fn ticks(&self) -> Vec<f64> {
        let n_steps = N_TICKS - 1;
        (0..=n_steps)
            .map(|step| {
                #[allow(clippy::as_conversions)]
                let position = self.min + (self.max - self.min) * step as f64 / n_steps as f64;
                match self.scale {
                    AxisScale::Linear => position,
                    AxisScale::Log => 10f64.powf(position),
                }
            })
            .collect()
    }
}

/// Data extent padded by 5% on each side. A degenerate extent is widened around its value.
fn fitted_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad, max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

pub fn format_tick(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e5 || magnitude < 1e-3 {
        return format!("{value:.1e}");
    }
    let decimals = if magnitude >= 100.0 {
        0
    } else if magnitude >= 1.0 {
        2
    } else {
        3
    };
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

struct Canvas {
    out: String,
    unit: f64,
}

impl Canvas {
    fn element(&mut self, element: impl Display) {
        self.out.push_str(&format!("  {element}\n"));
    }

    fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, extra: &str, text: &str) {
        let size = size * self.unit;
        self.element(format_args!(
            r##"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="{size:.1}" fill="#222222" text-anchor="{anchor}"{extra}>{}</text>"##,
            escape(text)
        ));
    }

    fn line(&mut self, (x1, y1): (f64, f64), (x2, y2): (f64, f64), stroke: &str, extra: &str) {
        let width = self.unit;
        self.element(format_args!(
            r##"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{stroke}" stroke-width="{width:.2}"{extra}/>"##
        ));
    }

    fn marker(&mut self, (x, y): (f64, f64), color: &str, filled: bool) {
        let radius = 4.0 * self.unit;
        let fill = if filled { color } else { "none" };
        self.element(format_args!(
            r##"<circle cx="{x:.1}" cy="{y:.1}" r="{radius:.1}" fill="{fill}" stroke="{color}"/>"##
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: &str) {
        if points.len() < 2 {
            return;
        }
        let coordinates = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).join(" ");
        let width = 2.0 * self.unit;
        self.element(format_args!(
            r##"<polyline points="{coordinates}" fill="none" stroke="{color}" stroke-width="{width:.2}"/>"##
        ));
    }
}

/// Renders `spec` as a standalone SVG document of `width` x `height` pixels.
#[allow(clippy::as_conversions)]
pub fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> String {
    let (width_px, height_px) = (f64::from(width), f64::from(height));
    let unit = height_px / REFERENCE_HEIGHT;
    let mut canvas = Canvas {
        out: format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"##
        ) + "\n",
        unit,
    };
    canvas.element(format_args!(r##"<rect width="{width}" height="{height}" fill="#ffffff"/>"##));

    let (left, right, top, bottom) =
        (90.0 * unit, width_px - 30.0 * unit, 60.0 * unit, height_px - 70.0 * unit);
    canvas.text(width_px / 2.0, 35.0 * unit, 18.0, "middle", r#" font-weight="bold""#, &spec.title);

    let (x_values, y_values, categories) = extents(&spec.body);
    let x_projection = match &spec.body {
        ChartBody::Boxes(boxes) => Projection {
            scale: AxisScale::Linear,
            min: 0.5,
            max: boxes.len() as f64 + 0.5,
            start: left,
            end: right,
        },
        ChartBody::Series(_) => Projection::new(&spec.x_axis, &x_values, left, right),
    };
    let y_projection = Projection::new(&spec.y_axis, &y_values, bottom, top);

    draw_grid(&mut canvas, &x_projection, &y_projection, categories.as_deref());
    canvas.text((left + right) / 2.0, height_px - 20.0 * unit, 14.0, "middle", "", &spec.x_axis.label);
    let label_y = (top + bottom) / 2.0;
    let label_x = 25.0 * unit;
    canvas.text(
        label_x,
        label_y,
        14.0,
        "middle",
        &format!(r#" transform="rotate(-90 {label_x:.1} {label_y:.1})""#),
        &spec.y_axis.label,
    );

    match &spec.body {
        ChartBody::Series(series) => draw_series(&mut canvas, series, &x_projection, &y_projection),
        ChartBody::Boxes(boxes) => draw_boxes(&mut canvas, boxes, &x_projection, &y_projection),
    }

    canvas.out.push_str("</svg>\n");
    canvas.out
}

type Extents = (Vec<f64>, Vec<f64>, Option<Vec<String>>);

fn extents(body: &ChartBody) -> Extents {
    match body {
        ChartBody::Series(series) => {
            let points = series.iter().flat_map(|series| &series.points);
            let x_values = points.clone().map(|point| point.x).collect();
            let y_values = points
                .flat_map(|point| {
                    let y = point.y;
                    let err = point.err.unwrap_or(0.0);
                    [y.map(|y| y - err), y, y.map(|y| y + err)]
                })
                .flatten()
                .collect();
            (x_values, y_values, None)
        }
        ChartBody::Boxes(boxes) => {
            let y_values = boxes
                .iter()
                .flat_map(|(_, stats)| {
                    [stats.whisker_low, stats.whisker_high].into_iter().chain(stats.fliers.clone())
                })
                .collect();
            let labels = boxes.iter().map(|(label, _)| label.clone()).collect();
            (Vec::new(), y_values, Some(labels))
        }
    }
}

#[allow(clippy::as_conversions)]
fn draw_grid(
    canvas: &mut Canvas,
    x_projection: &Projection,
    y_projection: &Projection,
    categories: Option<&[String]>,
) {
    let (left, right) = (x_projection.start, x_projection.end);
    let (bottom, top) = (y_projection.start, y_projection.end);
    let unit = canvas.unit;
    let grid = r##" stroke-dasharray="3,3""##;

    for tick in y_projection.ticks() {
        let Some(y) = y_projection.project(tick) else { continue };
        canvas.line((left, y), (right, y), "#dddddd", grid);
        canvas.text(left - 8.0 * unit, y + 4.0 * unit, 11.0, "end", "", &format_tick(tick));
    }
    let x_ticks: Vec<(f64, String)> = match categories {
        Some(labels) => labels
            .iter()
            .enumerate()
            .map(|(index, label)| ((index + 1) as f64, label.clone()))
            .collect(),
        None => x_projection.ticks().into_iter().map(|tick| (tick, format_tick(tick))).collect(),
    };
    for (tick, label) in x_ticks {
        let Some(x) = x_projection.project(tick) else { continue };
        canvas.line((x, top), (x, bottom), "#dddddd", grid);
        canvas.text(x, bottom + 18.0 * unit, 11.0, "middle", "", &label);
    }
    canvas.line((left, bottom), (right, bottom), "#444444", "");
    canvas.line((left, bottom), (left, top), "#444444", "");
}

fn draw_series(
    canvas: &mut Canvas,
    series: &[Series],
    x_projection: &Projection,
    y_projection: &Projection,
) {
    let cap = 4.0 * canvas.unit;
    for (index, series) in series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let mut segment = Vec::new();
        let mut markers = Vec::new();
        for point in &series.points {
            let projected = point
                .y
                .and_then(|y| Some((x_projection.project(point.x)?, y_projection.project(y)?)));
            let Some((x, y)) = projected else {
                // Undefined values leave a gap in the line.
                if series.style == SeriesStyle::Line {
                    canvas.polyline(&segment, color);
                }
                segment.clear();
                continue;
            };
            if let (Some(value), Some(err)) = (point.y, point.err) {
                let low = y_projection.project_clamped(value - err);
                let high = y_projection.project_clamped(value + err);
                canvas.line((x, low), (x, high), color, "");
                canvas.line((x - cap, low), (x + cap, low), color, "");
                canvas.line((x - cap, high), (x + cap, high), color, "");
            }
            segment.push((x, y));
            markers.push((x, y));
        }
        if series.style == SeriesStyle::Line {
            canvas.polyline(&segment, color);
        }
        for marker in markers {
            canvas.marker(marker, color, true);
        }
    }
    draw_legend(canvas, series, x_projection.end, y_projection.end);
}

#[allow(clippy::as_conversions)]
fn draw_legend(canvas: &mut Canvas, series: &[Series], right: f64, top: f64) {
    let unit = canvas.unit;
    for (index, series) in series.iter().enumerate() {
        let Some(label) = &series.label else { continue };
        let color = PALETTE[index % PALETTE.len()];
        let y = top + (15.0 + 20.0 * index as f64) * unit;
        let x = right - 90.0 * unit;
        canvas.element(format_args!(
            r##"<rect x="{x:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{color}"/>"##,
            y - 2.0 * unit,
            25.0 * unit,
            4.0 * unit
        ));
        canvas.text(x + 32.0 * unit, y + 4.0 * unit, 12.0, "start", "", label);
    }
}

#[allow(clippy::as_conversions)]
fn draw_boxes(
    canvas: &mut Canvas,
    boxes: &[(String, BoxplotStats)],
    x_projection: &Projection,
    y_projection: &Projection,
) {
    let color = PALETTE[0];
    let slot = (x_projection.end - x_projection.start) / boxes.len().max(1) as f64;
    let half_width = slot * 0.25;
    for (index, (_, stats)) in boxes.iter().enumerate() {
        let Some(x) = x_projection.project((index + 1) as f64) else { continue };
        let y = |value: f64| y_projection.project_clamped(value);
        let (q1, q3) = (y(stats.q1), y(stats.q3));
        canvas.element(format_args!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#dbe9f6" stroke="{color}"/>"##,
            x - half_width,
            q3.min(q1),
            2.0 * half_width,
            (q1 - q3).abs()
        ));
        canvas.line((x - half_width, y(stats.median)), (x + half_width, y(stats.median)), "#ff7f0e", "");
        for (end, whisker) in [(q1, y(stats.whisker_low)), (q3, y(stats.whisker_high))] {
            canvas.line((x, end), (x, whisker), color, "");
            canvas.line((x - half_width / 2.0, whisker), (x + half_width / 2.0, whisker), color, "");
        }
        for &flier in &stats.fliers {
            if let Some(flier_y) = y_projection.project(flier) {
                canvas.marker((x, flier_y), color, false);
            }
        }
    }
}
