//! The fixed chart vocabulary of each benchmark shape.

use scaling_report_config::ReportConfig;

use crate::derived::DerivedMetricRow;
use crate::pipeline::BenchmarkReport;
use crate::schema::BenchmarkShape;
use crate::sink::svg::{Axis, AxisScale, ChartBody, ChartSpec, Point, Series, SeriesStyle};
use crate::stats::MetricSummary;
use crate::types::{GroupKey, ValidatedRecord};

#[cfg(test)]
#[path = "charts_test.rs"]
mod charts_test;

const SEARCH_LATENCIES: [(&str, &str); 3] = [("p50", "p50_ms"), ("p95", "p95_ms"), ("p99", "p99_ms")];

/// Mean with a standard deviation error bar at every key.
fn summary_line<'s>(
    label: Option<&str>,
    summaries: impl Iterator<Item = (GroupKey, Option<&'s MetricSummary>)>,
) -> Series {
    Series {
        label: label.map(str::to_string),
        style: SeriesStyle::Line,
        points: summaries
            .map(|(key, summary)| {
                let summary = summary.copied().unwrap_or_default();
                Point::with_err(key.as_f64(), summary.mean, summary.std)
            })
            .collect(),
    }
}

/// Settings shared by every chart of one report.
struct ChartContext<'a> {
    report: &'a BenchmarkReport,
    title: &'a str,
    key_label: String,
    /// Scale of elapsed and latency axes.
    timing_scale: AxisScale,
}

impl<'a> ChartContext<'a> {
    fn new(report: &'a BenchmarkReport, config: &'a ReportConfig) -> Self {
        let mut key_label = report.schema.independent_column.to_string();
        if let Some(first) = key_label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Self {
            report,
            title: config.title_or(report.schema.shape.default_title()),
            key_label,
            timing_scale: if config.log_scale { AxisScale::Log } else { AxisScale::Linear },
        }
    }

    fn chart(&self, suffix: &str, title: &str, y_axis: Axis, series: Vec<Series>) -> ChartSpec {
        self.chart_with_body(suffix, title, y_axis, ChartBody::Series(series))
    }

    fn chart_with_body(&self, suffix: &str, title: &str, y_axis: Axis, body: ChartBody) -> ChartSpec {
        ChartSpec {
            name: format!("{}_{suffix}", self.report.schema.shape.artifact_prefix()),
            title: format!("{}: {title}", self.title),
            x_axis: Axis::new(self.key_label.clone()),
            y_axis,
            body,
        }
    }

    fn timing_axis(&self, label: &str) -> Axis {
        Axis::new(label).with_scale(self.timing_scale)
    }

    fn metric_line(&self, label: Option<&str>, metric: &str) -> Series {
        summary_line(label, self.report.aggregate.iter().map(|row| (row.key, row.metric(metric))))
    }

    fn derived_summary_line(
        &self,
        summary_of: impl Fn(&DerivedMetricRow) -> Option<&MetricSummary>,
    ) -> Series {
        summary_line(None, self.report.derived.rows.iter().map(|row| (row.key, summary_of(row))))
    }

    fn derived_line(&self, value_of: impl Fn(&DerivedMetricRow) -> Option<f64>) -> Series {
        Series {
            label: None,
            style: SeriesStyle::Line,
            points: self
                .report
                .derived
                .rows
                .iter()
                .map(|row| Point::new(row.key.as_f64(), value_of(row)))
                .collect(),
        }
    }

    /// One point per validated run.
    fn scatter(&self, x_of: impl Fn(&ValidatedRecord) -> Option<f64>, metric: &str) -> Series {
        Series {
            label: None,
            style: SeriesStyle::Scatter,
            points: self
                .report
                .records
                .iter()
                .filter_map(|record| Some(Point::new(x_of(record)?, record.metric(metric))))
                .collect(),
        }
    }

    /// Boxplot of the distribution metric, or `None` when no group has values.
    fn boxplot(&self, suffix: &str, title: &str, y_axis: Axis) -> Option<ChartSpec> {
        let boxes: Vec<_> = self
            .report
            .distributions
            .iter()
            .filter_map(|group| Some((group.key.to_string(), group.boxplot()?)))
            .collect();
        if boxes.is_empty() {
            return None;
        }
        Some(self.chart_with_body(suffix, title, y_axis, ChartBody::Boxes(boxes)))
    }
}

fn build_charts(context: &ChartContext<'_>) -> Vec<ChartSpec> {
    let report = context.report;
    let primary = report.schema.derivation.primary_metric();
    let baseline = report.baseline_key().map(|key| key.to_string()).unwrap_or_default();
    let efficiency_max = report
        .derived
        .rows
        .iter()
        .filter_map(DerivedMetricRow::efficiency)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut charts = vec![
        context.chart(
            "elapsed_vs_threads",
            &format!("elapsed vs threads (baseline={baseline})"),
            context.timing_axis("Elapsed (ms) mean ± std"),
            vec![context.metric_line(None, primary)],
        ),
        context.chart(
            "speedup_vs_threads",
            "speedup vs threads",
            Axis::new(format!("Speedup (T{baseline} / Tn)")),
            vec![context.derived_line(DerivedMetricRow::speedup)],
        ),
        context.chart(
            "efficiency_vs_threads",
            "parallel efficiency",
            Axis::new("Efficiency = speedup / threads")
                .with_range(0.0, f64::max(1.05, efficiency_max * 1.1)),
            vec![context.derived_line(DerivedMetricRow::efficiency)],
        ),
    ];
    charts.extend(context.boxplot(
        "elapsed_boxplot",
        "elapsed distribution (boxplot)",
        context.timing_axis("Elapsed (ms) distribution across runs"),
    ));
    charts.push(context.chart(
        "elapsed_scatter",
        "raw points (each run)",
        context.timing_axis("Elapsed (ms) per run"),
        vec![context.scatter(|record| Some(record.key.as_f64()), primary)],
    ));
    charts
}

fn search_charts(context: &ChartContext<'_>) -> Vec<ChartSpec> {
    let primary = context.report.schema.derivation.primary_metric();
    let distribution_metric = context.report.schema.distribution_metric;

    let mut charts = vec![
        context.chart(
            "rps_vs_clients",
            "throughput (RPS)",
            Axis::new("Requests/sec (mean ± std)"),
            vec![context.metric_line(None, primary)],
        ),
        context.chart(
            "latency_vs_clients",
            "latency percentiles",
            context.timing_axis("Latency (ms, mean ± std across runs)"),
            SEARCH_LATENCIES
                .iter()
                .map(|&(label, metric)| context.metric_line(Some(label), metric))
                .collect(),
        ),
    ];
    charts.extend(context.boxplot(
        "p95_boxplot",
        "p95 distribution (boxplot)",
        context.timing_axis("p95 latency (ms) distribution across runs"),
    ));
    let mut tradeoff = context.chart(
        "rps_vs_p95_scatter",
        "throughput-latency tradeoff",
        context.timing_axis("p95 latency (ms, per run)"),
        vec![context.scatter(|record| record.metric(primary), distribution_metric)],
    );
    tradeoff.x_axis = Axis::new("Requests/sec (per run)");
    charts.push(tradeoff);
    charts.push(context.chart(
        "efficiency",
        "efficiency (RPS/client)",
        Axis::new("RPS per client (mean ± std)"),
        vec![context.derived_summary_line(DerivedMetricRow::rate_per_unit)],
    ));
    charts.push(context.chart(
        "ok_rate",
        "success rate",
        Axis::new("OK rate (ok/(ok+fail)) mean ± std").with_range(0.0, 1.02),
        vec![context.derived_summary_line(DerivedMetricRow::ok_rate)],
    ));
    charts
}

/// Every chart produced for `report`, in a fixed order.
pub fn chart_specs(report: &BenchmarkReport, config: &ReportConfig) -> Vec<ChartSpec> {
    let context = ChartContext::new(report, config);
    match report.schema.shape {
        BenchmarkShape::Build => build_charts(&context),
        BenchmarkShape::Search => search_charts(&context),
    }
}
