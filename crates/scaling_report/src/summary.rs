//! Human readable terminal summary of a report.

use std::fmt::Display;

use itertools::Itertools;

use crate::derived::DerivedMetrics;
use crate::pipeline::BenchmarkReport;

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;

const BAR_WIDTH: f64 = 40.0;

fn optional(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.2}")).unwrap_or_else(|| "-".to_string())
}

fn bar(value: Option<f64>, max: f64) -> String {
    let Some(value) = value.filter(|_| max > 0.0) else {
        return String::new();
    };
    #[allow(clippy::as_conversions)]
    let width = (value / max * BAR_WIDTH).round() as usize;
    "█".repeat(width.max(1))
}

/// Rows kept and dropped, the baseline, and one line per key with the primary metric and the
/// derived metrics.
pub struct ReportSummary<'a>(pub &'a BenchmarkReport);

impl Display for ReportSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let report = self.0;
        let schema = &report.schema;
        let primary = schema.derivation.primary_metric();

        writeln!(
            f,
            "{} benchmark: kept {} of {} rows ({} dropped).",
            schema.shape,
            report.records.len(),
            report.n_raw_rows,
            report.n_dropped()
        )?;
        let drop_counts = report.drops.iter().counts_by(|dropped| dropped.reason.to_string());
        for (reason, count) in drop_counts.into_iter().sorted() {
            writeln!(f, "  {count} rows dropped: {reason}.")?;
        }
        if let Some(baseline) = report.baseline_key() {
            writeln!(f, "Baseline {} = {baseline}.", schema.independent_column)?;
        }
        let keys = report.aggregate.iter().map(|row| row.key).join(", ");
        writeln!(f, "{} = [{keys}]", schema.independent_column)?;

        let max_mean =
            report.aggregate.iter().filter_map(|row| row.mean(primary)).fold(0.0, f64::max);
        for (row, derived) in report.aggregate.iter().zip(&report.derived.rows) {
            let mean = row.mean(primary);
            let std = row.metric(primary).and_then(|summary| summary.std);
            let derived = match &derived.metrics {
                DerivedMetrics::RelativeToBaseline { speedup, efficiency } => format!(
                    "speedup {:>6} efficiency {:>6}",
                    optional(*speedup),
                    optional(*efficiency)
                ),
                DerivedMetrics::RateStyle { ok_rate, rate_per_unit } => format!(
                    "ok rate {:>6} per {} {:>8}",
                    optional(ok_rate.mean),
                    schema.independent_column.trim_end_matches('s'),
                    optional(rate_per_unit.mean)
                ),
            };
            writeln!(
                f,
                "{:>6} x{:<3} {primary} {:>10} ± {:<8} {derived} | {}",
                row.key.0,
                row.count,
                optional(mean),
                optional(std),
                bar(mean, max_mean)
            )?;
        }
        Ok(())
    }
}

pub fn render_summary(report: &BenchmarkReport) -> String {
    ReportSummary(report).to_string()
}
