use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::derived::{DerivedMetricRow, DerivedMetrics};
use crate::errors::{ReportError, ReportResult};
use crate::pipeline::BenchmarkReport;
use crate::schema::DerivationFamily;
use crate::stats::MetricSummary;

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

const SUMMARY_FIELDS: [&str; 5] = ["count", "mean", "std", "min", "max"];

/// Undefined values are written as empty cells.
fn cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn summary_cells(summary: &MetricSummary) -> [String; 5] {
    [
        summary.count.to_string(),
        cell(summary.mean),
        cell(summary.std),
        cell(summary.min),
        cell(summary.max),
    ]
}

fn derived_header(family: &DerivationFamily) -> Vec<String> {
    let columns: &[&str] = match family {
        DerivationFamily::RelativeToBaseline { .. } => &["speedup", "efficiency"],
        DerivationFamily::RateStyle { .. } => {
            &["ok_rate_mean", "ok_rate_std", "rate_per_unit_mean", "rate_per_unit_std"]
        }
    };
    columns.iter().map(|column| column.to_string()).collect()
}

fn derived_cells(row: Option<&DerivedMetricRow>, family: &DerivationFamily) -> Vec<String> {
    match row.map(|row| &row.metrics) {
        Some(DerivedMetrics::RelativeToBaseline { speedup, efficiency }) => {
            vec![cell(*speedup), cell(*efficiency)]
        }
        Some(DerivedMetrics::RateStyle { ok_rate, rate_per_unit }) => vec![
            cell(ok_rate.mean),
            cell(ok_rate.std),
            cell(rate_per_unit.mean),
            cell(rate_per_unit.std),
        ],
        None => vec![String::new(); derived_header(family).len()],
    }
}

/// Header and rows of the persisted aggregate table.
///
/// The key column is named after the independent column, followed by the group size, five
/// summary columns per tracked metric and the derived columns.
pub fn aggregate_table(report: &BenchmarkReport) -> (Vec<String>, Vec<Vec<String>>) {
    let schema = &report.schema;
    let metrics = schema.tracked_metrics();
    let header = [schema.independent_column.to_string(), "count".to_string()]
        .into_iter()
        .chain(metrics.iter().flat_map(|metric| {
            SUMMARY_FIELDS.iter().map(move |field| format!("{metric}_{field}"))
        }))
        .chain(derived_header(&schema.derivation))
        .collect();

    let rows = report
        .aggregate
        .iter()
        .map(|row| {
            let derived = report.derived.rows.iter().find(|derived| derived.key == row.key);
            [row.key.to_string(), row.count.to_string()]
                .into_iter()
                .chain(metrics.iter().flat_map(|metric| {
                    summary_cells(&row.metric(metric).copied().unwrap_or_default())
                }))
                .chain(derived_cells(derived, &schema.derivation))
                .collect()
        })
        .collect();
    (header, rows)
}

pub fn write_aggregate_table<W: Write>(writer: W, report: &BenchmarkReport) -> ReportResult<()> {
    let (header, rows) = aggregate_table(report);
    let mut writer = Writer::from_writer(writer);
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_aggregate_csv(path: &Path, report: &BenchmarkReport) -> ReportResult<()> {
    let file = File::create(path).map_err(|source| ReportError::io(path, source))?;
    write_aggregate_table(file, report)
}
