//! Scaling metrics derived from the grouped data.
//!
//! Every ratio with a zero or missing denominator is `None`. It is never reported as zero and the
//! row it belongs to is never dropped.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{AggregateRow, GroupedRecords};
use crate::schema::DerivationFamily;
use crate::stats::MetricSummary;
use crate::types::{GroupKey, ValidatedRecord};

#[cfg(test)]
#[path = "derived_test.rs"]
mod derived_test;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DerivedMetrics {
    RelativeToBaseline {
        /// Baseline mean over this group's mean.
        speedup: Option<f64>,
        /// Speedup per unit of the key; 1.0 is ideal linear scaling.
        efficiency: Option<f64>,
    },
    RateStyle {
        /// Per-run `ok / (ok + fail)`, summarized over runs with a non-zero denominator.
        ok_rate: MetricSummary,
        /// Per-run primary metric over the key.
        rate_per_unit: MetricSummary,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedMetricRow {
    pub key: GroupKey,
    pub metrics: DerivedMetrics,
}

impl DerivedMetricRow {
    pub fn speedup(&self) -> Option<f64> {
        match self.metrics {
            DerivedMetrics::RelativeToBaseline { speedup, .. } => speedup,
            DerivedMetrics::RateStyle { .. } => None,
        }
    }

    pub fn efficiency(&self) -> Option<f64> {
        match self.metrics {
            DerivedMetrics::RelativeToBaseline { efficiency, .. } => efficiency,
            DerivedMetrics::RateStyle { .. } => None,
        }
    }

    pub fn ok_rate(&self) -> Option<&MetricSummary> {
        match &self.metrics {
            DerivedMetrics::RateStyle { ok_rate, .. } => Some(ok_rate),
            DerivedMetrics::RelativeToBaseline { .. } => None,
        }
    }

    pub fn rate_per_unit(&self) -> Option<&MetricSummary> {
        match &self.metrics {
            DerivedMetrics::RateStyle { rate_per_unit, .. } => Some(rate_per_unit),
            DerivedMetrics::RelativeToBaseline { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DerivedTable {
    /// Key every ratio is relative to. Always the smallest key; `None` for the rate family.
    pub baseline_key: Option<GroupKey>,
    pub rows: Vec<DerivedMetricRow>,
}

/// `None` for a zero denominator and for any quotient that is not a finite number.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|value| value.is_finite())
}

pub fn ok_rate(ok: f64, fail: f64) -> Option<f64> {
    let total = ok + fail;
    if total.is_finite() {
        ratio(ok, total)
    } else {
        ratio(ok / 2.0, ok / 2.0 + fail / 2.0)
    }
}

pub fn rate_per_unit(primary: f64, key: GroupKey) -> Option<f64> {
    ratio(primary, key.as_f64())
}

/// Speedup and efficiency of every row against the first (smallest key) row of `aggregate`.
pub fn derive_relative_to_baseline(aggregate: &[AggregateRow], primary_metric: &str) -> DerivedTable {
    let Some(baseline) = aggregate.first() else {
        return DerivedTable::default();
    };
    let baseline_mean = baseline.mean(primary_metric);
    debug!("Baseline {} mean {primary_metric} = {baseline_mean:?}.", baseline.key);

    let rows = aggregate
        .iter()
        .map(|row| {
            let speedup = baseline_mean
                .zip(row.mean(primary_metric))
                .and_then(|(baseline_mean, mean)| ratio(baseline_mean, mean));
            let efficiency = speedup.and_then(|speedup| ratio(speedup, row.key.as_f64()));
            DerivedMetricRow {
                key: row.key,
                metrics: DerivedMetrics::RelativeToBaseline { speedup, efficiency },
            }
        })
        .collect();
    DerivedTable { baseline_key: Some(baseline.key), rows }
}

fn record_ok_rate(record: &ValidatedRecord, ok_metric: &str, fail_metric: &str) -> Option<f64> {
    ok_rate(record.metric(ok_metric)?, record.metric(fail_metric)?)
}

/// Per-run success rate and per-unit throughput, summarized per group.
pub fn derive_rate_style(
    grouped: &GroupedRecords<'_>,
    primary_metric: &str,
    ok_metric: &str,
    fail_metric: &str,
) -> DerivedTable {
    let rows = grouped
        .iter()
        .map(|(key, records)| {
            let ok_rate = MetricSummary::from_values(
                records.iter().filter_map(|record| record_ok_rate(record, ok_metric, fail_metric)),
            );
            let rate_per_unit = MetricSummary::from_values(
                GroupedRecords::values(records, primary_metric)
                    .filter_map(|primary| rate_per_unit(primary, key)),
            );
            DerivedMetricRow { key, metrics: DerivedMetrics::RateStyle { ok_rate, rate_per_unit } }
        })
        .collect();
    DerivedTable { baseline_key: None, rows }
}

/// Computes the derived table selected by `family`.
///
/// `aggregate` and `grouped` must come from the same validated records.
pub fn derive(
    family: &DerivationFamily,
    aggregate: &[AggregateRow],
    grouped: &GroupedRecords<'_>,
) -> DerivedTable {
    match *family {
        DerivationFamily::RelativeToBaseline { primary_metric } => {
            derive_relative_to_baseline(aggregate, primary_metric)
        }
        DerivationFamily::RateStyle { primary_metric, ok_metric, fail_metric } => {
            derive_rate_style(grouped, primary_metric, ok_metric, fail_metric)
        }
    }
}
