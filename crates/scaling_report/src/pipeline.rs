use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{AggregateRow, GroupedRecords};
use crate::derived::{derive, DerivedTable};
use crate::distribution::DistributionGroup;
use crate::errors::{ReportError, ReportResult};
use crate::raw_table::RawTable;
use crate::schema::MetricSchema;
use crate::types::{GroupKey, ValidatedRecord};
use crate::validation::{validate, ValidationDrop};

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

/// Everything computed from one benchmark table, ready for an artifact sink.
///
/// `aggregate`, `derived.rows` and `distributions` cover the same keys in the same order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub schema: MetricSchema,
    pub n_raw_rows: usize,
    pub drops: Vec<ValidationDrop>,
    /// Validated runs in input order.
    pub records: Vec<ValidatedRecord>,
    pub aggregate: Vec<AggregateRow>,
    pub derived: DerivedTable,
    /// Per-run values of the schema's distribution metric.
    pub distributions: Vec<DistributionGroup>,
}

impl BenchmarkReport {
    pub fn keys(&self) -> Vec<GroupKey> {
        self.aggregate.iter().map(|row| row.key).collect()
    }

    pub fn baseline_key(&self) -> Option<GroupKey> {
        self.derived.baseline_key
    }

    pub fn n_dropped(&self) -> usize {
        self.drops.len()
    }
}

/// Validates `table` against `schema` and computes the aggregate, derived and distribution tables.
///
/// Fails on a missing required column, and when no row survives validation.
pub fn run_pipeline(table: &RawTable, schema: &MetricSchema) -> ReportResult<BenchmarkReport> {
    let outcome = validate(table, schema)?;
    if outcome.records.is_empty() {
        return Err(ReportError::EmptyDataset {
            n_raw_rows: outcome.n_raw_rows,
            n_dropped: outcome.n_dropped(),
        });
    }

    let (aggregate, derived, distributions) = {
        let grouped = GroupedRecords::new(&outcome.records);
        let aggregate = grouped.aggregate(&schema.tracked_metrics());
        let distributions = grouped.distributions(schema.distribution_metric);
        let derived = derive(&schema.derivation, &aggregate, &grouped);
        (aggregate, derived, distributions)
    };
    info!(
        "Aggregated {} records into {} groups ({} = [{}]).",
        outcome.records.len(),
        aggregate.len(),
        schema.independent_column,
        aggregate.iter().map(|row| row.key).join(", ")
    );
    if let Some(baseline) = derived.baseline_key {
        info!("Baseline {} = {baseline}.", schema.independent_column);
    }

    Ok(BenchmarkReport {
        schema: schema.clone(),
        n_raw_rows: outcome.n_raw_rows,
        drops: outcome.drops,
        records: outcome.records,
        aggregate,
        derived,
        distributions,
    })
}
