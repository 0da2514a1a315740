use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::SchemaError;
use crate::raw_table::{coerce_numeric, RawTable};
use crate::schema::{FieldConstraint, MetricSchema};
use crate::types::{GroupKey, ValidatedRecord};

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

/// Why a row was excluded from every output table.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// The independent variable is empty or not a number.
    MissingKey,
    /// The independent variable is zero or negative.
    NonPositiveKey,
    /// The independent variable has a fractional part.
    NonIntegralKey,
    /// The independent variable is too large to be held exactly as an integer.
    KeyOutOfRange,
    /// A required metric is empty or not a finite number.
    MissingMetric { metric: &'static str },
    /// A required metric parsed but violates its domain constraint.
    ConstraintViolated { metric: &'static str, constraint: FieldConstraint },
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey => write!(f, "missing key"),
            Self::NonPositiveKey => write!(f, "non-positive key"),
            Self::NonIntegralKey => write!(f, "non-integral key"),
            Self::KeyOutOfRange => write!(f, "key out of range"),
            Self::MissingMetric { metric } => write!(f, "missing {metric}"),
            Self::ConstraintViolated { metric, constraint } => {
                write!(f, "{metric} violates {constraint:?}")
            }
        }
    }
}

/// A row that failed validation. `row` is the 1-based position among the data rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationDrop {
    pub row: usize,
    pub reason: DropReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub n_raw_rows: usize,
    pub records: Vec<ValidatedRecord>,
    pub drops: Vec<ValidationDrop>,
}

impl ValidationOutcome {
    pub fn n_dropped(&self) -> usize {
        self.drops.len()
    }

    /// Number of dropped rows per reason.
    pub fn drop_counts(&self) -> BTreeMap<&DropReason, usize> {
        let mut counts = BTreeMap::new();
        for dropped in &self.drops {
            *counts.entry(&dropped.reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Column positions resolved once per table.
struct ColumnLayout {
    key: usize,
    run: usize,
    required: Vec<(usize, &'static str, FieldConstraint)>,
    optional: Vec<(usize, &'static str)>,
}

impl ColumnLayout {
    fn resolve(table: &RawTable, schema: &MetricSchema) -> Result<Self, SchemaError> {
        let located = schema.locate_columns(table.headers())?;
        Ok(Self {
            key: located.independent,
            run: located.run,
            required: schema
                .required_metrics
                .iter()
                .zip(located.metrics)
                .map(|(field, index)| (index, field.name, field.constraint))
                .collect(),
            optional: schema
                .optional_metrics
                .iter()
                .filter_map(|&name| table.column_index(name).map(|index| (index, name)))
                .collect(),
        })
    }
}

fn numeric_cell(row: &[String], index: usize) -> Option<f64> {
    row.get(index).and_then(|cell| coerce_numeric(cell))
}

/// Largest accepted key. Every integer up to 2^53 has an exact `f64` representation.
pub const MAX_KEY: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::as_conversions)]
fn parse_key(value: Option<f64>) -> Result<GroupKey, DropReason> {
    let value = value.ok_or(DropReason::MissingKey)?;
    if value <= 0.0 {
        return Err(DropReason::NonPositiveKey);
    }
    if value.fract() != 0.0 {
        return Err(DropReason::NonIntegralKey);
    }
    if value > MAX_KEY {
        return Err(DropReason::KeyOutOfRange);
    }
    Ok(GroupKey(value as u64))
}

#[allow(clippy::as_conversions)]
fn parse_run_index(value: Option<f64>) -> Option<i64> {
    value.filter(|value| value.fract() == 0.0).map(|value| value as i64)
}

fn validate_row(row: &[String], layout: &ColumnLayout) -> Result<ValidatedRecord, DropReason> {
    let key = parse_key(numeric_cell(row, layout.key))?;
    let mut metrics = BTreeMap::new();
    for &(index, metric, constraint) in &layout.required {
        let value = numeric_cell(row, index).ok_or(DropReason::MissingMetric { metric })?;
        if !constraint.is_satisfied_by(value) {
            return Err(DropReason::ConstraintViolated { metric, constraint });
        }
        metrics.insert(metric, value);
    }
    for &(index, metric) in &layout.optional {
        if let Some(value) = numeric_cell(row, index) {
            metrics.insert(metric, value);
        }
    }
    Ok(ValidatedRecord { key, run_index: parse_run_index(numeric_cell(row, layout.run)), metrics })
}

/// Coerces every row of `table` according to `schema` and keeps the rows satisfying its
/// constraints.
///
/// Fails only when a required column is absent from the table, before any row is inspected.
/// Invalid rows are never repaired: they are recorded in [`ValidationOutcome::drops`] and excluded.
pub fn validate(table: &RawTable, schema: &MetricSchema) -> Result<ValidationOutcome, SchemaError> {
    let layout = ColumnLayout::resolve(table, schema)?;
    let mut outcome = ValidationOutcome { n_raw_rows: table.n_rows(), ..Default::default() };

    for (position, row) in table.rows().iter().enumerate() {
        match validate_row(row, &layout) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => outcome.drops.push(ValidationDrop { row: position + 1, reason }),
        }
    }

    info!(
        "Validated {} benchmark table: kept {} of {} rows.",
        schema.shape,
        outcome.records.len(),
        outcome.n_raw_rows
    );
    if outcome.n_dropped() > 0 {
        warn!("Dropped {} invalid rows.", outcome.n_dropped());
        for (reason, count) in outcome.drop_counts() {
            debug!("  {count} rows dropped: {reason}.");
        }
    }
    Ok(outcome)
}
