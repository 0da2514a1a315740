use std::fmt::Display;

use serde::Serialize;

use crate::errors::SchemaError;

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;

/// The two benchmark table layouts understood by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkShape {
    /// Index build runs, grouped by worker thread count.
    Build,
    /// Search load runs, grouped by concurrent client count.
    Search,
}

impl BenchmarkShape {
    /// Prefix of every artifact produced for this shape.
    pub fn artifact_prefix(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Search => "search",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Build => "Build benchmark",
            Self::Search => "Search benchmark",
        }
    }
}

impl Display for BenchmarkShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.artifact_prefix())
    }
}

/// Domain constraint a required metric must satisfy for its row to be kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Durations, rates and latencies: strictly greater than zero.
    Positive,
    /// Counts: present, zero allowed.
    NonNegative,
}

impl FieldConstraint {
    pub fn is_satisfied_by(&self, value: f64) -> bool {
        match self {
            Self::Positive => value > 0.0,
            Self::NonNegative => value >= 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MetricField {
    pub name: &'static str,
    pub constraint: FieldConstraint,
}

impl MetricField {
    pub const fn positive(name: &'static str) -> Self {
        Self { name, constraint: FieldConstraint::Positive }
    }

    pub const fn non_negative(name: &'static str) -> Self {
        Self { name, constraint: FieldConstraint::NonNegative }
    }
}

/// Selects which derived metrics are computed from the grouped data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DerivationFamily {
    /// Speedup and efficiency relative to the group with the smallest key.
    RelativeToBaseline { primary_metric: &'static str },
    /// Per-run success rate and per-unit throughput; no baseline.
    RateStyle { primary_metric: &'static str, ok_metric: &'static str, fail_metric: &'static str },
}

impl DerivationFamily {
    pub fn primary_metric(&self) -> &'static str {
        match *self {
            Self::RelativeToBaseline { primary_metric } | Self::RateStyle { primary_metric, .. } => {
                primary_metric
            }
        }
    }
}

/// Positions of the required columns within one table header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredColumns {
    pub independent: usize,
    pub run: usize,
    /// One position per required metric, in declaration order.
    pub metrics: Vec<usize>,
}

/// Column layout and metric vocabulary of one benchmark shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSchema {
    pub shape: BenchmarkShape,
    pub independent_column: &'static str,
    pub run_column: &'static str,
    pub required_metrics: Vec<MetricField>,
    /// Carried through when present; never a reason to drop a row.
    pub optional_metrics: Vec<&'static str>,
    pub derivation: DerivationFamily,
    /// Metric whose per-run spread is drawn as a boxplot.
    pub distribution_metric: &'static str,
}

impl MetricSchema {
    pub fn build() -> Self {
        Self {
            shape: BenchmarkShape::Build,
            independent_column: "threads",
            run_column: "run",
            required_metrics: vec![MetricField::positive("elapsed_ms")],
            optional_metrics: vec!["scanned", "indexed", "skipped", "errors"],
            derivation: DerivationFamily::RelativeToBaseline { primary_metric: "elapsed_ms" },
            distribution_metric: "elapsed_ms",
        }
    }

    pub fn search() -> Self {
        Self {
            shape: BenchmarkShape::Search,
            independent_column: "clients",
            run_column: "run",
            required_metrics: vec![
                MetricField::positive("rps"),
                MetricField::positive("p50_ms"),
                MetricField::positive("p95_ms"),
                MetricField::positive("p99_ms"),
                MetricField::non_negative("ok"),
                MetricField::non_negative("fail"),
            ],
            optional_metrics: vec!["total", "duration_s", "topk"],
            derivation: DerivationFamily::RateStyle {
                primary_metric: "rps",
                ok_metric: "ok",
                fail_metric: "fail",
            },
            distribution_metric: "p95_ms",
        }
    }

    pub fn for_shape(shape: BenchmarkShape) -> Self {
        match shape {
            BenchmarkShape::Build => Self::build(),
            BenchmarkShape::Search => Self::search(),
        }
    }

    /// Columns that must exist in the table, in declaration order.
    pub fn required_columns(&self) -> Vec<&'static str> {
        [self.independent_column, self.run_column]
            .into_iter()
            .chain(self.required_metrics.iter().map(|field| field.name))
            .collect()
    }

    /// Every metric summarized in the aggregate table: required metrics, then optional ones.
    pub fn tracked_metrics(&self) -> Vec<&'static str> {
        self.required_metrics
            .iter()
            .map(|field| field.name)
            .chain(self.optional_metrics.iter().copied())
            .collect()
    }

    /// Position of every required column in `headers`, or the full list of those absent.
    ///
    /// A column named more than once resolves to its first occurrence.
    pub fn locate_columns<S: AsRef<str>>(
        &self,
        headers: &[S],
    ) -> Result<RequiredColumns, SchemaError> {
        let mut missing = Vec::new();
        let mut locate = |column: &'static str| {
            let index = headers.iter().position(|header| header.as_ref() == column);
            if index.is_none() {
                missing.push(column);
            }
            index
        };
        let independent = locate(self.independent_column);
        let run = locate(self.run_column);
        // Locate every metric before checking, so the error lists all missing columns.
        let metrics: Vec<Option<usize>> =
            self.required_metrics.iter().map(|field| locate(field.name)).collect();

        match (independent, run, metrics.into_iter().collect::<Option<Vec<usize>>>()) {
            (Some(independent), Some(run), Some(metrics)) if missing.is_empty() => {
                Ok(RequiredColumns { independent, run, metrics })
            }
            _ => Err(SchemaError::MissingColumns { shape: self.shape, columns: missing }),
        }
    }

    /// Fails with the full list of required columns absent from `headers`.
    pub fn check_columns<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), SchemaError> {
        self.locate_columns(headers).map(|_| ())
    }
}
