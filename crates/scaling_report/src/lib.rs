//! Aggregation and derived-metric pipeline for scaling benchmarks.
//!
//! A benchmark table holds one row per run: an independent variable (thread count or client
//! count), a run index and a set of measured metrics. The pipeline validates the rows, groups them
//! by the independent variable, summarizes every metric per group, derives scaling metrics and
//! hands the result to an [`sink::ArtifactSink`].
pub mod aggregate;
pub mod derived;
pub mod distribution;
pub mod errors;
pub mod pipeline;
pub mod raw_table;
pub mod schema;
pub mod sink;
pub mod stats;
pub mod summary;
pub mod trace_util;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use errors::{ReportError, ReportResult, SchemaError};
pub use pipeline::{run_pipeline, BenchmarkReport};
pub use schema::{BenchmarkShape, MetricSchema};
