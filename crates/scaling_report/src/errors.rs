use std::path::PathBuf;

use scaling_report_config::ConfigError;
use thiserror::Error;

use crate::schema::BenchmarkShape;

pub type ReportResult<T> = Result<T, ReportError>;

/// A structurally required column is absent from the whole table.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("The {shape} benchmark table is missing required column(s): {}.", .columns.join(", "))]
    MissingColumns { shape: BenchmarkShape, columns: Vec<&'static str> },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read the benchmark table: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No benchmark row survived validation ({n_dropped} of {n_raw_rows} rows dropped).")]
    EmptyDataset { n_raw_rows: usize, n_dropped: usize },
    #[error("Failed to serialize the report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
