//! Consumers of a finished [`BenchmarkReport`].

use std::fs;
use std::path::PathBuf;

use scaling_report_config::ReportConfig;
use tracing::info;

use crate::errors::{ReportError, ReportResult};
use crate::pipeline::BenchmarkReport;

pub mod charts;
pub mod svg;
pub mod table;


/// Receives the aggregate, derived and distribution tables once they are complete.
pub trait ArtifactSink {
    /// Produces the artifacts for `report` and returns their paths.
    fn consume(&self, report: &BenchmarkReport) -> ReportResult<Vec<PathBuf>>;
}

/// Writes SVG charts and the aggregated CSV table into the configured output directory.
pub struct FileArtifactSink {
    config: ReportConfig,
}

impl FileArtifactSink {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn write(&self, file_name: &str, content: &str) -> ReportResult<PathBuf> {
        let path = self.config.output_dir.join(file_name);
        fs::write(&path, content).map_err(|source| ReportError::io(&path, source))?;
        info!("Wrote {}.", path.display());
        Ok(path)
    }
}

impl ArtifactSink for FileArtifactSink {
    fn consume(&self, report: &BenchmarkReport) -> ReportResult<Vec<PathBuf>> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| ReportError::io(output_dir, source))?;

        let (width, height) = self.config.pixel_size();
        let mut artifacts = Vec::new();
        for chart in charts::chart_specs(report, &self.config) {
            let svg = svg::render_svg(&chart, width, height);
            artifacts.push(self.write(&chart.file_name(), &svg)?);
        }

        let table_path =
            output_dir.join(format!("{}_aggregated.csv", report.schema.shape.artifact_prefix()));
        table::write_aggregate_csv(&table_path, report)?;
        info!("Wrote {}.", table_path.display());
        artifacts.push(table_path);

        info!("Saved {} artifacts to {}.", artifacts.len(), output_dir.display());
        Ok(artifacts)
    }
}
