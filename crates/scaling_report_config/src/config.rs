use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::errors::ConfigError;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_OUTPUT_DIR: &str = "scaling_report";
pub const DEFAULT_DPI: u32 = 250;
pub const DEFAULT_WIDTH_INCHES: f64 = 10.0;
pub const DEFAULT_HEIGHT_INCHES: f64 = 6.0;

/// Controls where the report artifacts are written and how the charts look.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory receiving the charts and the aggregated table. Created if absent.
    pub output_dir: PathBuf,
    /// Base title of every chart. When unset, a per-benchmark default is used.
    pub title: Option<String>,
    /// Image resolution; the pixel size of a chart is its size in inches times this value.
    #[validate(range(min = 50, max = 1200))]
    pub dpi: u32,
    /// Logarithmic y axis for elapsed time and latency charts.
    pub log_scale: bool,
    #[validate(range(min = 2.0, max = 40.0))]
    pub width_inches: f64,
    #[validate(range(min = 2.0, max = 40.0))]
    pub height_inches: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            title: None,
            dpi: DEFAULT_DPI,
            log_scale: false,
            width_inches: DEFAULT_WIDTH_INCHES,
            height_inches: DEFAULT_HEIGHT_INCHES,
        }
    }
}

/// Values given explicitly on the command line. They take precedence over the config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub dpi: Option<u32>,
    /// Only a set flag overrides; an unset flag keeps the file value.
    pub log_scale: bool,
}

impl ReportConfig {
    /// Reads a JSON config file. Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading report config from {}.", path.display());
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Builds the effective config: defaults, then the optional file, then the overrides.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        config.validate()?;
        info!(
            "Report config: output_dir={}, dpi={}, log_scale={}.",
            config.output_dir.display(),
            config.dpi,
            config.log_scale
        );
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides { output_dir, title, dpi, log_scale } = overrides;
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
        if title.is_some() {
            self.title = title;
        }
        if let Some(dpi) = dpi {
            self.dpi = dpi;
        }
        self.log_scale |= log_scale;
    }

    /// The chart title, or `default` when none was configured.
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(default)
    }

    /// Chart dimensions in pixels (width, height).
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        #[allow(clippy::as_conversions)]
        let to_pixels = |inches: f64| (inches * dpi).round() as u32;
        (to_pixels(self.width_inches), to_pixels(self.height_inches))
    }
}
