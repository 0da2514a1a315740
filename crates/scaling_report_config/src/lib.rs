//! Configuration of the artifacts produced by the scaling report.
pub mod config;
pub mod errors;

pub use config::{ConfigOverrides, ReportConfig};
pub use errors::ConfigError;
