pub mod package_integrity_test;
pub mod toml_utils;
