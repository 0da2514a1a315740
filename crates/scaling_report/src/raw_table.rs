use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::info;

use crate::errors::{ReportError, ReportResult};

#[cfg(test)]
#[path = "raw_table_test.rs"]
mod raw_table_test;

/// A benchmark table as read from storage: named columns and untyped cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses CSV with a header line. Rows may be shorter or longer than the header; cells past
    /// the end of a row are treated as missing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader =
            ReaderBuilder::new().has_headers(true).flexible(true).trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> ReportResult<Self> {
        info!("Reading benchmark table from {}.", path.display());
        let file = File::open(path).map_err(|source| ReportError::io(path, source))?;
        let table = Self::from_reader(BufReader::new(file))?;
        info!("Read {} rows with columns [{}].", table.n_rows(), table.headers.join(", "));
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// Numeric coercion of a single cell. Empty, unparsable and non-finite cells are missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}
