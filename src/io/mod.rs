//! Keyed-table persistence for accumulated metrics.
//!
//! The accumulator externalizes its state as three logical tables (metric
//! rows, labels, threshold). A [`TableStore`] is anything that can replace a
//! named table with a list of rows and read it back. Backends:
//!
//! - [`MemoryTableStore`]: in-process, for tests and short-lived pipelines
//! - [`JsonTableStore`]: every table in one JSON document
//! - [`CsvTableStore`] (feature `csv`): one `<table>.csv` per table
//! - [`ParquetTableStore`] (feature `polars`): one `<table>.parquet` per table

#[cfg(feature = "csv")]
pub mod csv_store;
pub mod json_store;
pub mod memory;
#[cfg(feature = "polars")]
pub mod parquet_store;

#[cfg(feature = "csv")]
pub use csv_store::CsvTableStore;
pub use json_store::JsonTableStore;
pub use memory::MemoryTableStore;
#[cfg(feature = "polars")]
pub use parquet_store::ParquetTableStore;

use crate::core::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One cell of a persisted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer cell
    Int(i64),
    /// Floating-point cell
    Float(f64),
    /// Text cell
    Text(String),
}

impl Value {
    /// Parse a textual cell, preferring integer, then float, then text
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            Value::Int(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            Value::Float(v)
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// Integer view; floats qualify only when integral
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                if v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Numeric view
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            Value::Text(_) => None,
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One row of a persisted table, keyed by column name.
pub type TableRow = BTreeMap<String, Value>;

/// Generic keyed-table store.
pub trait TableStore {
    /// Replace `table` with `rows`
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()>;

    /// Read all rows of `table`; fails with `TableNotFound` when absent
    fn read(&self, table: &str) -> Result<Vec<TableRow>>;

    /// Names of all stored tables
    fn tables(&self) -> Result<Vec<String>>;

    /// Whether `table` exists
    fn contains(&self, table: &str) -> Result<bool> {
        Ok(self.tables()?.iter().any(|t| t == table))
    }
}

impl<T: TableStore + ?Sized> TableStore for Box<T> {
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
        (**self).write(table, rows)
    }

    fn read(&self, table: &str) -> Result<Vec<TableRow>> {
        (**self).read(table)
    }

    fn tables(&self) -> Result<Vec<String>> {
        (**self).tables()
    }
}

/// Supported on-disk store formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreFormat {
    /// Directory of CSV files
    Csv,
    /// Single JSON document
    Json,
    /// Directory of Parquet files
    Parquet,
}

impl Default for StoreFormat {
    fn default() -> Self {
        StoreFormat::Csv
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFormat::Csv => write!(f, "csv"),
            StoreFormat::Json => write!(f, "json"),
            StoreFormat::Parquet => write!(f, "parquet"),
        }
    }
}

impl std::str::FromStr for StoreFormat {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(StoreFormat::Csv),
            "json" => Ok(StoreFormat::Json),
            "parquet" | "pq" => Ok(StoreFormat::Parquet),
            _ => Err(MetricsError::invalid_parameter(
                "format",
                s,
                "expected one of csv, json, parquet",
            )),
        }
    }
}

/// Open an on-disk store of the given format.
///
/// For `csv` and `parquet`, `path` is a directory; for `json` it is the
/// document file.
pub fn open_store<P: AsRef<Path>>(format: StoreFormat, path: P) -> Result<Box<dyn TableStore>> {
    let path = path.as_ref();
    log::debug!("Opening {} table store at {}", format, path.display());
    match format {
        #[cfg(feature = "csv")]
        StoreFormat::Csv => Ok(Box::new(CsvTableStore::open(path)?)),
        StoreFormat::Json => Ok(Box::new(JsonTableStore::open(path)?)),
        #[cfg(feature = "polars")]
        StoreFormat::Parquet => Ok(Box::new(ParquetTableStore::open(path)?)),
        #[allow(unreachable_patterns)]
        other => Err(MetricsError::config(format!(
            "store format '{}' is not enabled in this build",
            other
        ))),
    }
}

/// Reject table names that cannot map onto a single file name
pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(MetricsError::invalid_parameter(
            "table",
            table,
            "only ASCII letters, digits, '_' and '-' are allowed",
        ))
    }
}
