//! Directory-of-Parquet table store, built on polars.
//!
//! Each table is `<dir>/<table>.parquet`. A column is stored as `Int64` when
//! every present cell is an integer, `Float64` when every present cell is
//! numeric, and `String` otherwise. Absent keys become nulls. A table with no
//! rows is written as an empty file, since a zero-column frame has no schema.

use super::{validate_table_name, TableRow, TableStore, Value};
use crate::core::error::{MetricsError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "parquet";

/// Table store backed by a directory of Parquet files.
#[derive(Debug, Clone)]
pub struct ParquetTableStore {
    dir: PathBuf,
}

impl ParquetTableStore {
    /// Open (creating if needed) the store directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", table, EXTENSION))
    }
}

fn build_column(name: &str, rows: &[TableRow]) -> Column {
    let cells: Vec<Option<&Value>> = rows.iter().map(|row| row.get(name)).collect();
    let present = || cells.iter().flatten();

    if present().all(|v| matches!(v, Value::Int(_))) {
        let values: Vec<Option<i64>> = cells.iter().map(|c| c.and_then(Value::as_i64)).collect();
        Column::new(name.into(), values)
    } else if present().all(|v| v.as_f64().is_some()) {
        let values: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(Value::as_f64)).collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(|c| c.map(Value::to_string)).collect();
        Column::new(name.into(), values)
    }
}

fn read_column(column: &Column) -> Result<Vec<Option<Value>>> {
    let series = column.as_materialized_series();
    let values = match series.dtype() {
        DataType::Int64 => series.i64()?.into_iter().map(|v| v.map(Value::Int)).collect(),
        DataType::Float64 => series.f64()?.into_iter().map(|v| v.map(Value::Float)).collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(Value::from))
            .collect(),
        dtype if dtype.is_integer() => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map(Value::Int))
            .collect(),
        dtype => {
            return Err(MetricsError::store(format!(
                "unsupported column type {} for column '{}'",
                dtype,
                column.name()
            )))
        }
    };
    Ok(values)
}

impl TableStore for ParquetTableStore {
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
        validate_table_name(table)?;
        let path = self.table_path(table);
        let file = File::create(&path)?;
        if rows.is_empty() {
            return Ok(());
        }

        let names: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        let columns: Vec<Column> = names.iter().map(|name| build_column(name, rows)).collect();
        let mut df = DataFrame::new(columns)?;
        ParquetWriter::new(file).finish(&mut df)?;

        log::debug!("Wrote {:?} frame to {}", df.shape(), path.display());
        Ok(())
    }

    fn read(&self, table: &str) -> Result<Vec<TableRow>> {
        validate_table_name(table)?;
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(MetricsError::table_not_found(table));
        }
        if std::fs::metadata(&path)?.len() == 0 {
            return Ok(Vec::new());
        }

        let df = ParquetReader::new(File::open(&path)?).finish()?;
        let mut rows = vec![TableRow::new(); df.height()];
        for column in df.get_columns() {
            let name = column.name().to_string();
            for (row, value) in rows.iter_mut().zip(read_column(column)?) {
                if let Some(value) = value {
                    row.insert(name.clone(), value);
                }
            }
        }
        Ok(rows)
    }

    fn tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
