//! Directory-of-CSV table store.
//!
//! Each table is `<dir>/<table>.csv` with a header row. The header is the
//! sorted union of the row keys, each written as `name:type` where the type
//! is `int`, `float` or `text`. Column types are inferred the same way as in
//! the Parquet store. A key missing from a row is written as `\N`; text cells
//! that start with a backslash get one extra leading backslash, so an empty
//! string and `\N` stay distinct from an absent cell. Headers without a type
//! suffix are read untyped with [`Value::parse`]. A table with no rows is an
//! empty file.

use super::{validate_table_name, TableRow, TableStore, Value};
use crate::core::error::{MetricsError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "csv";
const ABSENT: &str = "\\N";
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int,
    Float,
    Text,
}

impl ColumnType {
    fn infer(cells: &[Option<&Value>]) -> Self {
        let present = || cells.iter().flatten();
        if present().all(|v| matches!(v, Value::Int(_))) {
            ColumnType::Int
        } else if present().all(|v| v.as_f64().is_some()) {
            ColumnType::Float
        } else {
            ColumnType::Text
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "int" => Some(ColumnType::Int),
            "float" => Some(ColumnType::Float),
            "text" => Some(ColumnType::Text),
            _ => None,
        }
    }

    fn encode(self, value: &Value) -> String {
        match (self, value) {
            (ColumnType::Float, v) => v.as_f64().map(|f| f.to_string()).unwrap_or_default(),
            (ColumnType::Text, Value::Text(s)) if s.starts_with(ESCAPE) => format!("{ESCAPE}{s}"),
            (_, v) => v.to_string(),
        }
    }

    fn decode(self, column: &str, field: &str) -> Result<Option<Value>> {
        if field == ABSENT {
            return Ok(None);
        }
        let value = match self {
            ColumnType::Int => field.parse::<i64>().map(Value::Int).map_err(|_| {
                MetricsError::store(format!("column '{}': '{}' is not an integer", column, field))
            })?,
            ColumnType::Float => field.parse::<f64>().map(Value::Float).map_err(|_| {
                MetricsError::store(format!("column '{}': '{}' is not a number", column, field))
            })?,
            ColumnType::Text => {
                Value::Text(field.strip_prefix(ESCAPE).unwrap_or(field).to_string())
            }
        };
        Ok(Some(value))
    }
}

/// Split a header into its column name and declared type
fn parse_header(header: &str) -> (&str, Option<ColumnType>) {
    match header.rsplit_once(':') {
        Some((name, suffix)) => match ColumnType::from_suffix(suffix) {
            Some(ty) => (name, Some(ty)),
            None => (header, None),
        },
        None => (header, None),
    }
}

/// Table store backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    dir: PathBuf,
}

impl CsvTableStore {
    /// Open (creating if needed) the store directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(MetricsError::store(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", table, EXTENSION))
    }
}

impl TableStore for CsvTableStore {
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
        validate_table_name(table)?;
        let path = self.table_path(table);
        let file = File::create(&path)?;
        if rows.is_empty() {
            log::debug!("Wrote empty table {}", path.display());
            return Ok(());
        }

        let names: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        let columns: Vec<(&str, ColumnType)> = names
            .into_iter()
            .map(|name| {
                let cells: Vec<Option<&Value>> = rows.iter().map(|row| row.get(name)).collect();
                (name, ColumnType::infer(&cells))
            })
            .collect();

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(
            columns
                .iter()
                .map(|(name, ty)| format!("{}:{}", name, ty.suffix())),
        )?;
        for row in rows {
            let record = columns.iter().map(|&(name, ty)| match row.get(name) {
                Some(value) => ty.encode(value),
                None => ABSENT.to_string(),
            });
            writer.write_record(record)?;
        }
        writer.flush()?;

        log::debug!("Wrote {} rows to {}", rows.len(), path.display());
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

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(&path)?;
        let headers = reader.headers()?.clone();
        let columns: Vec<(&str, Option<ColumnType>)> = headers.iter().map(parse_header).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = TableRow::new();
            for (&(name, ty), field) in columns.iter().zip(record.iter()) {
                let value = match ty {
                    Some(ty) => ty.decode(name, field)?,
                    None if field.is_empty() => None,
                    None => Some(Value::parse(field)),
                };
                if let Some(value) = value {
                    row.insert(name.to_string(), value);
                }
            }
            rows.push(row);
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
