//! Single-document JSON table store.
//!
//! All tables live in one JSON object mapping table name to an array of
//! rows. Every write rewrites the whole document.

use super::{validate_table_name, TableRow, TableStore};
use crate::core::error::{MetricsError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

type Document = BTreeMap<String, Vec<TableRow>>;

/// Table store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonTableStore {
    path: PathBuf,
    tables: Document,
}

impl JsonTableStore {
    /// Open the document at `path`, starting empty when the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Document::new()
        };
        log::debug!("Opened JSON store {} with {} tables", path.display(), tables.len());
        Ok(Self { path, tables })
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &self.tables)?;
        writer.flush()?;
        Ok(())
    }
}

impl TableStore for JsonTableStore {
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
        validate_table_name(table)?;
        self.tables.insert(table.to_string(), rows.to_vec());
        self.flush()
    }

    fn read(&self, table: &str) -> Result<Vec<TableRow>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| MetricsError::table_not_found(table))
    }

    fn tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }
}
