//! In-process table store.

use super::{TableRow, TableStore};
use crate::core::error::{MetricsError, Result};
use std::collections::HashMap;

/// Table store that keeps every table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: HashMap<String, Vec<TableRow>>,
}

impl MemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a table, returning its rows if it existed
    pub fn remove(&mut self, table: &str) -> Option<Vec<TableRow>> {
        self.tables.remove(table)
    }
}

impl TableStore for MemoryTableStore {
    fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
        self.tables.insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn read(&self, table: &str) -> Result<Vec<TableRow>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| MetricsError::table_not_found(table))
    }

    fn tables(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
