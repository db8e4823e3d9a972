//! Row-indexed accumulation of per-example statistics.
//!
//! A [`MetricsAccumulator`] pairs an [`Evaluator`] with a table mapping
//! caller-assigned row ids to [`StatisticsRecord`]s. Its full state can be
//! externalized as three logical tables and rebuilt from them:
//!
//! | table         | columns                                     |
//! |---------------|---------------------------------------------|
//! | `<name>`      | `rowid, n, tp, fp, tn, fn, tpr, fpr, recall, precision, f1` |
//! | `labels`      | `class_idx, label`                          |
//! | `threshold`   | `threshold` (exactly one row)               |

use crate::config::EvaluatorConfig;
use crate::core::constants::*;
use crate::core::error::{MetricsError, Result};
use crate::core::types::{LabelTable, RowId};
use crate::io::{TableRow, TableStore, Value};
use crate::metrics::{Evaluator, Example, StatisticsRecord};
use crate::snapshot_error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Whether the accumulator holds any rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// No rows; after construction or reset
    Empty,
    /// At least one row
    Populated,
}

/// Externalized accumulator state in table-row form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// `{class_idx, label}` rows in label-table order
    pub labels: Vec<TableRow>,
    /// A single `{threshold}` row
    pub threshold: Vec<TableRow>,
    /// `{rowid, n, tp, ...}` rows in ascending row id order
    pub rows: Vec<TableRow>,
}

/// Macro averages over the stored rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    /// Number of rows averaged
    pub count: usize,
    /// Mean precision
    pub precision: f64,
    /// Mean recall
    pub recall: f64,
    /// Mean F1
    pub f1: f64,
}

/// Evaluator plus a table of statistics keyed by row id.
///
/// `record`, `reset` and `restore` are the only mutators. The accumulator is
/// not internally synchronized: overwriting a row is a multi-field update,
/// so callers sharing one instance across threads must wrap it in a `Mutex`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsAccumulator {
    name: String,
    evaluator: Evaluator,
    rows: BTreeMap<RowId, StatisticsRecord>,
}

impl MetricsAccumulator {
    /// Create an empty accumulator whose metric table is called `name`
    pub fn new<S: Into<String>>(name: S, labels: LabelTable, threshold: f64) -> Result<Self> {
        Self::with_evaluator(name, Evaluator::new(labels, threshold)?)
    }

    /// Create an empty accumulator around an existing evaluator
    pub fn with_evaluator<S: Into<String>>(name: S, evaluator: Evaluator) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        log::debug!(
            "Created accumulator '{}' with labels {} and threshold {}",
            name,
            evaluator.labels(),
            evaluator.threshold()
        );
        Ok(Self {
            name,
            evaluator,
            rows: BTreeMap::new(),
        })
    }

    /// Create an empty accumulator from a configuration
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self> {
        Self::with_evaluator(config.name.clone(), Evaluator::from_config(config)?)
    }

    /// Name of the metric table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying evaluator
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Label table
    pub fn labels(&self) -> &LabelTable {
        self.evaluator.labels()
    }

    /// Decision threshold
    pub fn threshold(&self) -> f64 {
        self.evaluator.threshold()
    }

    /// Current state
    pub fn state(&self) -> AccumulatorState {
        if self.rows.is_empty() {
            AccumulatorState::Empty
        } else {
            AccumulatorState::Populated
        }
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Record stored under `row_id`
    pub fn get(&self, row_id: RowId) -> Option<&StatisticsRecord> {
        self.rows.get(&row_id)
    }

    /// All rows in ascending row id order
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &StatisticsRecord)> + '_ {
        self.rows.iter().map(|(&id, record)| (id, record))
    }

    /// Insert or overwrite the row at `row_id`, returning the replaced record
    pub fn record(&mut self, row_id: RowId, record: StatisticsRecord) -> Option<StatisticsRecord> {
        let previous = self.rows.insert(row_id, record);
        if previous.is_some() {
            log::debug!("{}: overwrote row {}", self.name, row_id);
        } else {
            log::debug!("{}: recorded row {}", self.name, row_id);
        }
        previous
    }

    /// Evaluate `example` in binary mode and record it under `row_id`
    pub fn evaluate_and_record(
        &mut self,
        row_id: RowId,
        example: &Example,
    ) -> Result<StatisticsRecord> {
        let stats = self.evaluator.evaluate(example)?;
        self.record(row_id, stats);
        Ok(stats)
    }

    /// Drop every row; labels and threshold are kept
    pub fn reset(&mut self) {
        log::info!("{}: reset, dropping {} rows", self.name, self.rows.len());
        self.rows.clear();
    }

    /// Macro means of precision, recall and F1, or `None` when empty
    pub fn summary(&self) -> Option<MetricsSummary> {
        if self.rows.is_empty() {
            return None;
        }
        let count = self.rows.len();
        let (p, r, f) = self
            .rows
            .values()
            .fold((0.0, 0.0, 0.0), |(p, r, f), s| {
                (p + s.precision, r + s.recall, f + s.f1)
            });
        let denom = count as f64;
        Some(MetricsSummary {
            count,
            precision: p / denom,
            recall: r / denom,
            f1: f / denom,
        })
    }

    /// Externalize labels, threshold and rows as table rows
    pub fn snapshot(&self) -> Snapshot {
        let labels = self
            .labels()
            .iter()
            .map(|(class_idx, label)| {
                let mut row = TableRow::new();
                row.insert(CLASS_IDX_COLUMN.to_string(), Value::Int(class_idx));
                row.insert(LABEL_COLUMN.to_string(), Value::from(label));
                row
            })
            .collect();

        let mut threshold_row = TableRow::new();
        threshold_row.insert(THRESHOLD_COLUMN.to_string(), Value::Float(self.threshold()));

        let rows = self
            .rows
            .iter()
            .map(|(&id, record)| {
                let mut row = record.to_row();
                row.insert(ROWID_COLUMN.to_string(), Value::Int(id as i64));
                row
            })
            .collect();

        Snapshot {
            labels,
            threshold: vec![threshold_row],
            rows,
        }
    }

    /// Rebuild an accumulator from persisted tables.
    ///
    /// The label and threshold tables are validated before any row is read.
    /// An empty `rows` slice yields an accumulator in the `Empty` state.
    pub fn restore<S: Into<String>>(
        name: S,
        labels: &[TableRow],
        threshold: &[TableRow],
        rows: &[TableRow],
    ) -> Result<Self> {
        let name = name.into();
        let labels = restore_labels(labels)?;
        let threshold = restore_threshold(threshold)?;
        let mut accumulator = Self::new(name, labels, threshold)?;

        for row in rows {
            let row_id = row
                .get(ROWID_COLUMN)
                .and_then(Value::as_i64)
                .filter(|&id| id >= 0)
                .ok_or_else(|| {
                    snapshot_error!(
                        accumulator.name.as_str(),
                        "row without a non-negative integer '{}': {:?}",
                        ROWID_COLUMN,
                        row.get(ROWID_COLUMN)
                    )
                })? as RowId;
            let record = StatisticsRecord::from_row(row, &accumulator.name)?;
            if accumulator.rows.insert(row_id, record).is_some() {
                return Err(snapshot_error!(
                    accumulator.name.as_str(),
                    "duplicate row id {}",
                    row_id
                ));
            }
        }

        log::info!(
            "Restored accumulator '{}' with {} rows, {} classes, threshold {}",
            accumulator.name,
            accumulator.len(),
            accumulator.labels().len(),
            accumulator.threshold()
        );
        Ok(accumulator)
    }

    /// Rebuild an accumulator from a [`Snapshot`]
    pub fn from_snapshot<S: Into<String>>(name: S, snapshot: &Snapshot) -> Result<Self> {
        Self::restore(name, &snapshot.labels, &snapshot.threshold, &snapshot.rows)
    }

    /// Write the labels, threshold and metric tables to `store`, in that order.
    ///
    /// The side tables go first, so a failed write never leaves fresh metric
    /// rows next to stale labels or threshold.
    pub fn persist<T: TableStore + ?Sized>(&self, store: &mut T) -> Result<()> {
        let snapshot = self.snapshot();
        store.write(LABELS_TABLE, &snapshot.labels)?;
        store.write(THRESHOLD_TABLE, &snapshot.threshold)?;
        store.write(&self.name, &snapshot.rows)?;
        log::info!("Persisted accumulator '{}' ({} rows)", self.name, self.len());
        Ok(())
    }

    /// Restore the accumulator named `name` from `store`.
    ///
    /// A missing labels or threshold table is a malformed snapshot; a missing
    /// metric table is reported as `TableNotFound`.
    pub fn load<T: TableStore + ?Sized>(store: &T, name: &str) -> Result<Self> {
        let side_table = |table: &str| {
            store.read(table).map_err(|e| match e {
                MetricsError::TableNotFound { table } => {
                    snapshot_error!(table, "table is missing")
                }
                other => other,
            })
        };
        let labels = side_table(LABELS_TABLE)?;
        let threshold = side_table(THRESHOLD_TABLE)?;
        let rows = store.read(name)?;
        Self::restore(name, &labels, &threshold, &rows)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name == LABELS_TABLE || name == THRESHOLD_TABLE {
        return Err(MetricsError::invalid_parameter(
            "name",
            name,
            "must be non-empty and distinct from the labels and threshold tables",
        ));
    }
    Ok(())
}

fn restore_labels(rows: &[TableRow]) -> Result<LabelTable> {
    if rows.is_empty() {
        return Err(snapshot_error!(LABELS_TABLE, "no classes declared"));
    }

    let mut seen = HashSet::with_capacity(rows.len());
    let mut labels = LabelTable::new();
    for row in rows {
        let raw_idx = row.get(CLASS_IDX_COLUMN).ok_or_else(|| {
            snapshot_error!(LABELS_TABLE, "missing column '{}'", CLASS_IDX_COLUMN)
        })?;
        let class_idx = raw_idx.as_i64().ok_or_else(|| {
            snapshot_error!(LABELS_TABLE, "class index is not an integer: {}", raw_idx)
        })?;
        let label = match row.get(LABEL_COLUMN) {
            Some(Value::Text(label)) => label,
            Some(other) => {
                return Err(snapshot_error!(LABELS_TABLE, "label is not text: {}", other));
            }
            None => {
                return Err(snapshot_error!(LABELS_TABLE, "missing column '{}'", LABEL_COLUMN));
            }
        };
        if !seen.insert(class_idx) {
            return Err(snapshot_error!(
                LABELS_TABLE,
                "class index {} declared twice",
                class_idx
            ));
        }
        labels.insert(class_idx, label.as_str());
    }
    Ok(labels)
}

fn restore_threshold(rows: &[TableRow]) -> Result<f64> {
    let row = match rows {
        [row] => row,
        _ => {
            return Err(snapshot_error!(
                THRESHOLD_TABLE,
                "expected exactly one row, found {}",
                rows.len()
            ))
        }
    };
    if row.len() != 1 {
        return Err(snapshot_error!(
            THRESHOLD_TABLE,
            "expected exactly one value, found {}",
            row.len()
        ));
    }
    let value = row
        .get(THRESHOLD_COLUMN)
        .ok_or_else(|| snapshot_error!(THRESHOLD_TABLE, "missing column '{}'", THRESHOLD_COLUMN))?;
    value
        .as_f64()
        .filter(|t| t.is_finite())
        .ok_or_else(|| snapshot_error!(THRESHOLD_TABLE, "not a finite number: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryTableStore;
    use approx::assert_abs_diff_eq;

    fn accumulator() -> MetricsAccumulator {
        MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap()
    }

    fn example(preds: &[f64], targets: &[f64]) -> Example {
        Example::from_vecs(preds.to_vec(), targets.to_vec()).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut acc = accumulator();
        assert_eq!(acc.state(), AccumulatorState::Empty);
        acc.evaluate_and_record(0, &example(&[1.0, 0.0], &[1.0, 0.0]))
            .unwrap();
        assert_eq!(acc.state(), AccumulatorState::Populated);
        acc.reset();
        assert_eq!(acc.state(), AccumulatorState::Empty);
        assert_eq!(acc.threshold(), 0.5);
        assert_eq!(acc.labels(), &LabelTable::binary());
    }

    #[test]
    fn test_failed_evaluation_records_nothing() {
        let mut acc = accumulator();
        let bad = Example::from_vecs(vec![f64::NAN], vec![1.0]).unwrap();
        assert!(acc.evaluate_and_record(1, &bad).is_err());
        assert!(acc.is_empty());
    }

    #[test]
    fn test_reserved_names_rejected() {
        for name in ["", "labels", "threshold"] {
            assert!(MetricsAccumulator::new(name, LabelTable::binary(), 0.5).is_err());
        }
    }

    #[test]
    fn test_summary() {
        let mut acc = accumulator();
        assert!(acc.summary().is_none());
        acc.evaluate_and_record(0, &example(&[1.0, 1.0], &[1.0, 1.0]))
            .unwrap();
        acc.evaluate_and_record(1, &example(&[1.0, 1.0, 0.0, 0.0], &[1.0, 0.0, 0.0, 1.0]))
            .unwrap();
        let summary = acc.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_abs_diff_eq!(summary.f1, 0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_snapshot_layout() {
        let mut acc = accumulator();
        acc.evaluate_and_record(9, &example(&[1.0], &[1.0])).unwrap();
        let snapshot = acc.snapshot();
        assert_eq!(snapshot.labels.len(), 2);
        assert_eq!(snapshot.threshold.len(), 1);
        assert_eq!(snapshot.rows[0][ROWID_COLUMN], Value::Int(9));
        assert_eq!(snapshot.rows[0].len(), TRACKED_FIELDS.len() + 1);
    }

    #[test]
    fn test_threshold_row_with_extra_value() {
        let mut snapshot = accumulator().snapshot();
        snapshot.threshold[0].insert("other".to_string(), Value::Float(0.1));
        let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
        assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
    }

    #[test]
    fn test_duplicate_class_index() {
        let mut snapshot = accumulator().snapshot();
        let dup = snapshot.labels[0].clone();
        snapshot.labels.push(dup);
        let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_load_missing_threshold_table() {
        let mut store = MemoryTableStore::new();
        let acc = accumulator();
        acc.persist(&mut store).unwrap();
        store.remove(THRESHOLD_TABLE);
        let err = MetricsAccumulator::load(&store, "f1").unwrap_err();
        assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
    }

    #[test]
    fn test_load_missing_metric_table() {
        let mut store = MemoryTableStore::new();
        accumulator().persist(&mut store).unwrap();
        let err = MetricsAccumulator::load(&store, "iou").unwrap_err();
        assert!(matches!(err, MetricsError::TableNotFound { .. }));
    }
}
