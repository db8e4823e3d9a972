//! Accumulator behaviour and persistence round trips.

use confmetrics::*;
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn test_recording_same_row_twice_overwrites() {
    let mut acc = create_test_accumulator(6);
    let before = acc.len();

    let first = acc
        .evaluate_and_record(5, &Example::from_vecs(vec![1.0], vec![1.0]).unwrap())
        .unwrap();
    let second = acc
        .evaluate_and_record(5, &Example::from_vecs(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap())
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(acc.len(), before);
    assert_eq!(acc.get(5), Some(&second));
}

#[test]
fn test_row_ids_need_not_be_contiguous() {
    let mut acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap();
    let example = create_test_binary_example(8, 0);
    for row_id in [42, 7, 1_000_000] {
        acc.evaluate_and_record(row_id, &example).unwrap();
    }
    let ids: Vec<RowId> = acc.rows().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![7, 42, 1_000_000]);
}

#[test]
fn test_reset_keeps_labels_and_threshold() {
    let labels = create_test_labels(4);
    let mut acc = MetricsAccumulator::new("seg", labels.clone(), 2.0).unwrap();
    acc.evaluate_and_record(0, &create_test_binary_example(8, 1))
        .unwrap();
    acc.reset();

    assert!(acc.is_empty());
    assert_eq!(acc.state(), AccumulatorState::Empty);
    assert_eq!(acc.labels(), &labels);
    assert_eq!(acc.threshold(), 2.0);
}

#[test]
fn test_memory_store_round_trip() {
    let acc = create_test_accumulator(10);
    let mut store = MemoryTableStore::new();
    acc.persist(&mut store).unwrap();

    let restored = MetricsAccumulator::load(&store, "f1").unwrap();
    assert_eq!(restored, acc);
    assert_eq!(restored.state(), AccumulatorState::Populated);
}

#[test]
#[cfg(feature = "csv")]
fn test_csv_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let labels = LabelTable::from_pairs([(0, "background"), (1, "road"), (2, "car")]);
    let mut acc = MetricsAccumulator::new("iou", labels, 1.0).unwrap();
    for row_id in 0..5 {
        acc.evaluate_and_record(row_id * 10, &create_test_binary_example(40, row_id))
            .unwrap();
    }

    let mut store = CsvTableStore::open(dir.path()).unwrap();
    acc.persist(&mut store).unwrap();
    assert_eq!(store.tables().unwrap(), vec!["iou", "labels", "threshold"]);

    let reopened = CsvTableStore::open(dir.path()).unwrap();
    let restored = MetricsAccumulator::load(&reopened, "iou").unwrap();
    assert_accumulators_match(&restored, &acc);
}

#[test]
#[cfg(feature = "csv")]
fn test_csv_store_keeps_label_spelling() {
    let dir = TempDir::new().unwrap();
    let labels = LabelTable::from_pairs([(0, "007"), (1, "1.50"), (2, "")]);
    let mut acc = MetricsAccumulator::new("f1", labels.clone(), 0.5).unwrap();
    acc.evaluate_and_record(0, &create_test_binary_example(16, 3))
        .unwrap();

    let mut store = CsvTableStore::open(dir.path()).unwrap();
    acc.persist(&mut store).unwrap();

    let reopened = CsvTableStore::open(dir.path()).unwrap();
    let restored = MetricsAccumulator::load(&reopened, "f1").unwrap();
    assert_eq!(restored.labels(), &labels);
    assert_eq!(restored.labels().get(2), Some(""));
    assert_accumulators_match(&restored, &acc);
}

#[test]
fn test_numeric_label_cell_is_malformed() {
    let mut snapshot = create_test_accumulator(2).snapshot();
    snapshot.labels[0].insert(LABEL_COLUMN.to_string(), Value::Int(7));

    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    match err {
        MetricsError::MalformedSnapshot { table, reason } => {
            assert_eq!(table, LABELS_TABLE);
            assert!(reason.contains("not text"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_label_table_rejected_at_construction() {
    let err = MetricsAccumulator::new("f1", LabelTable::new(), 0.5).unwrap_err();
    assert_eq!(err.category(), "invalid_parameter");

    let mut snapshot = create_test_accumulator(1).snapshot();
    snapshot.labels.clear();
    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
}

#[test]
fn test_persist_writes_side_tables_before_metric_rows() {
    struct FailOn<'a> {
        inner: MemoryTableStore,
        table: &'a str,
    }

    impl TableStore for FailOn<'_> {
        fn write(&mut self, table: &str, rows: &[TableRow]) -> Result<()> {
            if table == self.table {
                return Err(MetricsError::store("disk full"));
            }
            self.inner.write(table, rows)
        }

        fn read(&self, table: &str) -> Result<Vec<TableRow>> {
            self.inner.read(table)
        }

        fn tables(&self) -> Result<Vec<String>> {
            self.inner.tables()
        }
    }

    let acc = create_test_accumulator(3);
    let mut store = FailOn {
        inner: MemoryTableStore::new(),
        table: "f1",
    };
    assert!(acc.persist(&mut store).is_err());
    assert_eq!(store.tables().unwrap(), vec![LABELS_TABLE, THRESHOLD_TABLE]);

    let mut store = FailOn {
        inner: MemoryTableStore::new(),
        table: LABELS_TABLE,
    };
    assert!(acc.persist(&mut store).is_err());
    assert!(store.tables().unwrap().is_empty());
}

#[test]
fn test_json_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.json");
    let acc = create_test_accumulator(4);

    let mut store = JsonTableStore::open(&path).unwrap();
    acc.persist(&mut store).unwrap();

    let restored = MetricsAccumulator::load(&JsonTableStore::open(&path).unwrap(), "f1").unwrap();
    assert_accumulators_match(&restored, &acc);
}

#[test]
#[cfg(feature = "csv")]
fn test_open_store_by_format() {
    let dir = TempDir::new().unwrap();
    let acc = create_test_accumulator(3);

    let mut store = open_store(StoreFormat::Csv, dir.path().join("csv")).unwrap();
    acc.persist(&mut store).unwrap();
    let restored = MetricsAccumulator::load(&store, "f1").unwrap();
    assert_accumulators_match(&restored, &acc);
}

#[test]
fn test_empty_rows_restore_to_empty_state() {
    let acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap();
    let snapshot = acc.snapshot();
    assert!(snapshot.rows.is_empty());

    let restored = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap();
    assert_eq!(restored.state(), AccumulatorState::Empty);
    assert_eq!(restored.labels(), &LabelTable::binary());
}

#[test]
#[cfg(feature = "csv")]
fn test_empty_table_survives_csv_store() {
    let dir = TempDir::new().unwrap();
    let acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap();
    let mut store = CsvTableStore::open(dir.path()).unwrap();
    acc.persist(&mut store).unwrap();
    let restored = MetricsAccumulator::load(&store, "f1").unwrap();
    assert!(restored.is_empty());
}

#[test]
fn test_two_threshold_rows_are_malformed() {
    let mut snapshot = create_test_accumulator(2).snapshot();
    let extra = snapshot.threshold[0].clone();
    snapshot.threshold.push(extra);

    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    match err {
        MetricsError::MalformedSnapshot { table, .. } => assert_eq!(table, THRESHOLD_TABLE),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_threshold_row_is_malformed() {
    let mut snapshot = create_test_accumulator(2).snapshot();
    snapshot.threshold.clear();
    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
}

#[test]
fn test_non_integer_class_index_is_malformed() {
    let mut snapshot = create_test_accumulator(2).snapshot();
    snapshot.labels[1].insert(CLASS_IDX_COLUMN.to_string(), Value::Float(1.5));

    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    match err {
        MetricsError::MalformedSnapshot { table, reason } => {
            assert_eq!(table, LABELS_TABLE);
            assert!(reason.contains("1.5"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_labels_table_is_malformed() {
    let mut store = MemoryTableStore::new();
    create_test_accumulator(2).persist(&mut store).unwrap();
    store.remove(LABELS_TABLE);

    let err = MetricsAccumulator::load(&store, "f1").unwrap_err();
    match err {
        MetricsError::MalformedSnapshot { table, .. } => assert_eq!(table, LABELS_TABLE),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_row_missing_tracked_field_is_malformed() {
    let mut snapshot = create_test_accumulator(3).snapshot();
    snapshot.rows[2].remove("tn");
    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
}

#[test]
fn test_row_with_negative_rowid_is_malformed() {
    let mut snapshot = create_test_accumulator(1).snapshot();
    snapshot.rows[0].insert(ROWID_COLUMN.to_string(), Value::Int(-1));
    let err = MetricsAccumulator::from_snapshot("f1", &snapshot).unwrap_err();
    assert!(matches!(err, MetricsError::MalformedSnapshot { .. }));
}
