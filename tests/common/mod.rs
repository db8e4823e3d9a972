//! Common test utilities for confmetrics integration tests.
#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use confmetrics::*;
use ndarray::{Array1, ArrayD};
use rand::prelude::*;

/// Seeded 0/1 array of the given length
pub fn create_test_binary_array(len: usize, seed: u64) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array1::from_shape_fn(len, |_| rng.gen_range(0..2) as f64)
}

/// Seeded binary example of the given length
pub fn create_test_binary_example(len: usize, seed: u64) -> Example {
    let predictions = create_test_binary_array(len, seed);
    let targets = create_test_binary_array(len, seed.wrapping_add(1));
    Example::new(predictions.into_dyn(), targets.into_dyn()).unwrap()
}

/// Label table `{0: "class_0", ..., k-1: "class_{k-1}"}`
pub fn create_test_labels(num_classes: i64) -> LabelTable {
    LabelTable::from_pairs((0..num_classes).map(|i| (i, format!("class_{}", i))))
}

/// Swap the roles of classes 0 and 1 in a binary array
pub fn complement(values: &ArrayD<f64>) -> ArrayD<f64> {
    values.mapv(|v| 1.0 - v)
}

/// Accumulator named `f1` with rows `0..rows` of seeded random examples
pub fn create_test_accumulator(rows: u64) -> MetricsAccumulator {
    let mut acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap();
    for row_id in 0..rows {
        let example = create_test_binary_example(32, row_id);
        acc.evaluate_and_record(row_id, &example).unwrap();
    }
    acc
}

/// Compare two records: counts exactly, rates within `1e-12`
pub fn assert_records_close(a: &StatisticsRecord, b: &StatisticsRecord) {
    assert_eq!((a.n, a.tp, a.fp, a.tn, a.fn_), (b.n, b.tp, b.fp, b.tn, b.fn_));
    assert_abs_diff_eq!(a.tpr, b.tpr, epsilon = 1e-12);
    assert_abs_diff_eq!(a.fpr, b.fpr, epsilon = 1e-12);
    assert_abs_diff_eq!(a.recall, b.recall, epsilon = 1e-12);
    assert_abs_diff_eq!(a.precision, b.precision, epsilon = 1e-12);
    assert_abs_diff_eq!(a.f1, b.f1, epsilon = 1e-12);
}

/// Compare two accumulators' labels, threshold and rows
pub fn assert_accumulators_match(a: &MetricsAccumulator, b: &MetricsAccumulator) {
    assert_eq!(a.name(), b.name());
    assert_eq!(a.labels(), b.labels());
    assert_eq!(a.threshold(), b.threshold());
    assert_eq!(a.len(), b.len());
    for ((id_a, rec_a), (id_b, rec_b)) in a.rows().zip(b.rows()) {
        assert_eq!(id_a, id_b);
        assert_records_close(rec_a, rec_b);
    }
}
