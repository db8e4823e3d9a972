//! Synthetic examples fed through the evaluator.

use approx::assert_abs_diff_eq;
use confmetrics::*;

#[test]
fn test_all_correct_examples_score_perfectly() {
    let mut generator = SyntheticClassification::with_seed(&[8, 8], 2, 3).unwrap();
    let evaluator = Evaluator::new(LabelTable::binary(), 0.5).unwrap();
    for _ in 0..10 {
        let stats = evaluator
            .evaluate(&generator.generate(ExampleKind::AllCorrect).unwrap())
            .unwrap();
        assert_eq!(stats.fp, 0);
        assert_eq!(stats.fn_, 0);
        assert_abs_diff_eq!(stats.f1, 1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_all_wrong_binary_examples() {
    let mut generator = SyntheticClassification::with_seed(&[10], 2, 5).unwrap();
    let example = generator.generate(ExampleKind::AllWrong).unwrap();
    let stats = Evaluator::new(LabelTable::binary(), 0.5)
        .unwrap()
        .evaluate(&example)
        .unwrap();
    assert_eq!((stats.tp, stats.fp, stats.tn, stats.fn_), (0, 0, 0, 10));
    assert_eq!(stats.precision, 1.0);
    assert_abs_diff_eq!(stats.recall, 0.0, epsilon = 1e-4);
}

#[test]
fn test_all_zeros_examples_are_vacuously_perfect() {
    let mut generator = SyntheticClassification::with_seed(&[4, 4], 5, 0).unwrap();
    let example = generator.generate(ExampleKind::AllZeros).unwrap();
    let stats = Evaluator::new(LabelTable::binary(), 0.5)
        .unwrap()
        .evaluate(&example)
        .unwrap();
    assert_eq!(stats.tn, 16);
    assert_eq!(stats.precision, 1.0);
    assert_eq!(stats.recall, 1.0);
}

#[test]
fn test_multiclass_synthetic_examples() {
    let labels = LabelTable::from_pairs([(0, "bg"), (1, "a"), (2, "b"), (3, "c")]);
    let evaluator = Evaluator::new(labels, 0.5).unwrap();
    let mut generator = SyntheticClassification::with_seed(&[6, 6], 4, 9).unwrap();

    let example = generator.generate(ExampleKind::AllCorrect).unwrap();
    let stats = evaluator.evaluate_multiclass(&example).unwrap();
    assert_eq!(stats.len(), 4);
    for record in stats.values() {
        assert_eq!(record.n, 36);
        assert_eq!(record.fp + record.fn_, 0);
    }

    let example = generator.generate(ExampleKind::Random).unwrap();
    let stats = evaluator.evaluate_multiclass(&example).unwrap();
    let total_tp: u64 = stats.values().map(|r| r.tp).sum();
    let matches = example
        .predictions()
        .iter()
        .zip(example.targets().iter())
        .filter(|(p, t)| p == t)
        .count() as u64;
    assert_eq!(total_tp, matches);
}

#[test]
fn test_accumulating_a_synthetic_batch() {
    let mut generator = SyntheticClassification::with_seed(&[16], 2, 21).unwrap();
    let mut acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5).unwrap();
    for (row_id, kind) in ExampleKind::ALL.iter().enumerate() {
        acc.evaluate_and_record(row_id as RowId, &generator.generate(*kind).unwrap())
            .unwrap();
    }
    assert_eq!(acc.len(), 4);
    let summary = acc.summary().unwrap();
    assert!(summary.f1 >= 0.0 && summary.f1 <= 1.0);
}
