//! Binary and one-vs-all multiclass evaluation.

use crate::config::EvaluatorConfig;
use crate::core::constants::DEFAULT_EPSILON;
use crate::core::error::{MetricsError, Result};
use crate::core::types::{ClassIndex, LabelTable};
use crate::ensure;
use crate::metrics::confusion::{cast_to_categories, derive_confusion};
use crate::metrics::example::Example;
use crate::metrics::rates::{summarize, StatisticsRecord};
use ndarray::{ArrayView, Dimension};
use num_traits::ToPrimitive;
use std::collections::HashMap;
use std::fmt::Debug;

/// Per-label statistics of a one-vs-all evaluation, keyed by label name.
pub type MulticlassStatistics = HashMap<String, StatisticsRecord>;

/// Stateless evaluator bound to a label table, threshold and smoothing constant.
///
/// All three are fixed at construction. Evaluation only reads its inputs, so
/// one evaluator can be shared freely across callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    labels: LabelTable,
    threshold: f64,
    epsilon: f64,
}

impl Evaluator {
    /// Create an evaluator with the default smoothing constant.
    ///
    /// The label table must declare at least one class.
    pub fn new(labels: LabelTable, threshold: f64) -> Result<Self> {
        ensure!(threshold.is_finite(), MetricsError::invalid_threshold(threshold));
        ensure!(
            !labels.is_empty(),
            MetricsError::invalid_parameter("labels", "{}", "at least one class must be declared")
        );
        Ok(Self {
            labels,
            threshold,
            epsilon: DEFAULT_EPSILON,
        })
    }

    /// Replace the smoothing constant
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(MetricsError::invalid_parameter(
                "epsilon",
                epsilon.to_string(),
                "must be a positive finite number",
            ));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Create an evaluator from a validated configuration
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.labels.clone(), config.threshold)?.with_epsilon(config.epsilon)
    }

    /// Label table used for one-vs-all evaluation
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Smoothing constant
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Evaluate one example in binary mode
    pub fn evaluate(&self, example: &Example) -> Result<StatisticsRecord> {
        self.evaluate_arrays(&example.predictions(), &example.targets())
    }

    /// Evaluate raw arrays in binary mode.
    ///
    /// Both arrays are flattened and cast to integer categories before the
    /// threshold comparison. The example is rejected as a whole on a shape
    /// mismatch or an element without an integer value.
    pub fn evaluate_arrays<A, B, D1, D2>(
        &self,
        predictions: &ArrayView<'_, A, D1>,
        targets: &ArrayView<'_, B, D2>,
    ) -> Result<StatisticsRecord>
    where
        A: ToPrimitive + Debug,
        B: ToPrimitive + Debug,
        D1: Dimension,
        D2: Dimension,
    {
        if predictions.shape() != targets.shape() {
            return Err(MetricsError::shape_mismatch(
                predictions.shape(),
                targets.shape(),
            ));
        }

        let scores = cast_to_categories(predictions)?;
        let labels = cast_to_categories(targets)?;
        let masks = derive_confusion(&scores.view(), &labels.view(), self.threshold)?;
        let stats = summarize(&masks, self.epsilon);

        log::debug!(
            "evaluated example: n={} tp={} fp={} tn={} fn={} f1={:.5}",
            stats.n,
            stats.tp,
            stats.fp,
            stats.tn,
            stats.fn_,
            stats.f1
        );
        Ok(stats)
    }

    /// Evaluate one example one-vs-all over every class of the label table
    pub fn evaluate_multiclass(&self, example: &Example) -> Result<MulticlassStatistics> {
        self.evaluate_multiclass_arrays(&example.predictions(), &example.targets())
    }

    /// One-vs-all evaluation over raw arrays.
    ///
    /// For each `(class_idx, label)` the arrays are binarized with
    /// `value == class_idx` and evaluated in binary mode. Labels are visited
    /// in table order; a repeated label name keeps the last class's record.
    // TODO: a single pass building the full K x K confusion matrix would
    // replace the per-class rescans.
    pub fn evaluate_multiclass_arrays<A, B, D1, D2>(
        &self,
        predictions: &ArrayView<'_, A, D1>,
        targets: &ArrayView<'_, B, D2>,
    ) -> Result<MulticlassStatistics>
    where
        A: ToPrimitive,
        B: ToPrimitive,
        D1: Dimension,
        D2: Dimension,
    {
        if predictions.shape() != targets.shape() {
            return Err(MetricsError::shape_mismatch(
                predictions.shape(),
                targets.shape(),
            ));
        }

        let mut stats = MulticlassStatistics::with_capacity(self.labels.len());
        for (class_idx, label) in self.labels.iter() {
            let preds = one_vs_all(predictions, class_idx);
            let targets = one_vs_all(targets, class_idx);
            let record = self.evaluate_arrays(&preds.view(), &targets.view())?;
            stats.insert(label.to_string(), record);
        }
        Ok(stats)
    }
}

/// `1` where the element equals `class_idx`, `0` elsewhere
fn one_vs_all<A, D>(values: &ArrayView<'_, A, D>, class_idx: ClassIndex) -> ndarray::Array<u8, D>
where
    A: ToPrimitive,
    D: Dimension,
{
    let target = class_idx as f64;
    values.map(|v| u8::from(v.to_f64() == Some(target)))
}
