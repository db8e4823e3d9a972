//! Rate calculation: recall, precision, F1 and friends from confusion counts.
//!
//! Every denominator carries the smoothing constant `eps`. After the raw
//! rates are computed two overrides apply independently:
//!
//! - no ground-truth positives (`tp + fn == 0`): `recall = tpr = 1.0`
//! - no predicted positives (`tp + fp == 0`): `precision = fpr = 1.0`
//!
//! F1 is computed from the overridden precision and recall.

use crate::core::constants::{COUNT_FIELDS, RATE_FIELDS};
use crate::core::error::{MetricsError, Result};
use crate::io::{TableRow, Value};
use crate::metrics::confusion::{ConfusionCounts, ConfusionMasks};
use serde::{Deserialize, Serialize};

/// Flat per-example statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    /// Number of elements in the flattened example
    pub n: u64,
    /// True positives
    pub tp: u64,
    /// False positives
    pub fp: u64,
    /// True negatives
    pub tn: u64,
    /// False negatives
    #[serde(rename = "fn")]
    pub fn_: u64,
    /// True positive rate
    pub tpr: f64,
    /// `fp / (tp + fp)`
    pub fpr: f64,
    /// Recall
    pub recall: f64,
    /// Precision
    pub precision: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
}

impl StatisticsRecord {
    /// Value of a tracked field by column name
    pub fn field(&self, name: &str) -> Option<Value> {
        let count = |v: u64| Some(Value::Int(v as i64));
        match name {
            "n" => count(self.n),
            "tp" => count(self.tp),
            "fp" => count(self.fp),
            "tn" => count(self.tn),
            "fn" => count(self.fn_),
            "tpr" => Some(Value::Float(self.tpr)),
            "fpr" => Some(Value::Float(self.fpr)),
            "recall" => Some(Value::Float(self.recall)),
            "precision" => Some(Value::Float(self.precision)),
            "f1" => Some(Value::Float(self.f1)),
            _ => None,
        }
    }

    /// Tracked fields as a table row
    pub fn to_row(&self) -> TableRow {
        COUNT_FIELDS
            .iter()
            .chain(RATE_FIELDS.iter())
            .filter_map(|&name| self.field(name).map(|v| (name.to_string(), v)))
            .collect()
    }

    /// Rebuild a record from a table row; `table` names the source in errors
    pub fn from_row(row: &TableRow, table: &str) -> Result<Self> {
        let count = |name: &str| -> Result<u64> {
            let value = row.get(name).ok_or_else(|| {
                MetricsError::malformed_snapshot(table, format!("missing column '{}'", name))
            })?;
            value
                .as_i64()
                .filter(|&v| v >= 0)
                .map(|v| v as u64)
                .ok_or_else(|| {
                    MetricsError::malformed_snapshot(
                        table,
                        format!("column '{}' is not a non-negative integer: {}", name, value),
                    )
                })
        };
        let rate = |name: &str| -> Result<f64> {
            let value = row.get(name).ok_or_else(|| {
                MetricsError::malformed_snapshot(table, format!("missing column '{}'", name))
            })?;
            value.as_f64().ok_or_else(|| {
                MetricsError::malformed_snapshot(
                    table,
                    format!("column '{}' is not numeric: {}", name, value),
                )
            })
        };

        Ok(Self {
            n: count("n")?,
            tp: count("tp")?,
            fp: count("fp")?,
            tn: count("tn")?,
            fn_: count("fn")?,
            tpr: rate("tpr")?,
            fpr: rate("fpr")?,
            recall: rate("recall")?,
            precision: rate("precision")?,
            f1: rate("f1")?,
        })
    }
}

/// Reduce confusion masks to a statistics record
pub fn summarize(masks: &ConfusionMasks, eps: f64) -> StatisticsRecord {
    summarize_counts(masks.counts(), eps)
}

/// Derive all rates from confusion counts
pub fn summarize_counts(counts: ConfusionCounts, eps: f64) -> StatisticsRecord {
    let tp = counts.tp as f64;
    let fp = counts.fp as f64;
    let fn_ = counts.fn_ as f64;

    let mut recall = tp / (tp + fn_ + eps);
    let mut tpr = recall;
    let mut fpr = fp / (tp + fp + eps);
    let mut precision = tp / (tp + fp + eps);

    if counts.tp + counts.fn_ == 0 {
        log::trace!("no ground-truth positives, recall set to 1.0");
        recall = 1.0;
        tpr = 1.0;
    }
    if counts.tp + counts.fp == 0 {
        log::trace!("no predicted positives, precision set to 1.0");
        precision = 1.0;
        fpr = 1.0;
    }

    let f1 = 2.0 * (precision * recall) / (precision + recall + eps);

    StatisticsRecord {
        n: counts.n,
        tp: counts.tp,
        fp: counts.fp,
        tn: counts.tn,
        fn_: counts.fn_,
        tpr,
        fpr,
        recall,
        precision,
        f1,
    }
}
