//! Confusion-matrix derivation at a fixed decision threshold.
//!
//! Every element of the flattened input falls into exactly one of the four
//! buckets, provided its label is `0` or `1`:
//!
//! | decision                 | `label == 1` | `label == 0` |
//! |--------------------------|--------------|--------------|
//! | `score >= threshold`     | tp           | fp           |
//! | `score <  threshold`     | fn           | tn           |

use crate::core::error::{MetricsError, Result};
use ndarray::{Array1, ArrayView, ArrayView1, Dimension, Zip};
use num_traits::ToPrimitive;
use std::fmt::Debug;

/// Boolean indicator masks, one per confusion category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMasks {
    /// Predicted positive, labelled positive
    pub tp: Array1<bool>,
    /// Predicted positive, labelled negative
    pub fp: Array1<bool>,
    /// Predicted negative, labelled negative
    pub tn: Array1<bool>,
    /// Predicted negative, labelled positive
    pub fn_: Array1<bool>,
}

impl ConfusionMasks {
    /// Number of elements the masks were derived from
    pub fn len(&self) -> usize {
        self.tp.len()
    }

    /// Whether the masks are empty
    pub fn is_empty(&self) -> bool {
        self.tp.is_empty()
    }

    /// Reduce the masks to counts
    pub fn counts(&self) -> ConfusionCounts {
        ConfusionCounts::from_masks(self)
    }
}

/// Scalar confusion counts plus the element count they were taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    /// Total number of elements
    pub n: u64,
    /// True positives
    pub tp: u64,
    /// False positives
    pub fp: u64,
    /// True negatives
    pub tn: u64,
    /// False negatives
    pub fn_: u64,
}

impl ConfusionCounts {
    /// Counts with `n` set to their sum
    pub fn new(tp: u64, fp: u64, tn: u64, fn_: u64) -> Self {
        Self {
            n: tp + fp + tn + fn_,
            tp,
            fp,
            tn,
            fn_,
        }
    }

    /// Sum each mask; `n` is the mask length
    pub fn from_masks(masks: &ConfusionMasks) -> Self {
        let count = |mask: &Array1<bool>| mask.iter().filter(|&&set| set).count() as u64;
        Self {
            n: masks.len() as u64,
            tp: count(&masks.tp),
            fp: count(&masks.fp),
            tn: count(&masks.tn),
            fn_: count(&masks.fn_),
        }
    }

    /// `tp + fp + tn + fn`
    pub fn total(&self) -> u64 {
        self.tp + self.fp + self.tn + self.fn_
    }
}

/// Classify every element into tp/fp/tn/fn.
///
/// Pure: the inputs are only read. Labels other than `0` and `1` fall into
/// no bucket.
pub fn derive_confusion<S, L>(
    scores: &ArrayView1<'_, S>,
    labels: &ArrayView1<'_, L>,
    threshold: f64,
) -> Result<ConfusionMasks>
where
    S: ToPrimitive,
    L: ToPrimitive,
{
    if scores.len() != labels.len() {
        return Err(MetricsError::shape_mismatch(
            &[scores.len()],
            &[labels.len()],
        ));
    }

    let n = scores.len();
    let mut masks = ConfusionMasks {
        tp: Array1::from_elem(n, false),
        fp: Array1::from_elem(n, false),
        tn: Array1::from_elem(n, false),
        fn_: Array1::from_elem(n, false),
    };

    Zip::from(scores)
        .and(labels)
        .and(&mut masks.tp)
        .and(&mut masks.fp)
        .and(&mut masks.tn)
        .and(&mut masks.fn_)
        .for_each(|score, label, tp, fp, tn, fn_| {
            let positive = score.to_f64().map_or(false, |s| s >= threshold);
            let label = label.to_f64();
            let is_one = label == Some(1.0);
            let is_zero = label == Some(0.0);
            *tp = positive && is_one;
            *fp = positive && is_zero;
            *tn = !positive && is_zero;
            *fn_ = !positive && is_one;
        });

    Ok(masks)
}

/// Flatten an array into integer categories, truncating toward zero.
///
/// Rejects the whole array on the first element that has no integer
/// representation (NaN, infinite, out of `i64` range).
pub fn cast_to_categories<A, D>(values: &ArrayView<'_, A, D>) -> Result<Array1<i64>>
where
    A: ToPrimitive + Debug,
    D: Dimension,
{
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .to_i64()
                .ok_or_else(|| MetricsError::invalid_value(index, format!("{:?}", value)))
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from_vec)
}
