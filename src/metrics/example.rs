//! Paired prediction/target arrays.

use crate::core::error::{MetricsError, Result};
use ndarray::{Array1, ArrayD, ArrayViewD};

/// One evaluated example: equal-shaped predictions and targets.
///
/// The shape invariant is checked on construction, so every `Example` in
/// circulation can be flattened and compared element-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    predictions: ArrayD<f64>,
    targets: ArrayD<f64>,
}

impl Example {
    /// Pair predictions with targets, failing on a shape mismatch
    pub fn new(predictions: ArrayD<f64>, targets: ArrayD<f64>) -> Result<Self> {
        if predictions.shape() != targets.shape() {
            return Err(MetricsError::shape_mismatch(
                predictions.shape(),
                targets.shape(),
            ));
        }
        Ok(Self {
            predictions,
            targets,
        })
    }

    /// Build a one-dimensional example from plain vectors
    pub fn from_vecs(predictions: Vec<f64>, targets: Vec<f64>) -> Result<Self> {
        Self::new(
            Array1::from_vec(predictions).into_dyn(),
            Array1::from_vec(targets).into_dyn(),
        )
    }

    /// Predictions view
    pub fn predictions(&self) -> ArrayViewD<'_, f64> {
        self.predictions.view()
    }

    /// Targets view
    pub fn targets(&self) -> ArrayViewD<'_, f64> {
        self.targets.view()
    }

    /// Shared shape of both arrays
    pub fn shape(&self) -> &[usize] {
        self.predictions.shape()
    }

    /// Number of elements after flattening
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Whether the example holds no elements
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Consume the example into `(predictions, targets)`
    pub fn into_parts(self) -> (ArrayD<f64>, ArrayD<f64>) {
        (self.predictions, self.targets)
    }
}
