//! Synthetic classification examples.
//!
//! Generators produce [`Example`]s of a fixed shape with integer-valued
//! class indices in `[0, num_classes)`. Each [`ExampleKind`] maps to one
//! generator function through a fixed dispatch table.

use crate::core::error::{MetricsError, Result};
use crate::metrics::Example;
use ndarray::{ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named kinds of synthetic example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleKind {
    /// Independent uniform predictions and targets
    Random,
    /// Targets equal to the predictions
    AllCorrect,
    /// Zero predictions against non-zero targets
    AllWrong,
    /// Zero predictions and zero targets
    AllZeros,
}

impl ExampleKind {
    /// Every kind, in dispatch-table order
    pub const ALL: [ExampleKind; 4] = [
        ExampleKind::Random,
        ExampleKind::AllCorrect,
        ExampleKind::AllWrong,
        ExampleKind::AllZeros,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExampleKind::Random => "random",
            ExampleKind::AllCorrect => "all_correct",
            ExampleKind::AllWrong => "all_wrong",
            ExampleKind::AllZeros => "all_zeros",
        }
    }
}

impl fmt::Display for ExampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExampleKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        ExampleKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                MetricsError::invalid_parameter(
                    "kind",
                    s,
                    "expected one of random, all_correct, all_wrong, all_zeros",
                )
            })
    }
}

type Generator = fn(&mut SyntheticClassification) -> Result<Example>;

const GENERATORS: [(ExampleKind, Generator); 4] = [
    (ExampleKind::Random, random),
    (ExampleKind::AllCorrect, all_correct),
    (ExampleKind::AllWrong, all_wrong),
    (ExampleKind::AllZeros, all_zeros),
];

/// Seedable source of synthetic classification examples.
#[derive(Debug, Clone)]
pub struct SyntheticClassification {
    shape: Vec<usize>,
    num_classes: usize,
    rng: StdRng,
}

impl SyntheticClassification {
    /// Entropy-seeded generator
    pub fn new(shape: &[usize], num_classes: usize) -> Result<Self> {
        Self::with_rng(shape, num_classes, StdRng::from_entropy())
    }

    /// Deterministic generator
    pub fn with_seed(shape: &[usize], num_classes: usize, seed: u64) -> Result<Self> {
        Self::with_rng(shape, num_classes, StdRng::seed_from_u64(seed))
    }

    fn with_rng(shape: &[usize], num_classes: usize, rng: StdRng) -> Result<Self> {
        if num_classes == 0 {
            return Err(MetricsError::invalid_parameter(
                "num_classes",
                "0",
                "at least one class is required",
            ));
        }
        Ok(Self {
            shape: shape.to_vec(),
            num_classes,
            rng,
        })
    }

    /// Shape of every generated array
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of classes drawn from
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Generate one example of the given kind
    pub fn generate(&mut self, kind: ExampleKind) -> Result<Example> {
        let (_, generator) = GENERATORS
            .iter()
            .find(|(k, _)| *k == kind)
            .ok_or_else(|| MetricsError::invalid_parameter("kind", kind.as_str(), "no generator"))?;
        generator(self)
    }

    fn uniform(&mut self, low: usize) -> ArrayD<f64> {
        let high = self.num_classes;
        let rng = &mut self.rng;
        ArrayD::from_shape_fn(IxDyn(&self.shape), |_| rng.gen_range(low..high) as f64)
    }

    fn zeros(&self) -> ArrayD<f64> {
        ArrayD::zeros(IxDyn(&self.shape))
    }
}

fn random(g: &mut SyntheticClassification) -> Result<Example> {
    let predictions = g.uniform(0);
    let targets = g.uniform(0);
    Example::new(predictions, targets)
}

fn all_correct(g: &mut SyntheticClassification) -> Result<Example> {
    let predictions = g.uniform(0);
    let targets = predictions.clone();
    Example::new(predictions, targets)
}

fn all_wrong(g: &mut SyntheticClassification) -> Result<Example> {
    if g.num_classes < 2 {
        return Err(MetricsError::invalid_parameter(
            "num_classes",
            g.num_classes.to_string(),
            "all_wrong needs at least two classes",
        ));
    }
    let targets = g.uniform(1);
    Example::new(g.zeros(), targets)
}

fn all_zeros(g: &mut SyntheticClassification) -> Result<Example> {
    Example::new(g.zeros(), g.zeros())
}
