//! Confusion-matrix metrics for binary and one-vs-all multiclass evaluation.
//!
//! The pipeline for one example is:
//!
//! 1. [`confusion::cast_to_categories`] flattens and truncates both arrays
//! 2. [`confusion::derive_confusion`] splits elements into tp/fp/tn/fn
//! 3. [`rates::summarize`] turns the masks into a [`StatisticsRecord`]
//!
//! [`Evaluator`] drives these steps and adds the one-vs-all decomposition.
//!
//! ```rust
//! use confmetrics::metrics::{Evaluator, Example};
//! use confmetrics::LabelTable;
//!
//! # fn main() -> confmetrics::Result<()> {
//! let evaluator = Evaluator::new(LabelTable::binary(), 0.5)?;
//! let example = Example::from_vecs(vec![1.0, 1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0, 1.0])?;
//! let stats = evaluator.evaluate(&example)?;
//! assert_eq!((stats.tp, stats.fp, stats.tn, stats.fn_), (1, 1, 1, 1));
//! # Ok(())
//! # }
//! ```

pub mod confusion;
pub mod evaluator;
pub mod example;
pub mod rates;

pub use confusion::{cast_to_categories, derive_confusion, ConfusionCounts, ConfusionMasks};
pub use evaluator::{Evaluator, MulticlassStatistics};
pub use example::Example;
pub use rates::{summarize, summarize_counts, StatisticsRecord};
