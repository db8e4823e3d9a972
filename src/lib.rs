//! # confmetrics
//!
//! Confusion-matrix statistics for classification outputs: true/false
//! positives and negatives, precision, recall and F1, evaluated per example
//! in binary or one-vs-all multiclass mode and accumulated into a table keyed
//! by row id that can be persisted and restored.
//!
//! ## Quick Start
//!
//! ```rust
//! use confmetrics::{Example, LabelTable, MemoryTableStore, MetricsAccumulator};
//!
//! # fn main() -> confmetrics::Result<()> {
//! let mut acc = MetricsAccumulator::new("f1", LabelTable::binary(), 0.5)?;
//!
//! let example = Example::from_vecs(vec![1.0, 1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0, 1.0])?;
//! let stats = acc.evaluate_and_record(0, &example)?;
//! assert_eq!(stats.n, 4);
//!
//! let mut store = MemoryTableStore::new();
//! acc.persist(&mut store)?;
//! let restored = MetricsAccumulator::load(&store, "f1")?;
//! assert_eq!(restored, acc);
//! # Ok(())
//! # }
//! ```
//!
//! ## Edge cases
//!
//! Rates are smoothed with a small `epsilon` in every denominator. An example
//! without ground-truth positives reports `recall = tpr = 1.0`; one without
//! predicted positives reports `precision = fpr = 1.0`. F1 is computed from
//! the values after these substitutions.
//!
//! ## Architecture
//!
//! - [`core`]: error taxonomy, label table, constants, logging setup
//! - [`config`]: [`EvaluatorConfig`] with file and environment loading
//! - [`metrics`]: confusion derivation, rate calculation, [`Evaluator`]
//! - [`accumulator`]: [`MetricsAccumulator`] and its snapshot format
//! - [`io`]: the [`TableStore`] abstraction and its backends
//! - [`syn`]: seedable synthetic examples

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Metric computation
pub mod metrics;

// Row-indexed accumulation and restore
pub mod accumulator;

// Table stores
pub mod io;

// Synthetic examples
pub mod syn;

pub use crate::core::{
    constants::*,
    error::{MetricsError, Result},
    types::*,
};

pub use config::{resolve_config, ConfigSource, EvaluatorConfig, EvaluatorConfigBuilder};

pub use metrics::{
    ConfusionCounts, ConfusionMasks, Evaluator, Example, MulticlassStatistics, StatisticsRecord,
};

pub use accumulator::{AccumulatorState, MetricsAccumulator, MetricsSummary, Snapshot};

#[cfg(feature = "csv")]
#[cfg_attr(docsrs, doc(cfg(feature = "csv")))]
pub use io::CsvTableStore;
#[cfg(feature = "polars")]
#[cfg_attr(docsrs, doc(cfg(feature = "polars")))]
pub use io::ParquetTableStore;
pub use io::{
    open_store, JsonTableStore, MemoryTableStore, StoreFormat, TableRow, TableStore, Value,
};

pub use syn::{ExampleKind, SyntheticClassification};

// Version information
pub use crate::core::constants::CONFMETRICS_VERSION as VERSION;

/// Initialize the library.
///
/// Installs the `env_logger` backend for the `log` facade. Calling it is
/// optional; without it log records are discarded.
///
/// ```rust
/// fn main() -> confmetrics::Result<()> {
///     confmetrics::init()?;
///     assert!(confmetrics::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    core::is_core_initialized()
}
