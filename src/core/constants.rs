//! System constants and default configuration values for confmetrics.

/// Default decision threshold; a prediction is positive iff `value >= threshold`.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Smoothing constant added to every rate denominator.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Default metric name, also the name of the accumulated table.
pub const DEFAULT_METRIC_NAME: &str = "f1";

/// Name of the persisted label table.
pub const LABELS_TABLE: &str = "labels";

/// Name of the persisted single-row threshold table.
pub const THRESHOLD_TABLE: &str = "threshold";

/// Row id column of the accumulated table.
pub const ROWID_COLUMN: &str = "rowid";

/// Class index column of the label table.
pub const CLASS_IDX_COLUMN: &str = "class_idx";

/// Class name column of the label table.
pub const LABEL_COLUMN: &str = "label";

/// Value column of the threshold table.
pub const THRESHOLD_COLUMN: &str = "threshold";

/// Fields tracked per example, in column order.
pub const TRACKED_FIELDS: [&str; 10] = [
    "n",
    "tp",
    "fp",
    "tn",
    "fn",
    "tpr",
    "fpr",
    "recall",
    "precision",
    "f1",
];

/// Integer-valued tracked fields.
pub const COUNT_FIELDS: [&str; 5] = ["n", "tp", "fp", "tn", "fn"];

/// Float-valued tracked fields.
pub const RATE_FIELDS: [&str; 5] = ["tpr", "fpr", "recall", "precision", "f1"];

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CONFMETRICS_";

/// Library version
pub const CONFMETRICS_VERSION: &str = env!("CARGO_PKG_VERSION");
