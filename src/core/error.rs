//! Error handling and error types for confmetrics.
//!
//! Every fallible operation in the crate returns [`Result`], and every
//! error is raised at the point of detection. Nothing is retried: all
//! operations are deterministic, so a retry would reproduce the same error.

use std::io;
use thiserror::Error;

/// Main error type for the confmetrics library.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Predictions and targets do not have the same shape
    #[error("Shape mismatch: predictions {predictions}, targets {targets}")]
    ShapeMismatch {
        /// Shape of the predictions array
        predictions: String,
        /// Shape of the targets array
        targets: String,
    },

    /// Decision threshold is not a finite real number
    #[error("Invalid threshold: {value} is not a finite number")]
    InvalidThreshold {
        /// Offending threshold value
        value: f64,
    },

    /// Persisted labels, threshold or metric rows are missing or ambiguous
    #[error("Malformed snapshot in table '{table}': {reason}")]
    MalformedSnapshot {
        /// Table the problem was found in
        table: String,
        /// What is wrong with it
        reason: String,
    },

    /// An array element cannot be cast to an integer category
    #[error("Invalid value at flat index {index}: {value}")]
    InvalidValue {
        /// Position in the flattened array
        index: usize,
        /// Rendered value
        value: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rendered value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A table was requested that the store does not hold
    #[error("Table not found: {table}")]
    TableNotFound {
        /// Requested table name
        table: String,
    },

    /// Table store failures not covered by a more specific variant
    #[error("Table store error: {message}")]
    Store {
        /// Error message
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[cfg(feature = "csv")]
    #[error("CSV error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// Polars DataFrame errors
    #[cfg(feature = "polars")]
    #[error("Polars error: {source}")]
    Polars {
        /// Underlying error
        #[from]
        source: polars::error::PolarsError,
    },
}

/// Type alias for Results using MetricsError
pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    /// Create a shape mismatch error from two array shapes
    pub fn shape_mismatch(predictions: &[usize], targets: &[usize]) -> Self {
        MetricsError::ShapeMismatch {
            predictions: format!("{:?}", predictions),
            targets: format!("{:?}", targets),
        }
    }

    /// Create an invalid threshold error
    pub fn invalid_threshold(value: f64) -> Self {
        MetricsError::InvalidThreshold { value }
    }

    /// Create a malformed snapshot error
    pub fn malformed_snapshot<T, R>(table: T, reason: R) -> Self
    where
        T: Into<String>,
        R: Into<String>,
    {
        MetricsError::MalformedSnapshot {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<V: ToString>(index: usize, value: V) -> Self {
        MetricsError::InvalidValue {
            index,
            value: value.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        MetricsError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        MetricsError::Config {
            message: message.into(),
        }
    }

    /// Create a table-not-found error
    pub fn table_not_found<S: Into<String>>(table: S) -> Self {
        MetricsError::TableNotFound {
            table: table.into(),
        }
    }

    /// Create a generic store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        MetricsError::Store {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Only store-side failures may succeed on a later attempt with
    /// different external state; everything else is a property of the input.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MetricsError::ShapeMismatch { .. } => false,
            MetricsError::InvalidThreshold { .. } => false,
            MetricsError::MalformedSnapshot { .. } => false,
            MetricsError::InvalidValue { .. } => false,
            MetricsError::InvalidParameter { .. } => false,
            MetricsError::Config { .. } => false,
            MetricsError::TableNotFound { .. } => true,
            MetricsError::Store { .. } => true,
            MetricsError::IO { .. } => true,
            #[cfg(feature = "csv")]
            MetricsError::Csv { .. } => false,
            MetricsError::Json { .. } => false,
            #[cfg(feature = "polars")]
            MetricsError::Polars { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MetricsError::ShapeMismatch { .. } => "shape_mismatch",
            MetricsError::InvalidThreshold { .. } => "invalid_threshold",
            MetricsError::MalformedSnapshot { .. } => "malformed_snapshot",
            MetricsError::InvalidValue { .. } => "invalid_value",
            MetricsError::InvalidParameter { .. } => "invalid_parameter",
            MetricsError::Config { .. } => "config",
            MetricsError::TableNotFound { .. } => "table_not_found",
            MetricsError::Store { .. } => "store",
            MetricsError::IO { .. } => "io",
            #[cfg(feature = "csv")]
            MetricsError::Csv { .. } => "csv",
            MetricsError::Json { .. } => "json",
            #[cfg(feature = "polars")]
            MetricsError::Polars { .. } => "polars",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::MetricsError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::MetricsError::config(format!($fmt, $($arg)*))
    };
}

/// Build a `MalformedSnapshot` error for a table
#[macro_export]
macro_rules! snapshot_error {
    ($table:expr, $msg:expr) => {
        $crate::core::error::MetricsError::malformed_snapshot($table, $msg)
    };
    ($table:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::core::error::MetricsError::malformed_snapshot($table, format!($fmt, $($arg)*))
    };
}

/// Return early with an error unless the condition holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
