//! Error types for knee detection and dataset ingest.

use thiserror::Error;

/// Result type alias for kneedle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during knee detection or data import.
///
/// An absent knee is not an error: detection returns `Ok(None)` when no
/// candidate survives the sensitivity threshold.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A curve needs at least three points to have an interior knee.
    #[error("Curve has too few points: {found} (minimum 3)")]
    TooFewPoints {
        /// Number of usable points after dropping non-finite rows.
        found: usize,
    },

    /// X values must be strictly increasing after deduplication.
    #[error("Curve x values are not strictly increasing at index {index}")]
    NonMonotonicX {
        /// Index of the first out-of-order x value.
        index: usize,
    },

    /// Sensitivity must be a finite value >= 0.
    #[error("Invalid sensitivity: {0} (expected a finite value >= 0)")]
    InvalidSensitivity(f64),

    /// Polynomial smoothing degree must be >= 1.
    #[error("Invalid polynomial degree: {0} (expected >= 1)")]
    InvalidDegree(usize),

    /// The least-squares system for a polynomial fit could not be solved.
    #[error("Polynomial fit failed: {0}")]
    FitFailed(String),

    /// The requested column does not exist in the dataset.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// The requested column contains values that do not parse as numbers.
    #[error("Column '{column}' is not numeric: {reason}")]
    NonNumericColumn {
        /// Column header name.
        column: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Error reading a delimited input file.
    #[error("Import error at line {line}: {reason}")]
    Import {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
