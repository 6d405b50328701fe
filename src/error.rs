//! Error handling for bulletin parsing operations.
//!
//! Structural and configuration failures carry the offending row, text or
//! count so a run can be diagnosed without re-running it. Data-quality
//! warnings are logged elsewhere and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unknown row format: no known shape has {count} columns (sample row: {sample:?})")]
    UnknownRowFormat { count: usize, sample: Vec<String> },

    #[error("No boundary pair found for parsing unit '{unit}'. Attempted markers: {attempted}")]
    BoundaryNotFound { unit: String, attempted: String },

    #[error("Value normalization exceeded maximum attempts on '{text}'")]
    NormalizationDepthExceeded { text: String },

    #[error("Value cell encountered before year cell for label {label}: {row:?}")]
    ValueBeforeYear { label: String, row: Vec<String> },

    #[error("Cannot read year from cell '{cell}' in row {row:?}")]
    InvalidYear { cell: String, row: Vec<String> },

    #[error("Conflicting observations for {label} at {date}: {first} vs {second}")]
    ConflictingObservation {
        label: String,
        date: chrono::NaiveDate,
        first: f64,
        second: f64,
    },

    #[error("Required labels not found in parsing unit '{unit}': {}", labels.join(", "))]
    RequiredLabelMissing { unit: String, labels: Vec<String> },

    #[error("Validation failed:\n  {}", failures.join("\n  "))]
    Validation { failures: Vec<String> },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, KepError>;
