//! Error types for the Starload batch pipeline.
//!
//! Every stage has its own error type and the orchestrator wraps them all:
//!
//! - [`CsvError`] - reading and decoding delimited source files
//! - [`TransformError`] - missing columns and unparseable cells in builders
//! - [`QualityError`] - aggregate of every failing data-quality check
//! - [`LoadError`] - writing curated tables and the run report
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversion into [`PipelineError`] is automatic via `From`, so `?` works
//! across stage boundaries. Nothing is recovered locally: every error ends
//! the run.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::QualityCheckResult;

// =============================================================================
// CSV Extraction Errors
// =============================================================================

/// Errors while reading a source extract.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid CSV format.
    #[error("Invalid CSV format in '{table}' at line {line}: {message}")]
    ParseError {
        table: String,
        line: u64,
        message: String,
    },

    /// Empty file.
    #[error("CSV file '{0}' is empty")]
    EmptyFile(String),

    /// No headers found.
    #[error("No headers found in CSV '{0}'")]
    NoHeaders(String),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised while building dimension and fact tables.
///
/// `row` is the 1-based position of the offending data row in its table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Missing required source column.
    #[error("Missing column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// Required cell is empty.
    #[error("Missing value for '{column}' in table '{table}', row {row}")]
    MissingValue {
        table: String,
        column: String,
        row: usize,
    },

    /// Cell does not parse as a date or timestamp.
    #[error("Invalid date '{value}' for '{column}' in table '{table}', row {row}")]
    InvalidDate {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// Cell does not parse as a number.
    #[error("Invalid number '{value}' for '{column}' in table '{table}', row {row}")]
    InvalidNumber {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// Row does not match the table's column count.
    #[error("Row has {found} cells but table '{table}' has {expected} columns")]
    RowWidth {
        table: String,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Data Quality Errors
// =============================================================================

/// Raised by the quality gate when at least one check failed.
///
/// Carries every failing result so callers can inspect them; the message
/// lists all of them joined with `"; "`.
#[derive(Debug, Error)]
#[error("Data quality checks failed: {}", format_failures(.failures))]
pub struct QualityError {
    pub failures: Vec<QualityCheckResult>,
}

impl QualityError {
    /// Names of the failing checks, in evaluation order.
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|r| r.name.as_str()).collect()
    }
}

fn format_failures(failures: &[QualityCheckResult]) -> String {
    failures
        .iter()
        .map(|r| format!("{}: {}", r.name, r.details.as_deref().unwrap_or("no details")))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while persisting curated outputs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Destination could not be created or written.
    #[error("Failed to write '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    /// Report serialization error.
    #[error("Report JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction error.
    #[error("Extraction error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Data quality gate failed.
    #[error("{0}")]
    Quality(#[from] QualityError),

    /// Load error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extraction.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for builders.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
