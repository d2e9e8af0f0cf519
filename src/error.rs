//! Error types for ingestion, filtering, and export.
//!
//! Data-shape anomalies (missing columns, bad years, empty views) are not
//! errors; they are repaired by the normalizer or reported as "no data".

use thiserror::Error;

/// The uploaded content could not be read as a table.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input had no header row at all.
    #[error("input is empty: no header row found")]
    Empty,

    /// The CSV tokenizer rejected the input.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A data row carried more cells than the header declares.
    #[error("expected {expected} fields in line {line}, saw {found}")]
    RowWidth {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// JSON input was not an array of flat objects.
    #[error("invalid JSON table: {0}")]
    Json(String),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A filter expression could not be turned into a filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter expression near '{0}'")]
    Parse(String),

    #[error("unknown field '{0}' in filter")]
    UnknownField(String),

    /// Numeric ranges are only defined for `Year Joined`.
    #[error("range constraint not supported on field '{0}'")]
    UnsupportedRange(String),
}

/// Writing the filtered view back out failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}
