//! Data-layer error types.

use thiserror::Error;

/// Errors that can occur while loading or validating market data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required file was not found on disk.
    #[error("file not found: {0} ({1})")]
    FileNotFound(String, String),

    /// Parquet or JSON parsing failed.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A required column is missing.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A column has an unexpected data type.
    #[error("invalid column type: {0}")]
    InvalidColumnType(String),

    /// A timestamp column is missing timezone or not UTC.
    #[error("invalid timezone for column {column}: expected UTC, got {timezone}")]
    InvalidTimezone {
        /// Name of the offending column.
        column: String,
        /// Observed timezone string ("<none>" if missing).
        timezone: String,
    },

    /// The file extension is neither `.parquet` nor `.json`.
    #[error("unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// No rows were loaded after reading data.
    #[error("empty data")]
    EmptyData,

    /// Date-range filtering removed all rows.
    #[error("date-range filter produced empty result: start_ns={start_ns}, end_ns={end_ns}")]
    DateRangeEmpty {
        /// Inclusive start timestamp (epoch-ns).
        start_ns: i64,
        /// Inclusive end timestamp (epoch-ns).
        end_ns: i64,
    },

    /// Data violated a validation rule.
    #[error("corrupt data: {0}")]
    CorruptData(String),
}
