//! Error types for rowset.

use thiserror::Error;

/// The main error type for rowset operations.
#[derive(Debug, Error)]
pub enum RowsetError {
    /// Failed to connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error, with the driver message preserved verbatim.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Named-parameter binding error.
    #[error("Parameter error: {0}")]
    Param(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Indexed past the end of an exhausted result set.
    #[error("Row index {index} out of range for result set of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    /// A strict single-row accessor found no rows.
    #[error("Result set contains no rows")]
    NoRows,

    /// A strict single-row accessor found more than one row.
    #[error("Result set contains more than one row")]
    AmbiguousResult,

    /// Slice with a zero step or similar malformed range.
    #[error("Invalid slice: {0}")]
    InvalidSlice(String),

    /// Export format name is not recognized.
    #[error("Unsupported export format: '{0}'")]
    UnsupportedFormat(String),

    /// Export serialization error.
    #[error("Export error: {0}")]
    Export(String),
}

impl RowsetError {
    /// Create an out-of-range error for the given index against the
    /// final length of the result set.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// Result type alias for rowset operations.
pub type RowsetResult<T> = Result<T, RowsetError>;
