//! Error types for table operations.

use thiserror::Error;

/// Errors that can occur when reading or mutating a [`Table`](super::Table).
#[derive(Debug, Error)]
pub enum TableError {
    /// A row's field count does not match the header count.
    #[error("row has {found} fields but the table has {expected} columns")]
    ShapeMismatch { expected: usize, found: usize },

    /// A column index is outside the header bounds.
    #[error("column index {index} is out of range (table has {len} columns)")]
    IndexOutOfRange { index: usize, len: usize },

    /// No row carries the requested key.
    #[error("no row with key '{key}' in column {key_index}")]
    NotFound { key_index: usize, key: String },

    /// The CSV source had no header line.
    #[error("CSV source is empty: expected a header line")]
    MissingHeader,

    /// A CSV data line has the wrong number of fields.
    #[error("line {line}: found {found} fields, expected {expected}")]
    MalformedLine {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A field holds a line break that cannot be written without quoting.
    #[error("line {line}, column {column}: field contains a line break")]
    LineBreakInField { line: u64, column: usize },

    /// File read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

impl TableError {
    /// Create a not-found error for a key lookup.
    pub fn not_found(key_index: usize, key: impl Into<String>) -> Self {
        TableError::NotFound {
            key_index,
            key: key.into(),
        }
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
