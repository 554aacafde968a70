//! Error types for trueno-frame operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in trueno-frame operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A declared column field is not array-shaped.
    #[error("Property {column} is not an array")]
    NotArray {
        /// Declared column name.
        column: String,
    },

    /// Declared columns disagree in length.
    #[error("Column {column} has {found} elements, previously seen columns have {expected}")]
    LengthMismatch {
        /// Column that broke the shared length.
        column: String,
        /// Length of the previously seen columns.
        expected: usize,
        /// Length of the offending column.
        found: usize,
    },

    /// A dataframe's row count was requested but no column reports a length.
    #[error("No variable with length in dataframe")]
    NoLengthedVariable,

    /// A numeric column received a value that cannot be read as a number.
    #[error("Column {column} has a non-numeric value at index {index}")]
    NotNumeric {
        /// Column name.
        column: String,
        /// Row index of the offending value.
        index: usize,
    },

    /// A column key was not found.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A column has the wrong storage strategy for the requested operation.
    #[error("Column {column} is not a {expected} column")]
    UnsupportedColumn {
        /// Column key.
        column: String,
        /// Storage strategy the operation requires.
        expected: &'static str,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Binning input holds an infinite value.
    #[error("Cannot bin non-finite values")]
    NonFiniteData,

    /// A bin grid would span more intervals than allowed.
    #[error("Bin grid exceeds {limit} intervals")]
    TooManyBins {
        /// Largest allowed interval count.
        limit: usize,
    },

    /// A row was assigned to a level outside `[0, cardinality)`.
    #[error("Level {level} out of range for cardinality {cardinality}")]
    LevelOutOfRange {
        /// Offending level.
        level: usize,
        /// Cardinality of the partition.
        cardinality: usize,
    },

    /// A value does not appear among the declared level labels.
    #[error("Value {value:?} is not one of the declared levels")]
    UnknownLevel {
        /// Offending value.
        value: String,
    },

    /// Raw input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be read.
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    /// Configuration could not be parsed.
    #[error("Configuration parse error at line {line}: {message}")]
    ConfigParse {
        /// Line of the parse failure (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },
}
