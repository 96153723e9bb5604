//! Error types for the document preprocessing pipeline.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Broad classification of a [`PrepError`].
///
/// Callers that only care about how to react (fix the call, provide a file,
/// install a dependency) can match on the kind instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid arguments, raised before any data is read.
    Configuration,
    /// A referenced file does not exist.
    MissingResource,
    /// A file exists but holds no records.
    EmptyInput,
    /// A transformation broke the length contract.
    ContractViolation,
    /// A named step needs an external resource that is not available.
    OptionalDependency,
    /// The input shape is not one the adapter understands, or a document
    /// the pattern engine cannot finish matching.
    Unsupported,
    /// Reading, writing or dataframe failures.
    Io,
}

/// Errors raised while preparing, chunking or transforming documents.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("chunksize must be non-negative, got {value}")]
    NegativeChunksize { value: i64 },

    #[error("nrows must be non-negative, got {value}")]
    NegativeNrows { value: i64 },

    #[error("first_row must be one of 'header', 'data' or 'skip', got '{value}'")]
    InvalidFirstRow { value: String },

    #[error("separator must be a single ASCII character, got '{value}'")]
    InvalidDelimiter { value: char },

    #[error("column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("key column '{column}' is not present in the table")]
    MissingKeyColumn { column: String },

    #[error("min_size must be greater than zero")]
    InvalidMinSize,

    #[error("invalid order advisory table {source_name}: {message}")]
    InvalidAdvisoryTable {
        source_name: String,
        message: String,
    },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("file has no records: {path}")]
    EmptyFile { path: PathBuf },

    #[error("transformation '{transform}' returned {actual} documents, expected {expected}")]
    LengthMismatch {
        transform: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "memoized transformation '{transform}' returned {output} values for {input} distinct inputs"
    )]
    DistinctLengthMismatch {
        transform: String,
        input: usize,
        output: usize,
    },

    #[error("transformation '{transform}' dropped the join column '{column}'")]
    JoinKeyDropped { transform: String, column: String },

    #[error("step '{step}' requires {dependency}, which is not available: {hint}")]
    OptionalDependency {
        step: String,
        dependency: String,
        hint: String,
    },

    #[error("matching '{pattern}' failed: {message}")]
    PatternFailed { pattern: String, message: String },

    #[error("unsupported document collection type: {found}")]
    UnsupportedType { found: String },

    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("dataframe error: {message}")]
    DataFrame { message: String },

    #[error("could not find a free output file name for {path}")]
    OutputNameExhausted { path: PathBuf },

    #[error("could not find a free column name derived from '{column}'")]
    ColumnNameExhausted { column: String },
}

impl PrepError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrepError::NegativeChunksize { .. }
            | PrepError::NegativeNrows { .. }
            | PrepError::InvalidFirstRow { .. }
            | PrepError::InvalidDelimiter { .. }
            | PrepError::ColumnNotFound { .. }
            | PrepError::MissingKeyColumn { .. }
            | PrepError::InvalidMinSize
            | PrepError::InvalidAdvisoryTable { .. }
            | PrepError::InvalidPattern { .. } => ErrorKind::Configuration,
            PrepError::FileNotFound { .. } => ErrorKind::MissingResource,
            PrepError::EmptyFile { .. } => ErrorKind::EmptyInput,
            PrepError::LengthMismatch { .. }
            | PrepError::DistinctLengthMismatch { .. }
            | PrepError::JoinKeyDropped { .. } => ErrorKind::ContractViolation,
            PrepError::OptionalDependency { .. } => ErrorKind::OptionalDependency,
            PrepError::UnsupportedType { .. } | PrepError::PatternFailed { .. } => {
                ErrorKind::Unsupported
            }
            PrepError::FileRead { .. }
            | PrepError::FileWrite { .. }
            | PrepError::Csv { .. }
            | PrepError::DataFrame { .. }
            | PrepError::OutputNameExhausted { .. }
            | PrepError::ColumnNameExhausted { .. } => ErrorKind::Io,
        }
    }
}

impl From<PolarsError> for PrepError {
    fn from(err: PolarsError) -> Self {
        PrepError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for docprep operations.
pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::FileNotFound {
            path: PathBuf::from("/tmp/missing.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.csv");

        let err = PrepError::LengthMismatch {
            transform: "to_lower".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "transformation 'to_lower' returned 2 documents, expected 3"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PrepError::NegativeChunksize { value: -1 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            PrepError::EmptyFile {
                path: PathBuf::from("a.csv")
            }
            .kind(),
            ErrorKind::EmptyInput
        );
        assert_eq!(
            PrepError::DistinctLengthMismatch {
                transform: "f".to_string(),
                input: 2,
                output: 1,
            }
            .kind(),
            ErrorKind::ContractViolation
        );
    }
}
