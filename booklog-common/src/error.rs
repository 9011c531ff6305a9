//! Common error types for booklog

use crate::validate::ValidationErrors;
use thiserror::Error;

/// Common result type for booklog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the repository, pipeline, and handlers.
///
/// Handlers classify by variant: `Validation` re-renders the submitted form
/// with field errors, `NotFound` renders the not-found page, everything else
/// is reported as a generic internal failure.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more field-level input errors (recoverable)
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Unknown id, or a record not owned by the requester.
    /// The two cases are intentionally indistinguishable.
    #[error("not found: {0}")]
    NotFound(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed CSV input (row/column-count mismatch, unreadable records)
    #[error("{0}")]
    Format(String),

    /// An import error decorated with the 1-indexed offending data row.
    /// The underlying variant stays reachable through `source`.
    #[error("row {row}: {source}")]
    CsvRow {
        row: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an import error with the 1-indexed data row it occurred on.
    pub fn at_csv_row(self, row: usize) -> Error {
        Error::CsvRow {
            row,
            source: Box::new(self),
        }
    }

    /// The validation errors carried by this error, if any.
    ///
    /// Looks through the CSV row decoration so import callers can still
    /// re-render field errors.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(v) => Some(v),
            Error::CsvRow { source, .. } => source.validation_errors(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Validator;

    #[test]
    fn test_csv_row_decoration_preserves_source() {
        let mut v = Validator::new();
        v.presence("title", "");
        let err = Error::Validation(v.errors().unwrap()).at_csv_row(2);

        assert!(err.to_string().starts_with("row 2: "));
        assert!(err.validation_errors().is_some());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("book 7".to_string());
        assert_eq!(err.to_string(), "not found: book 7");
    }
}
