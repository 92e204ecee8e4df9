//! Error types for the dataset crate.
//!
//! Every failure while reading or validating a snapshot surfaces as a
//! `DataLoadError`. Loading happens once at startup, so these are fatal:
//! callers propagate them and exit rather than serving from a broken table.

use thiserror::Error;

/// Errors that can occur while loading and validating a snapshot
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a snapshot file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A user or movie id appeared more than once
    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: String, id: u32 },

    /// Snapshot-level validation failed after parsing
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
