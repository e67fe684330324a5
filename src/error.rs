//! Error types for the batch loader.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Errors that abort a job run.
///
/// Every variant is fatal: the orchestrator never retries or skips.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input resource could not be opened
    #[error("Cannot open input resource {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A quoted field was never closed, so the record ran past its line
    #[error("Record starting at line {row} is not terminated on its line (unclosed quote)")]
    UnterminatedRecord { row: u64 },

    /// A numeric column could not be converted
    #[error("Invalid value {value:?} for field '{field}' at line {row}")]
    FieldConversion {
        row: u64,
        field: &'static str,
        value: String,
    },

    /// The transaction date did not match `dd/MM/yyyy-HH:mm`
    #[error("Unparseable transaction date {value:?} at line {row}")]
    DateParse { row: u64, value: String },

    /// A column required by a later stage was absent from the line
    #[error("Missing field '{field}' at line {row}")]
    MissingField { row: u64, field: &'static str },

    /// The sink could not be opened or rejected a chunk
    #[error("Transaction sink error: {0}")]
    Sink(#[from] SinkError),

    /// Job metadata could not be read or recorded
    #[error("Job repository error: {0}")]
    Repository(#[from] rusqlite::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error outside of opening the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No input file was configured
    #[error("Missing input file argument. Usage: bank-batch-loader <input.csv> [database.db]")]
    MissingArgument,
}

/// Errors raised by a [`TransactionSink`](crate::sink::TransactionSink).
#[derive(Error, Debug)]
pub enum SinkError {
    /// A record's id already exists in the sink or earlier in the same chunk
    #[error("duplicate transaction id {id}")]
    DuplicateKey { id: i64 },

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
