//! Unified error type for the budget ledger.
//!
//! Store and engine functions return [`Result`]. Resolution, validation and
//! referential failures are caller-recoverable and never leave partial writes
//! behind; [`Error::Database`] covers every connectivity or query failure.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A name or id did not resolve to a stored record.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"category"`)
        kind: &'static str,
        /// The name, code or id that failed to resolve
        name: String,
    },

    /// Input could not be parsed or is out of range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the problem
        message: String,
    },

    /// The operation is blocked by dependent or duplicate rows.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable description of the conflict
        message: String,
    },

    /// Storage failure (connection, query or constraint error).
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A newer report request for the same key replaced this one.
    #[error("Report request superseded by a newer request")]
    Superseded,

    /// A report task failed outside of normal error propagation.
    #[error("Report worker error: {message}")]
    Worker {
        /// Description of the task failure
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
