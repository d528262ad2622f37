//! Error types for the medinv-core library.
//!
//! Extraction and date normalization never fail: a missing field is an empty
//! value, not an error. Errors only arise at the persistence boundary.

use thiserror::Error;

/// Main error type for the medinv library.
#[derive(Error, Debug)]
pub enum MedinvError {
    /// A submitted record was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Inventory storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a medication payload is rejected at the storage boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload was not a JSON object.
    #[error("invalid JSON payload: {0}")]
    Payload(String),

    /// A text field is shorter or longer than allowed.
    #[error("{field} must be between {min} and {max} chars")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// The expiry date could not be normalized to a calendar date.
    #[error("expiryDate must be a valid date")]
    ExpiryDate,
}

/// Errors raised by inventory stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No medication with the given id exists.
    #[error("medication {0} not found")]
    NotFound(i64),

    /// A stored row could not be read back.
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    /// SQLite failure.
    #[cfg(feature = "native")]
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for the medinv library.
pub type Result<T> = std::result::Result<T, MedinvError>;
