//! Error types for the log store

use thiserror::Error;

/// Type alias for Results using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for store, ingestion and query operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A payload inside an ingest batch could not be decoded.
    /// The whole batch is rejected when this is returned.
    #[error("Malformed payload at index {index}: {reason}")]
    MalformedPayload {
        /// Position of the offending payload within the batch
        index: usize,
        /// Decoder message
        reason: String,
    },

    /// Query parameters that cannot be interpreted
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedPayload { .. } | StoreError::InvalidQuery(_)
        )
    }
}
