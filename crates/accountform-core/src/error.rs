//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in storage operations.
///
/// Validation problems are not errors in this sense; they live in
/// [`AccountErrors`](crate::AccountErrors) and never surface as `Err`.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage key cannot be mapped onto the backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend-specific storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
