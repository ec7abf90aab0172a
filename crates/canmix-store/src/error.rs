//! Error types for the key store module.

use thiserror::Error;

/// Errors that can occur during key store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reading or writing the key file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored key exists but is empty or otherwise unusable.
    #[error("invalid stored key: {0}")]
    InvalidKey(String),
}

/// Result type for key store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
