//! Error types for the engine.

use thiserror::Error;

/// Errors that can occur during engine operations.
///
/// Only [`EngineError::Config`] is fatal; everything else is reported
/// and the event loop continues.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration; the engine never constructs.
    #[error("configuration error: {0}")]
    Config(#[from] canmix_core::ConfigError),

    /// Bus transport failure.
    #[error("bus error: {0}")]
    Bus(String),

    /// Key channel transport failure.
    #[error("key channel error: {0}")]
    KeyChannel(String),

    /// Key store failure.
    #[error("key store error: {0}")]
    Store(#[from] canmix_store::StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
