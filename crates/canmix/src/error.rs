//! Error types for the manager facade.

use thiserror::Error;

/// Errors from the manager lifecycle.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Engine-level error, configuration errors included.
    #[error(transparent)]
    Engine(#[from] canmix_engine::EngineError),

    /// `start` was called while the engine was already running.
    #[error("engine already running")]
    AlreadyRunning,

    /// `stop` was called while the engine was not running.
    #[error("engine not running")]
    NotRunning,

    /// The engine task panicked or was cancelled.
    #[error("engine task failed: {0}")]
    TaskJoin(String),
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, ManagerError>;
