//! Error types for canmix core.

use thiserror::Error;

use crate::types::CanId;

/// Configuration errors. All of these are fatal at construction; the
/// engine never starts with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The data and digest identifier lists differ in length.
    #[error("identifier lists differ in length: {data} data ids, {digest} digest ids")]
    MismatchedIdLists { data: usize, digest: usize },

    /// An identifier appears in more than one position across the pairs.
    #[error("duplicate identifier {0} in channel pair configuration")]
    DuplicateId(CanId),

    /// No channel pairs were configured.
    #[error("no channel pairs configured")]
    EmptyPairs,

    /// Sender role configured without a cycle section.
    #[error("sender role requires a cycle configuration")]
    MissingCycle,

    /// The cycle period must be non-zero.
    #[error("cycle period must be non-zero")]
    ZeroCyclePeriod,

    /// The receive queue depth bound must be non-zero.
    #[error("queue depth must be non-zero")]
    ZeroQueueDepth,

    /// The cycle's emitting pair index is out of range.
    #[error("cycle pair index {pair} out of range for {pairs} configured pairs")]
    CyclePairOutOfRange { pair: usize, pairs: usize },

    /// The configured initial key is empty.
    #[error("initial key material is empty")]
    EmptyInitialKey,

    /// A persisted key exists but could not be read.
    #[error("persisted key unreadable: {0}")]
    KeyUnreadable(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
