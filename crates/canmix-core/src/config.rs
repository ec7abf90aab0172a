//! Engine configuration.
//!
//! The embedding process resolves its own configuration sources (files,
//! environment, CLI) into these structs; the engine only sees the fully
//! resolved values and validates them at construction.

use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::{ChannelPair, KeyMaterial, Role};

/// Built-in key material used until the first rotation when no key has
/// been persisted yet.
pub const DEFAULT_INITIAL_KEY: &[u8] = b"e179017a-62b0-4996-8a38-e91aa9f1";

/// Cycle behavior for the sender role.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Inter-cycle gap, measured from each firing instant.
    pub period: Duration,
    /// Payload of the data frame emitted each cycle.
    pub payload: Vec<u8>,
    /// Index of the channel pair the cycle emits on.
    pub pair: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            payload: vec![0xFF; 6],
            pair: 0,
        }
    }
}

/// Bounds on the per-pair receive queues.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum entries per queue direction; the oldest entry is dropped
    /// when a push would exceed this.
    pub max_depth: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Fully resolved engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Operating role, fixed for the engine's lifetime.
    pub role: Role,
    /// Monitored channel pairs.
    pub pairs: Vec<ChannelPair>,
    /// Key material used when no persisted key exists.
    pub initial_key: KeyMaterial,
    /// Cycle configuration; required for the sender role.
    pub cycle: Option<CycleConfig>,
    /// Receive queue bounds.
    pub queue: QueueConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults for the given role and pairs.
    pub fn new(role: Role, pairs: Vec<ChannelPair>) -> Self {
        Self {
            role,
            pairs,
            initial_key: KeyMaterial::from_bytes(DEFAULT_INITIAL_KEY),
            cycle: match role {
                Role::Sender => Some(CycleConfig::default()),
                _ => None,
            },
            queue: QueueConfig::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// Identifier bijection checks live in the channel registry; this
    /// covers everything else that must be fatal before start.
    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(ConfigError::EmptyPairs);
        }
        if self.initial_key.is_empty() {
            return Err(ConfigError::EmptyInitialKey);
        }
        if self.queue.max_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        if self.role == Role::Sender {
            let cycle = self.cycle.as_ref().ok_or(ConfigError::MissingCycle)?;
            if cycle.period.is_zero() {
                return Err(ConfigError::ZeroCyclePeriod);
            }
            if cycle.pair >= self.pairs.len() {
                return Err(ConfigError::CyclePairOutOfRange {
                    pair: cycle.pair,
                    pairs: self.pairs.len(),
                });
            }
        }
        Ok(())
    }
}
