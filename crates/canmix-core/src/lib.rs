//! # Canmix Core
//!
//! Core primitives for the canmix correlation engine: strong identifier
//! and frame types, key material, engine configuration, and the
//! accumulator seam that the engine drives.
//!
//! Everything protocol-shaped (queues, dispatch, verification, the cycle
//! timer) lives in `canmix-engine`; persistence lives in `canmix-store`.

pub mod accum;
pub mod config;
pub mod error;
pub mod types;

pub use accum::{Accumulator, HmacAccumulator, DIGEST_LEN};
pub use config::{CycleConfig, EngineConfig, QueueConfig, DEFAULT_INITIAL_KEY};
pub use error::{ConfigError, Result};
pub use types::{CanFrame, CanId, ChannelPair, KeyMaterial, Role};
