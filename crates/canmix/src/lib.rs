//! # Canmix
//!
//! Frame correlation for CAN buses carrying paired data/digest traffic.
//!
//! ## Overview
//!
//! Peer nodes prove they produced a data frame by following it with a
//! keyed digest frame on a companion identifier. This crate wires the
//! correlation engine to its collaborators and manages its lifecycle:
//!
//! - a [`Manager`] owns one [`Engine`] instance and its transports,
//! - `start()` connects the key channel, starts the bus, and spawns the
//!   engine's event loop,
//! - `stop()` shuts the loop down with queue state intact, so a later
//!   `start()` resumes where it left off.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use canmix::{Manager, EngineConfig, Role, ChannelPair, CanId, HmacAccumulator};
//! use canmix_engine::{MemoryBus, MemoryKeyChannel};
//! use canmix_store::FileKeyStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = EngineConfig::new(
//!         Role::Listener,
//!         vec![ChannelPair::new(CanId::new(0x100), CanId::new(0x101))],
//!     );
//!     let accum = HmacAccumulator::new(config.initial_key.clone());
//!
//!     // Swap in real transports in production.
//!     let bus = Arc::new(MemoryBus::new());
//!     let keychan = Arc::new(MemoryKeyChannel::new());
//!     let keystore = Arc::new(FileKeyStore::new("/var/lib/canmix/last.key"));
//!
//!     let mut manager = Manager::new(config, accum, bus, keychan, keystore).await?;
//!     manager.start().await?;
//!     // ... run until shutdown is requested ...
//!     manager.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod manager;

pub use error::{ManagerError, Result};
pub use manager::Manager;

// Re-export the working surface of the underlying crates.
pub use canmix_core::{
    Accumulator, CanFrame, CanId, ChannelPair, ConfigError, CycleConfig, EngineConfig,
    HmacAccumulator, KeyMaterial, QueueConfig, Role, DIGEST_LEN,
};
pub use canmix_engine::{
    BusChannel, Classification, CycleState, Engine, EngineError, EngineStats, KeyChannel,
    DIAG_DIGEST_FORMAT, DIAG_DIGEST_MISMATCH, LOG_TOPIC,
};
pub use canmix_store::{FileKeyStore, KeyStore, MemoryKeyStore, StoreError};
