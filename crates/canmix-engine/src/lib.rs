//! # Canmix Engine
//!
//! The correlation and transmission-cycle engine for paired CAN
//! data/digest frames.
//!
//! ## Overview
//!
//! A bus carries many unrelated frames; this engine decides which
//! received frames belong together, in what order, and what to do when
//! they do or do not verify. Each monitored channel is a
//! `(data id, digest id)` identifier pair. Depending on its role, one
//! engine instance either:
//!
//! - emits a correlated data/digest pair on a timed cycle (`Sender`),
//! - queues inbound frames per pair and verifies completed pairings
//!   FIFO (`Listener`), or
//! - does the same while also answering each inbound data frame with
//!   its digest frame (`Verifier`).
//!
//! ## Event model
//!
//! The transports deliver inbound traffic through awaitable `recv`
//! methods rather than callbacks; the engine drains them, together with
//! the cycle deadline, from one `select!` loop. Single-task ownership
//! of the queues, the key, and the accumulator gives the atomicity the
//! protocol needs without locks.
//!
//! ## Key Types
//!
//! - [`Engine`] - The event loop and all protocol state
//! - [`ChannelRegistry`] / [`Classification`] - Identifier resolution
//! - [`ReceiveQueues`] - Bounded per-pair FIFO buffers
//! - [`CycleTimer`] / [`CycleState`] - The sender's firing schedule
//! - [`BusChannel`] / [`KeyChannel`] - Transport seams with in-memory
//!   test implementations

pub mod bus;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod keychan;
pub mod queue;
pub mod registry;

pub use bus::{memory::MemoryBus, BusChannel};
pub use cycle::{CycleState, CycleTimer};
pub use engine::{Engine, EngineStats, DIAG_DIGEST_FORMAT, DIAG_DIGEST_MISMATCH};
pub use error::{EngineError, Result};
pub use keychan::{memory::MemoryKeyChannel, KeyChannel, LOG_TOPIC};
pub use queue::{BoundedQueue, PairQueues, ReceiveQueues};
pub use registry::{ChannelRegistry, Classification};
