//! # Canmix Store
//!
//! Key persistence for the canmix engine. The engine keeps exactly one
//! live key; this crate abstracts where the last rotated key is kept
//! between runs behind the [`KeyStore`] trait.
//!
//! ## Key Types
//!
//! - [`KeyStore`] - The async trait for key persistence
//! - [`FileKeyStore`] - Flat-file backed storage (primary)
//! - [`MemoryKeyStore`] - In-memory storage for tests

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;
pub use traits::KeyStore;
