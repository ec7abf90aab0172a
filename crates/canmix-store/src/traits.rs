//! KeyStore trait: the abstract interface for persisted key material.
//!
//! The engine persists the most recently rotated key so a restart
//! resumes with the key its peers are using, not the built-in default.
//! Implementations include a flat file (primary) and in-memory (tests).

use async_trait::async_trait;

use canmix_core::KeyMaterial;

use crate::error::Result;

/// Async interface for key persistence.
///
/// # Design Notes
///
/// - **Absence is not an error**: `read_last_key` returns `Ok(None)` when
///   no key has ever been persisted. An I/O failure on an existing key is
///   an error, and the engine treats it as fatal at construction.
/// - **Wholesale replacement**: `write_last_key` overwrites; there is no
///   key history.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Read the most recently persisted key, if any.
    async fn read_last_key(&self) -> Result<Option<KeyMaterial>>;

    /// Persist a key, replacing any previous one.
    async fn write_last_key(&self, key: &KeyMaterial) -> Result<()>;
}
