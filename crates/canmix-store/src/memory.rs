//! In-memory implementation of the KeyStore trait.
//!
//! This is primarily for testing. Same semantics as the file store but
//! nothing survives the process.

use std::sync::RwLock;

use async_trait::async_trait;

use canmix_core::KeyMaterial;

use crate::error::Result;
use crate::traits::KeyStore;

/// In-memory key store.
///
/// Thread-safe via RwLock; all state is lost on drop.
pub struct MemoryKeyStore {
    key: RwLock<Option<KeyMaterial>>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            key: RwLock::new(None),
        }
    }

    /// Create a store pre-seeded with a key, as if one had been
    /// persisted by a previous run.
    pub fn with_key(key: KeyMaterial) -> Self {
        Self {
            key: RwLock::new(Some(key)),
        }
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn read_last_key(&self) -> Result<Option<KeyMaterial>> {
        Ok(self.key.read().expect("lock poisoned").clone())
    }

    async fn write_last_key(&self, key: &KeyMaterial) -> Result<()> {
        *self.key.write().expect("lock poisoned") = Some(key.clone());
        Ok(())
    }
}
