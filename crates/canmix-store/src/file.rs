//! Flat-file implementation of the KeyStore trait.
//!
//! The key lives in a single file as raw bytes, replaced atomically on
//! rotation by writing a sibling temp file and renaming it into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use canmix_core::KeyMaterial;

use crate::error::{Result, StoreError};
use crate::traits::KeyStore;

/// File-backed key store.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    /// Create a store backed by the given path.
    ///
    /// The file does not need to exist yet; it is created on the first
    /// [`write_last_key`](KeyStore::write_last_key).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn read_last_key(&self) -> Result<Option<KeyMaterial>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Err(StoreError::InvalidKey(format!(
                        "{} is empty",
                        self.path.display()
                    )));
                }
                Ok(Some(KeyMaterial::from_bytes(bytes)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_last_key(&self, key: &KeyMaterial) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, key.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "persisted rotated key");
        Ok(())
    }
}
