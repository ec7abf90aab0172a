//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: one set of in-memory
//! transports plus builders for engines and managers wired to them.

use std::sync::Arc;

use canmix::{Manager, Role};
use canmix_core::{
    Accumulator, CanFrame, CanId, ChannelPair, EngineConfig, HmacAccumulator, KeyMaterial,
};
use canmix_engine::{Engine, MemoryBus, MemoryKeyChannel};
use canmix_store::MemoryKeyStore;

/// A test fixture with in-memory transports and a key store.
pub struct TestFixture {
    pub bus: Arc<MemoryBus>,
    pub keychan: Arc<MemoryKeyChannel>,
    pub keystore: Arc<MemoryKeyStore>,
    pub pairs: Vec<ChannelPair>,
}

impl TestFixture {
    /// Create a fixture monitoring the single pair `0x100`/`0x101`.
    pub fn new() -> Self {
        Self::with_pairs(vec![ChannelPair::new(CanId::new(0x100), CanId::new(0x101))])
    }

    /// Create a fixture monitoring the given pairs.
    pub fn with_pairs(pairs: Vec<ChannelPair>) -> Self {
        Self {
            bus: Arc::new(MemoryBus::new()),
            keychan: Arc::new(MemoryKeyChannel::new()),
            keystore: Arc::new(MemoryKeyStore::new()),
            pairs,
        }
    }

    /// Seed the key store with a persisted key, as if a previous run
    /// had rotated to it.
    pub fn with_stored_key(self, key: KeyMaterial) -> Self {
        Self {
            keystore: Arc::new(MemoryKeyStore::with_key(key)),
            ..self
        }
    }

    /// Default configuration for the given role over this fixture's pairs.
    pub fn config(&self, role: Role) -> EngineConfig {
        EngineConfig::new(role, self.pairs.clone())
    }

    /// Build an engine for the given role, wired to the fixture's
    /// transports.
    pub async fn engine(
        &self,
        role: Role,
    ) -> Engine<HmacAccumulator, MemoryBus, MemoryKeyChannel, MemoryKeyStore> {
        let config = self.config(role);
        let accum = HmacAccumulator::new(config.initial_key.clone());
        Engine::new(
            config,
            accum,
            Arc::clone(&self.bus),
            Arc::clone(&self.keychan),
            Arc::clone(&self.keystore),
        )
        .await
        .expect("fixture config is valid")
    }

    /// Build a manager for the given role, wired to the fixture's
    /// transports.
    pub async fn manager(
        &self,
        role: Role,
    ) -> Manager<HmacAccumulator, MemoryBus, MemoryKeyChannel, MemoryKeyStore> {
        let config = self.config(role);
        let accum = HmacAccumulator::new(config.initial_key.clone());
        Manager::new(
            config,
            accum,
            Arc::clone(&self.bus),
            Arc::clone(&self.keychan),
            Arc::clone(&self.keystore),
        )
        .await
        .expect("fixture config is valid")
    }

    /// A data frame on the given pair's data identifier.
    pub fn data_frame(&self, pair: usize, payload: &[u8]) -> CanFrame {
        CanFrame::new(self.pairs[pair].data_id, payload.to_vec())
    }

    /// The digest frame a well-behaved peer would send on the given
    /// pair after one data frame carrying `data` under `key`.
    pub fn digest_frame(&self, pair: usize, key: &KeyMaterial, data: &[u8]) -> CanFrame {
        CanFrame::new(self.pairs[pair].digest_id, wire_digest(key, data))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The hex wire digest for a single `data` insert under `key`.
pub fn wire_digest(key: &KeyMaterial, data: &[u8]) -> Vec<u8> {
    let mut accum = HmacAccumulator::new(key.clone());
    accum.insert(data);
    hex::encode(accum.encode()).into_bytes()
}
