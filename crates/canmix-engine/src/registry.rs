//! Channel registry: resolves a CAN identifier to its role in a
//! monitored channel pair.
//!
//! Built once at construction from the configured pairs; lookups are
//! O(1) hash probes with no per-call allocation.

use std::collections::HashMap;

use canmix_core::{CanId, ChannelPair, ConfigError};

/// Where an identifier falls within the monitored set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Data frame identifier of pair `i`.
    Data(usize),
    /// Digest frame identifier of pair `i`.
    Digest(usize),
    /// Not a monitored identifier; other bus traffic is expected and
    /// silently ignored.
    Unrelated,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Data(usize),
    Digest(usize),
}

/// Immutable identifier-to-pair index.
#[derive(Debug)]
pub struct ChannelRegistry {
    pairs: Vec<ChannelPair>,
    index: HashMap<u32, Slot>,
}

impl ChannelRegistry {
    /// Build a registry from configured pairs.
    ///
    /// Fails if any identifier appears more than once, in any position:
    /// the data-to-digest mapping must be a bijection.
    pub fn new(pairs: &[ChannelPair]) -> Result<Self, ConfigError> {
        if pairs.is_empty() {
            return Err(ConfigError::EmptyPairs);
        }

        let mut index = HashMap::with_capacity(pairs.len() * 2);
        for (i, pair) in pairs.iter().enumerate() {
            if index.insert(pair.data_id.raw(), Slot::Data(i)).is_some() {
                return Err(ConfigError::DuplicateId(pair.data_id));
            }
            if index.insert(pair.digest_id.raw(), Slot::Digest(i)).is_some() {
                return Err(ConfigError::DuplicateId(pair.digest_id));
            }
        }

        Ok(Self {
            pairs: pairs.to_vec(),
            index,
        })
    }

    /// Build from separate data and digest identifier lists, zipped
    /// positionally. Fails if the lists differ in length.
    pub fn from_id_lists(data: &[CanId], digest: &[CanId]) -> Result<Self, ConfigError> {
        if data.len() != digest.len() {
            return Err(ConfigError::MismatchedIdLists {
                data: data.len(),
                digest: digest.len(),
            });
        }
        let pairs: Vec<ChannelPair> = data
            .iter()
            .zip(digest.iter())
            .map(|(&d, &g)| ChannelPair::new(d, g))
            .collect();
        Self::new(&pairs)
    }

    /// Classify an identifier. O(1), no allocation.
    pub fn classify(&self, id: CanId) -> Classification {
        match self.index.get(&id.raw()) {
            Some(Slot::Data(i)) => Classification::Data(*i),
            Some(Slot::Digest(i)) => Classification::Digest(*i),
            None => Classification::Unrelated,
        }
    }

    /// Number of monitored pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pairs are monitored (never true post-construction).
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pair at a given index.
    ///
    /// Indices come from [`Classification`] or validated configuration,
    /// so they are always in range.
    pub fn pair(&self, i: usize) -> ChannelPair {
        self.pairs[i]
    }

    /// All monitored pairs, in configuration order.
    pub fn pairs(&self) -> &[ChannelPair] {
        &self.pairs
    }
}
