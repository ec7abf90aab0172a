//! The accumulator seam: the stateful digest object the engine drives.
//!
//! The engine treats the digest primitive as an external collaborator
//! with a fixed interface. The accumulator is not reentrant: a
//! [`Accumulator::reset`] must occur between logically unrelated uses,
//! which the engine enforces by resetting after every pairing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::KeyMaterial;

/// Length in bytes of the digests produced by [`HmacAccumulator`].
pub const DIGEST_LEN: usize = 32;

/// Stateful cryptographic digest object.
///
/// Usage discipline, enforced by the engine:
/// 1. zero or more [`insert`](Accumulator::insert) calls,
/// 2. one [`encode`](Accumulator::encode) or
///    [`verify`](Accumulator::verify),
/// 3. an unconditional [`reset`](Accumulator::reset).
///
/// [`reseed`](Accumulator::reseed) installs rotated key material; the
/// engine calls it before the first insert that follows a rotation.
pub trait Accumulator: Send + Sync {
    /// Absorb a payload into the current digest state.
    fn insert(&mut self, payload: &[u8]);

    /// Produce the digest over everything inserted since the last reset.
    fn encode(&self) -> Vec<u8>;

    /// Check a received digest against the current state.
    ///
    /// Must fail closed: anything unverifiable (wrong length included)
    /// returns `false`.
    fn verify(&self, digest: &[u8]) -> bool;

    /// Discard all inserted state, keeping the current key.
    fn reset(&mut self);

    /// Replace the key material and discard all inserted state.
    fn reseed(&mut self, key: &KeyMaterial);
}

type HmacSha256 = Hmac<Sha256>;

/// Reference accumulator: HMAC-SHA256 over the concatenation of all
/// inserted payloads.
pub struct HmacAccumulator {
    key: KeyMaterial,
    mac: HmacSha256,
}

impl HmacAccumulator {
    /// Create a new accumulator seeded with the given key.
    pub fn new(key: KeyMaterial) -> Self {
        let mac = Self::mac_for(&key);
        Self { key, mac }
    }

    fn mac_for(key: &KeyMaterial) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(key.as_bytes()).expect("hmac accepts any key length")
    }
}

impl Accumulator for HmacAccumulator {
    fn insert(&mut self, payload: &[u8]) {
        self.mac.update(payload);
    }

    fn encode(&self) -> Vec<u8> {
        self.mac.clone().finalize().into_bytes().to_vec()
    }

    fn verify(&self, digest: &[u8]) -> bool {
        if digest.len() != DIGEST_LEN {
            return false;
        }
        self.mac.clone().verify_slice(digest).is_ok()
    }

    fn reset(&mut self) {
        self.mac = Self::mac_for(&self.key);
    }

    fn reseed(&mut self, key: &KeyMaterial) {
        self.key = key.clone();
        self.reset();
    }
}
