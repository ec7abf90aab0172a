//! Golden accumulator vectors.
//!
//! Known key/insert combinations with their expected wire digests.
//! Independent implementations on other nodes must reproduce these
//! exactly, so any change here is a wire-format change.

use canmix_core::{Accumulator, HmacAccumulator, KeyMaterial, DEFAULT_INITIAL_KEY};

/// A known accumulator input with its expected hex wire digest.
pub struct GoldenVector {
    /// Human-readable vector name.
    pub name: &'static str,
    /// Key material seeding the accumulator.
    pub key: &'static [u8],
    /// Payloads inserted, in order.
    pub inserts: &'static [&'static [u8]],
    /// Expected wire digest (lowercase hex of the raw digest).
    pub expected_hex: &'static str,
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "default-key-empty",
            key: DEFAULT_INITIAL_KEY,
            inserts: &[],
            expected_hex: "58e72564ab8957b50b2854bef88bbc307a8c99ba8c2fa24d471c5b11a784fc0c",
        },
        GoldenVector {
            name: "default-key-cycle-payload",
            key: DEFAULT_INITIAL_KEY,
            inserts: &[&[0xFF; 6]],
            expected_hex: "7afb28b73be7b410da081e9e93a0fcd585faf98ce51733aacd32479f647bb796",
        },
        GoldenVector {
            name: "default-key-hello",
            key: DEFAULT_INITIAL_KEY,
            inserts: &[b"hello"],
            expected_hex: "2b9795b02a9ba8bb605d77df08e5bf44845471c3c9dc79317b5e96b6d8ae5c55",
        },
        GoldenVector {
            name: "default-key-split-inserts",
            key: DEFAULT_INITIAL_KEY,
            inserts: &[b"ab", b"cd"],
            expected_hex: "a0bf5f101c47027455192b931c3664faeb86f74c5d221085eff10f6f3b65690c",
        },
        GoldenVector {
            name: "rotated-key-cycle-payload",
            key: b"rotated-material",
            inserts: &[&[0xFF; 6]],
            expected_hex: "c6c0e5ac45a5e9d841aa9792d6e1437f9965bb047c41ffdd46e73587c32d22d0",
        },
    ]
}

/// Run a vector's inserts through a fresh accumulator and return the
/// wire digest bytes (the ASCII hex form, as transmitted on the bus).
pub fn digest_from_vector(vector: &GoldenVector) -> Vec<u8> {
    let mut accum = HmacAccumulator::new(KeyMaterial::from_bytes(vector.key));
    for insert in vector.inserts {
        accum.insert(insert);
    }
    hex::encode(accum.encode()).into_bytes()
}

/// Check every vector against the accumulator implementation.
///
/// Returns the names of any vectors that failed.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .iter()
        .filter(|v| digest_from_vector(v) != v.expected_hex.as_bytes())
        .map(|v| v.name)
        .collect()
}
