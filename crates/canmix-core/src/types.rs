//! Strong type definitions for canmix.
//!
//! Identifiers and key material are newtypes to prevent misuse at
//! compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CAN arbitration identifier.
///
/// Standard identifiers are 11 bits, extended identifiers 29 bits.
/// The newtype does not restrict the range; [`CanId::is_extended_range`]
/// reports whether the value exceeds the standard range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanId(pub u32);

impl CanId {
    /// Maximum value of a standard (11-bit) identifier.
    pub const MAX_STANDARD: u32 = 0x7FF;
    /// Maximum value of an extended (29-bit) identifier.
    pub const MAX_EXTENDED: u32 = 0x1FFF_FFFF;

    /// Create a new identifier from a raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value.
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Whether this identifier needs the extended (29-bit) format.
    pub const fn is_extended_range(&self) -> bool {
        self.0 > Self::MAX_STANDARD
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, std::num::ParseIntError> {
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        u32::from_str_radix(s, 16).map(Self)
    }
}

impl fmt::Debug for CanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanId({:#x})", self.0)
    }
}

impl fmt::Display for CanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for CanId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// A single CAN frame as seen by the engine.
///
/// The engine does not enforce link-layer payload limits; that is the
/// bus implementation's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    /// Arbitration identifier.
    pub id: CanId,
    /// Frame payload bytes.
    pub payload: Vec<u8>,
    /// Whether the frame uses the extended identifier format.
    pub extended: bool,
}

impl CanFrame {
    /// Create a frame, deriving the extended flag from the identifier.
    pub fn new(id: CanId, payload: Vec<u8>) -> Self {
        Self {
            extended: id.is_extended_range(),
            id,
            payload,
        }
    }

    /// Create a frame with an explicit extended flag.
    pub fn with_extended(id: CanId, payload: Vec<u8>, extended: bool) -> Self {
        Self { id, payload, extended }
    }
}

/// A monitored `(data frame id, digest frame id)` identifier tuple.
///
/// The configured set of pairs must be a bijection: an identifier may
/// appear in at most one pair, and never on both sides. This is
/// validated at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    /// Identifier carrying application data frames.
    pub data_id: CanId,
    /// Identifier carrying the companion digest frames.
    pub digest_id: CanId,
}

impl ChannelPair {
    /// Create a new pair.
    pub const fn new(data_id: CanId, digest_id: CanId) -> Self {
        Self { data_id, digest_id }
    }
}

/// Operating mode of one engine instance. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Emits a correlated data/digest pair on a timed cycle.
    Sender,
    /// Queues inbound frames and verifies each completed pairing.
    Listener,
    /// A listener that also re-sends: verifies completed pairings and
    /// answers inbound data frames with the matching digest frame.
    Verifier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "sender"),
            Role::Listener => write!(f, "listener"),
            Role::Verifier => write!(f, "verifier"),
        }
    }
}

/// Shared secret material seeding the accumulator.
///
/// Exactly one value is live at any instant; rotation replaces it
/// wholesale. `Debug` deliberately redacts the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.0.len())
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
