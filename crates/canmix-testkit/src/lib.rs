//! # Canmix Testkit
//!
//! Testing utilities for canmix.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known accumulator inputs with expected wire
//!   digests for cross-platform verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up engine test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the wire digest format so independent peers can
//! check their accumulators against the same expectations:
//!
//! ```rust
//! use canmix_testkit::vectors::{all_vectors, digest_from_vector};
//!
//! for vector in all_vectors() {
//!     let wire = digest_from_vector(&vector);
//!     println!("{}: {}", vector.name, String::from_utf8_lossy(&wire));
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use canmix_testkit::generators::disjoint_pairs;
//!
//! proptest! {
//!     #[test]
//!     fn every_pair_registers(pairs in disjoint_pairs(8)) {
//!         prop_assert!(canmix_engine::ChannelRegistry::new(&pairs).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up engine scenarios over in-memory transports:
//!
//! ```rust,ignore
//! use canmix::Role;
//! use canmix_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let mut manager = fixture.manager(Role::Listener).await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{wire_digest, TestFixture};
pub use generators::{
    can_id, disjoint_pairs, frame_from_params, interleaving, key_material, payload, FrameParams,
};
pub use vectors::{all_vectors, digest_from_vector, verify_all_vectors, GoldenVector};
