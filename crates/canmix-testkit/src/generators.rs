//! Proptest generators for canmix types.
//!
//! Strategies for property-based testing of identifier classification,
//! queueing, and accumulator behavior.

use proptest::collection::hash_set;
use proptest::prelude::*;

use canmix_core::{CanFrame, CanId, ChannelPair, KeyMaterial};

/// Strategy for a standard-range (11-bit) identifier.
pub fn can_id() -> impl Strategy<Value = CanId> {
    (0u32..=CanId::MAX_STANDARD).prop_map(CanId::new)
}

/// Strategy for an extended-range (29-bit) identifier.
pub fn extended_can_id() -> impl Strategy<Value = CanId> {
    (CanId::MAX_STANDARD + 1..=CanId::MAX_EXTENDED).prop_map(CanId::new)
}

/// Strategy for a classic-CAN-sized payload (0 to 8 bytes).
pub fn payload() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=8)
}

/// Strategy for non-empty key material, 1 to 64 bytes.
pub fn key_material() -> impl Strategy<Value = KeyMaterial> {
    proptest::collection::vec(any::<u8>(), 1..=64).prop_map(KeyMaterial::from_bytes)
}

/// Strategy for a list of channel pairs with pairwise-distinct
/// identifiers, 1 to `max_pairs` pairs.
///
/// Draws `2n` distinct identifiers and zips them into pairs, so the
/// result always satisfies the bijection the registry requires.
pub fn disjoint_pairs(max_pairs: usize) -> impl Strategy<Value = Vec<ChannelPair>> {
    (1..=max_pairs).prop_flat_map(|n| {
        hash_set(0u32..=CanId::MAX_STANDARD, 2 * n).prop_map(|ids| {
            let ids: Vec<u32> = ids.into_iter().collect();
            ids.chunks(2)
                .map(|c| ChannelPair::new(CanId::new(c[0]), CanId::new(c[1])))
                .collect()
        })
    })
}

/// Strategy for an arrival order merging `data_count` data frames with
/// `digest_count` digest frames; `true` draws the next data frame.
///
/// Each stream stays internally ordered, so the result models any
/// interleaving a bus could deliver for FIFO-paired traffic.
pub fn interleaving(data_count: usize, digest_count: usize) -> impl Strategy<Value = Vec<bool>> {
    let total = data_count + digest_count;
    proptest::sample::subsequence((0..total).collect::<Vec<usize>>(), data_count).prop_map(
        move |data_slots| {
            let mut order = vec![false; total];
            for slot in data_slots {
                order[slot] = true;
            }
            order
        },
    )
}

/// Parameters for generating an arbitrary frame.
#[derive(Debug, Clone)]
pub struct FrameParams {
    pub id: CanId,
    pub payload: Vec<u8>,
}

impl Arbitrary for FrameParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (can_id(), payload())
            .prop_map(|(id, payload)| FrameParams { id, payload })
            .boxed()
    }
}

/// Build a frame from generated parameters.
pub fn frame_from_params(params: &FrameParams) -> CanFrame {
    CanFrame::new(params.id, params.payload.clone())
}
