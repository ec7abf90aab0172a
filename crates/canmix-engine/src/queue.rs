//! Per-pair receive queues.
//!
//! Each monitored pair has one queue of unconsumed data payloads and one
//! of unconsumed digest payloads. Pairing is strictly FIFO per channel:
//! the k-th popped data entry pairs with the k-th popped digest entry.
//! There is no timestamp or sequence correlation, so frames that overtake
//! each other can pair out of causal order. That is an accepted
//! approximation, not exact causal pairing.
//!
//! Queues are bounded: a push that would exceed the configured depth
//! evicts the oldest entry, so peers that never complete a pairing cannot
//! grow memory without bound.

use std::collections::VecDeque;

use canmix_core::QueueConfig;

/// A bounded FIFO of frame payloads with oldest-drop eviction.
#[derive(Debug)]
pub struct BoundedQueue {
    entries: VecDeque<Vec<u8>>,
    max_depth: usize,
    evicted: u64,
}

impl BoundedQueue {
    /// Create an empty queue with the given depth bound.
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_depth,
            evicted: 0,
        }
    }

    /// Push a payload, evicting the oldest entry if at capacity.
    ///
    /// Returns the evicted payload, if any.
    pub fn push(&mut self, payload: Vec<u8>) -> Option<Vec<u8>> {
        let evicted = if self.entries.len() >= self.max_depth {
            self.entries.pop_front()
        } else {
            None
        };
        if evicted.is_some() {
            self.evicted += 1;
        }
        self.entries.push_back(payload);
        evicted
    }

    /// Pop the oldest entry.
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.entries.pop_front()
    }

    /// Current queue depth.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries evicted since construction.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

/// The two queues of one monitored pair.
#[derive(Debug)]
pub struct PairQueues {
    /// Unconsumed data frame payloads.
    pub data: BoundedQueue,
    /// Unconsumed digest frame payloads.
    pub digest: BoundedQueue,
}

impl PairQueues {
    fn new(max_depth: usize) -> Self {
        Self {
            data: BoundedQueue::new(max_depth),
            digest: BoundedQueue::new(max_depth),
        }
    }

    /// Whether both sides hold at least one entry, i.e. a verification
    /// attempt can consume a pairing.
    pub fn ready(&self) -> bool {
        !self.data.is_empty() && !self.digest.is_empty()
    }
}

/// All receive queues, indexed by pair.
#[derive(Debug)]
pub struct ReceiveQueues {
    pairs: Vec<PairQueues>,
}

impl ReceiveQueues {
    /// Create empty queues for `pair_count` pairs.
    pub fn new(pair_count: usize, config: &QueueConfig) -> Self {
        Self {
            pairs: (0..pair_count)
                .map(|_| PairQueues::new(config.max_depth))
                .collect(),
        }
    }

    /// The queues for pair `i`. Indices come from the channel registry,
    /// so they are always in range.
    pub fn pair_mut(&mut self, i: usize) -> &mut PairQueues {
        &mut self.pairs[i]
    }

    /// Immutable access for inspection.
    pub fn pair(&self, i: usize) -> &PairQueues {
        &self.pairs[i]
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs (never true post-construction).
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = BoundedQueue::new(8);
        q.push(vec![1]);
        q.push(vec![2]);
        q.push(vec![3]);
        assert_eq!(q.pop(), Some(vec![1]));
        assert_eq!(q.pop(), Some(vec![2]));
        assert_eq!(q.pop(), Some(vec![3]));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut q = BoundedQueue::new(2);
        assert_eq!(q.push(vec![1]), None);
        assert_eq!(q.push(vec![2]), None);
        assert_eq!(q.push(vec![3]), Some(vec![1]));
        assert_eq!(q.len(), 2);
        assert_eq!(q.evicted(), 1);
        assert_eq!(q.pop(), Some(vec![2]));
    }

    #[test]
    fn test_ready_requires_both_sides() {
        let mut queues = ReceiveQueues::new(1, &QueueConfig { max_depth: 4 });
        assert!(!queues.pair(0).ready());

        queues.pair_mut(0).data.push(vec![0xAA]);
        assert!(!queues.pair(0).ready());

        queues.pair_mut(0).digest.push(vec![0xBB]);
        assert!(queues.pair(0).ready());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn depth_never_exceeds_bound(
                max_depth in 1usize..16,
                pushes in proptest::collection::vec(any::<u8>(), 0..64),
            ) {
                let mut q = BoundedQueue::new(max_depth);
                for byte in pushes {
                    q.push(vec![byte]);
                    prop_assert!(q.len() <= max_depth);
                }
            }

            #[test]
            fn survivors_are_the_newest_in_order(
                max_depth in 1usize..8,
                pushes in proptest::collection::vec(any::<u8>(), 1..32),
            ) {
                let mut q = BoundedQueue::new(max_depth);
                for &byte in &pushes {
                    q.push(vec![byte]);
                }
                let start = pushes.len().saturating_sub(max_depth);
                for &expected in &pushes[start..] {
                    prop_assert_eq!(q.pop(), Some(vec![expected]));
                }
                prop_assert_eq!(q.pop(), None);
                prop_assert_eq!(q.evicted(), start as u64);
            }
        }
    }
}
