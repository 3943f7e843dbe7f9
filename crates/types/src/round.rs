// Path: crates/types/src/round.rs
use std::collections::BTreeMap;
use std::time::Instant;

/// A node's role at a given height, derived from `height mod n == i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Proposer,
    Signer,
}

/// Mutable state for exactly one height, reset whenever the coordinator
/// moves on (either by finishing the round or by observing the tip advance
/// past `height`).
#[derive(Debug, Clone)]
pub struct RoundState {
    pub height: u64,
    pub role: NodeRole,
    /// The serialized candidate block being voted on, once known.
    pub candidate_hex: Option<String>,
    /// Partial signatures collected so far, keyed by contributing node
    /// index. Only populated at the proposer. Duplicate insertion from the
    /// same index is idempotent: last write wins, but only after the new
    /// signature has itself verified.
    pub partial_sigs: BTreeMap<u32, Vec<u8>>,
    /// Monotonic instant at which this round is abandoned.
    pub deadline: Instant,
}

impl RoundState {
    pub fn new(height: u64, role: NodeRole, deadline: Instant) -> Self {
        Self {
            height,
            role,
            candidate_hex: None,
            partial_sigs: BTreeMap::new(),
            deadline,
        }
    }

    /// Inserts a verified partial signature. Returns `true` if this call
    /// changed the stored value for `from` (a metric hook cares about this
    /// to avoid double-counting a replay).
    pub fn insert_sig(&mut self, from: u32, sig: Vec<u8>) -> bool {
        match self.partial_sigs.get(&from) {
            Some(existing) if existing == &sig => false,
            _ => {
                self.partial_sigs.insert(from, sig);
                true
            }
        }
    }

    pub fn has_quorum(&self, threshold: u32) -> bool {
        self.partial_sigs.len() >= threshold as usize
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// The `m` lowest-indexed valid signatures, in index order, as required
    /// for `combineblocksigs` (§4.5, tie-break rule).
    pub fn lowest_indexed_sigs(&self, threshold: u32) -> Vec<(u32, Vec<u8>)> {
        self.partial_sigs
            .iter()
            .take(threshold as usize)
            .map(|(idx, sig)| (*idx, sig.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fresh_round() -> RoundState {
        RoundState::new(10, NodeRole::Proposer, Instant::now() + Duration::from_secs(60))
    }

    #[test]
    fn duplicate_identical_signature_is_idempotent() {
        let mut round = fresh_round();
        assert!(round.insert_sig(1, vec![0xaa]));
        assert!(!round.insert_sig(1, vec![0xaa]));
        assert_eq!(round.partial_sigs.len(), 1);
    }

    #[test]
    fn replacing_signature_from_same_index_last_write_wins() {
        let mut round = fresh_round();
        round.insert_sig(1, vec![0xaa]);
        assert!(round.insert_sig(1, vec![0xbb]));
        assert_eq!(round.partial_sigs.get(&1), Some(&vec![0xbb]));
        assert_eq!(round.partial_sigs.len(), 1);
    }

    #[test]
    fn lowest_indexed_sigs_respects_threshold_and_order() {
        let mut round = fresh_round();
        round.insert_sig(4, vec![4]);
        round.insert_sig(0, vec![0]);
        round.insert_sig(2, vec![2]);
        round.insert_sig(1, vec![1]);
        let picked = round.lowest_indexed_sigs(3);
        assert_eq!(
            picked,
            vec![(0, vec![0]), (1, vec![1]), (2, vec![2])]
        );
    }

    #[test]
    fn quorum_detection() {
        let mut round = fresh_round();
        assert!(!round.has_quorum(2));
        round.insert_sig(0, vec![0]);
        round.insert_sig(1, vec![1]);
        assert!(round.has_quorum(2));
    }

    proptest::proptest! {
        /// Testable property 6 (design §8): replaying the same signature
        /// bytes from the same index never changes the effective count.
        #[test]
        fn replaying_identical_sig_never_grows_the_set(
            from in 0u32..16,
            sig in proptest::collection::vec(proptest::prelude::any::<u8>(), 1..72),
            replays in 0u32..8,
        ) {
            let mut round = fresh_round();
            round.insert_sig(from, sig.clone());
            let count_after_first = round.partial_sigs.len();
            for _ in 0..replays {
                round.insert_sig(from, sig.clone());
            }
            proptest::prop_assert_eq!(round.partial_sigs.len(), count_after_first);
        }
    }
}
