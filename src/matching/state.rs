//! Matching state: the evolving partial matching between the two sides.
//!
//! ## Architecture
//!
//! - **Slab**: Pre-allocated storage for [`Match`] records, O(1) insert/remove
//! - **Slot tables**: Per side, participant index to slab key, giving O(1)
//!   partner lookup and keeping the mapping injective on both sides
//!
//! ## Invariants
//!
//! - Each participant appears in at most one match
//! - `slots[A][a] == Some(k)` iff `slots[B][b] == Some(k)` for the match
//!   `k = {a, b}` (the mapping is symmetric)
//!
//! ## Example
//!
//! ```
//! use stable_match_lab::matching::MatchingState;
//! use stable_match_lab::types::{ParticipantId, Side};
//!
//! let mut state = MatchingState::with_population(3);
//! state.pair(ParticipantId::a(0), 2);
//!
//! assert_eq!(state.partner(Side::A, 0), Some(2));
//! assert_eq!(state.partner(Side::B, 2), Some(0));
//! assert_eq!(state.len(), 1);
//! ```

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::error::{EngineError, Result};
use crate::types::{Match, ParticipantId, Role, Side};

/// Partial injective mapping between side A and side B.
#[derive(Debug, Clone)]
pub struct MatchingState {
    /// Match storage
    matches: Slab<Match>,

    /// Per side: participant index to slab key
    slots: [Vec<Option<usize>>; 2],
}

impl MatchingState {
    /// Create an empty matching for two populations of size `n`
    pub fn with_population(n: usize) -> Self {
        Self {
            matches: Slab::with_capacity(n),
            slots: [vec![None; n], vec![None; n]],
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Population size per side
    #[inline]
    pub fn population(&self) -> usize {
        self.slots[0].len()
    }

    /// Number of current matches
    #[inline]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Whether every participant on both sides is matched
    pub fn is_complete(&self) -> bool {
        self.matches.len() == self.population()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// The match `index` on `side` belongs to, if any
    #[inline]
    pub fn match_of(&self, side: Side, index: usize) -> Option<&Match> {
        let key = self.slots[side.slot()][index]?;
        self.matches.get(key)
    }

    /// Current partner index (on the opposite side) of `index` on `side`
    #[inline]
    pub fn partner(&self, side: Side, index: usize) -> Option<usize> {
        self.match_of(side, index).map(|m| m.member(side.opposite()))
    }

    /// Role `index` on `side` holds in its current match
    pub fn role(&self, side: Side, index: usize) -> Option<Role> {
        self.match_of(side, index).map(|m| m.role_of(side))
    }

    #[inline]
    pub fn is_matched(&self, side: Side, index: usize) -> bool {
        self.slots[side.slot()][index].is_some()
    }

    /// Unmatched participants on `side`, ascending
    pub fn singles(&self, side: Side) -> Vec<usize> {
        self.slots[side.slot()]
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect()
    }

    /// Iterate over current matches (slab order)
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().map(|(_, m)| m)
    }

    /// Current matches ordered by side-A index
    pub fn sorted_matches(&self) -> Vec<Match> {
        self.slots[Side::A.slot()]
            .iter()
            .filter_map(|&slot| slot.and_then(|key| self.matches.get(key)).cloned())
            .collect()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Pair `proposer` with `receiver` (an index on the opposite side).
    ///
    /// Both must be unmatched; the proposer becomes the asker.
    ///
    /// # Returns
    ///
    /// The slab key of the new match
    pub fn pair(&mut self, proposer: ParticipantId, receiver: usize) -> usize {
        let record = Match::from_proposal(proposer, receiver);
        let a = record.a_index();
        let b = record.b_index();
        debug_assert!(self.slots[Side::A.slot()][a].is_none(), "A{} already matched", a);
        debug_assert!(self.slots[Side::B.slot()][b].is_none(), "B{} already matched", b);

        let key = self.matches.insert(record);
        self.slots[Side::A.slot()][a] = Some(key);
        self.slots[Side::B.slot()][b] = Some(key);
        key
    }

    /// Dissolve the match containing `index` on `side`.
    ///
    /// Both members become unmatched.
    ///
    /// # Returns
    ///
    /// The removed match, or None if the participant was single
    pub fn dissolve(&mut self, side: Side, index: usize) -> Option<Match> {
        let key = self.slots[side.slot()][index]?;
        let record = self.matches.remove(key);
        self.slots[Side::A.slot()][record.a_index()] = None;
        self.slots[Side::B.slot()][record.b_index()] = None;
        Some(record)
    }

    /// Remove all matches
    pub fn clear(&mut self) {
        self.matches.clear();
        for slots in &mut self.slots {
            slots.iter_mut().for_each(|slot| *slot = None);
        }
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Check the injective/symmetric invariants.
    ///
    /// # Returns
    ///
    /// A description of the first violation found, if any
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut referenced = 0;
        for side in Side::ALL {
            for (index, slot) in self.slots[side.slot()].iter().enumerate() {
                let Some(key) = *slot else { continue };
                let record = self
                    .matches
                    .get(key)
                    .ok_or_else(|| format!("{}{} points at missing match {}", side, index, key))?;
                if record.member(side) != index {
                    return Err(format!("{}{} points at match {:?}", side, index, record));
                }
                let other = side.opposite();
                if self.slots[other.slot()][record.member(other)] != Some(key) {
                    return Err(format!("match {:?} is not symmetric", record));
                }
                referenced += 1;
            }
        }
        if referenced != 2 * self.matches.len() {
            return Err(format!(
                "{} slot references for {} matches",
                referenced,
                self.matches.len()
            ));
        }
        Ok(())
    }

    /// SHA-256 over the SSZ encoding of the matches, ordered by side-A index.
    ///
    /// Identical matchings (including roles) produce identical fingerprints.
    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update((self.population() as u64).to_le_bytes());
        for record in self.sorted_matches() {
            let bytes = ssz_rs::serialize(&record)
                .map_err(|e| EngineError::Encoding(format!("{:?}", e)))?;
            hasher.update(&bytes);
        }
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Ok(hash)
    }

    /// Fingerprint as a hex string
    pub fn fingerprint_hex(&self) -> Result<String> {
        Ok(hex::encode(self.fingerprint()?))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = MatchingState::with_population(4);

        assert!(state.is_empty());
        assert_eq!(state.population(), 4);
        assert!(!state.is_complete());
        assert_eq!(state.singles(Side::A), vec![0, 1, 2, 3]);
        assert_eq!(state.singles(Side::B), vec![0, 1, 2, 3]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_pair_is_symmetric() {
        let mut state = MatchingState::with_population(3);
        state.pair(ParticipantId::b(1), 2);

        assert_eq!(state.partner(Side::B, 1), Some(2));
        assert_eq!(state.partner(Side::A, 2), Some(1));
        assert_eq!(state.role(Side::B, 1), Some(Role::Asker));
        assert_eq!(state.role(Side::A, 2), Some(Role::Asked));
        assert_eq!(state.singles(Side::A), vec![0, 1]);
        assert_eq!(state.singles(Side::B), vec![0, 2]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_dissolve_frees_both() {
        let mut state = MatchingState::with_population(2);
        state.pair(ParticipantId::a(0), 1);

        let removed = state.dissolve(Side::B, 1).expect("match exists");
        assert_eq!(removed.a_index(), 0);
        assert_eq!(removed.b_index(), 1);
        assert!(!state.is_matched(Side::A, 0));
        assert!(!state.is_matched(Side::B, 1));
        assert!(state.is_empty());
        assert!(state.dissolve(Side::A, 0).is_none());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_slab_keys_reused() {
        let mut state = MatchingState::with_population(2);
        let k1 = state.pair(ParticipantId::a(0), 0);
        state.dissolve(Side::A, 0);
        let k2 = state.pair(ParticipantId::a(1), 0);
        assert_eq!(k1, k2);
        assert_eq!(state.partner(Side::B, 0), Some(1));
    }

    #[test]
    fn test_complete_and_sorted() {
        let mut state = MatchingState::with_population(3);
        state.pair(ParticipantId::a(2), 0);
        state.pair(ParticipantId::b(2), 0);
        state.pair(ParticipantId::a(1), 1);

        assert!(state.is_complete());
        let sorted: Vec<(usize, usize)> = state
            .sorted_matches()
            .iter()
            .map(|m| (m.a_index(), m.b_index()))
            .collect();
        assert_eq!(sorted, vec![(0, 2), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_clear() {
        let mut state = MatchingState::with_population(2);
        state.pair(ParticipantId::a(0), 0);
        state.pair(ParticipantId::a(1), 1);
        state.clear();

        assert!(state.is_empty());
        assert_eq!(state.singles(Side::A), vec![0, 1]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut s1 = MatchingState::with_population(2);
        s1.pair(ParticipantId::a(0), 1);
        s1.pair(ParticipantId::a(1), 0);

        let mut s2 = MatchingState::with_population(2);
        s2.pair(ParticipantId::a(1), 0);
        s2.pair(ParticipantId::a(0), 1);

        assert_eq!(s1.fingerprint().unwrap(), s2.fingerprint().unwrap());
        assert_eq!(s1.fingerprint_hex().unwrap().len(), 64);
    }

    #[test]
    fn test_fingerprint_sees_roles() {
        let mut s1 = MatchingState::with_population(1);
        s1.pair(ParticipantId::a(0), 0);

        let mut s2 = MatchingState::with_population(1);
        s2.pair(ParticipantId::b(0), 0);

        assert_ne!(s1.fingerprint().unwrap(), s2.fingerprint().unwrap());
    }
}
