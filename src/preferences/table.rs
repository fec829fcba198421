//! Preference table for both populations.
//!
//! ## Layout
//!
//! For each side the table stores:
//!
//! - `quality[i]`: the participant's fixed quality scalar in `[0, 1)`
//! - `lists[i]`: a permutation of the opposite side's indices, best first
//! - `ranks[i][j]`: inverse permutation, position of `j` in `lists[i]`
//!
//! The inverse tables make every rank lookup O(1), which keeps the
//! acceptance check and the stability verifier cheap.

use crate::config::validate_population;
use crate::error::{EngineError, Result};
use crate::types::{ParticipantId, Side};

/// Per-side preference data
#[derive(Debug, Clone, Default)]
struct SideTable {
    quality: Vec<f64>,
    lists: Vec<Vec<usize>>,
    ranks: Vec<Vec<usize>>,
}

impl SideTable {
    fn new(quality: Vec<f64>, lists: Vec<Vec<usize>>) -> Self {
        let n = lists.len();
        let ranks = lists
            .iter()
            .map(|list| {
                let mut inverse = vec![0; n];
                for (position, &candidate) in list.iter().enumerate() {
                    inverse[candidate] = position;
                }
                inverse
            })
            .collect();
        Self { quality, lists, ranks }
    }
}

/// Complete preferences of two equal-size populations.
///
/// ## Example
///
/// ```
/// use stable_match_lab::preferences::PreferenceTable;
/// use stable_match_lab::types::Side;
///
/// let table = PreferenceTable::from_lists(
///     vec![vec![0, 1], vec![1, 0]],
///     vec![vec![1, 0], vec![0, 1]],
/// ).unwrap();
///
/// assert_eq!(table.population(), 2);
/// assert_eq!(table.list(Side::A, 1), &[1, 0]);
/// assert_eq!(table.rank(Side::B, 0, 1), 0);
/// ```
#[derive(Debug, Clone)]
pub struct PreferenceTable {
    n: usize,
    sides: [SideTable; 2],
}

impl PreferenceTable {
    /// Build a table from generated qualities and lists.
    ///
    /// Lists are trusted to be permutations (the generator produces them by
    /// sorting `0..n`).
    pub(crate) fn from_parts(
        quality_a: Vec<f64>,
        quality_b: Vec<f64>,
        lists_a: Vec<Vec<usize>>,
        lists_b: Vec<Vec<usize>>,
    ) -> Self {
        let n = lists_a.len();
        Self {
            n,
            sides: [
                SideTable::new(quality_a, lists_a),
                SideTable::new(quality_b, lists_b),
            ],
        }
    }

    /// Build a table from explicit preference lists (best first).
    ///
    /// Every list on both sides must be a permutation of `0..n` where `n`
    /// is the number of side-A lists. Qualities are left at zero.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidPopulation`] if there are no lists, or more
    ///   than [`MAX_POPULATION`](crate::config::MAX_POPULATION)
    /// - [`EngineError::SideCountMismatch`] if side B has a different
    ///   number of lists
    /// - [`EngineError::MalformedPreferences`] if any list is not a
    ///   permutation
    pub fn from_lists(lists_a: Vec<Vec<usize>>, lists_b: Vec<Vec<usize>>) -> Result<Self> {
        let n = lists_a.len();
        validate_population(n)?;
        if lists_b.len() != n {
            return Err(EngineError::SideCountMismatch { a: n, b: lists_b.len() });
        }

        for (side, lists) in [(Side::A, &lists_a), (Side::B, &lists_b)] {
            for (index, list) in lists.iter().enumerate() {
                validate_permutation(list, n).map_err(|reason| {
                    EngineError::MalformedPreferences {
                        participant: ParticipantId::new(side, index),
                        reason,
                    }
                })?;
            }
        }

        Ok(Self::from_parts(vec![0.0; n], vec![0.0; n], lists_a, lists_b))
    }

    /// Population size per side
    #[inline]
    pub fn population(&self) -> usize {
        self.n
    }

    /// Preference list of participant `index` on `side`, best first
    #[inline]
    pub fn list(&self, side: Side, index: usize) -> &[usize] {
        &self.sides[side.slot()].lists[index]
    }

    /// All preference lists of `side`
    pub fn lists(&self, side: Side) -> &[Vec<usize>] {
        &self.sides[side.slot()].lists
    }

    /// Zero-based position of `candidate` in the list of `index` on `side`.
    /// Lower is more preferred.
    #[inline]
    pub fn rank(&self, side: Side, index: usize, candidate: usize) -> usize {
        self.sides[side.slot()].ranks[index][candidate]
    }

    /// Whether `index` on `side` strictly prefers `x` over `y`
    #[inline]
    pub fn prefers(&self, side: Side, index: usize, x: usize, y: usize) -> bool {
        self.rank(side, index, x) < self.rank(side, index, y)
    }

    /// Quality scalar of participant `index` on `side`
    #[inline]
    pub fn quality(&self, side: Side, index: usize) -> f64 {
        self.sides[side.slot()].quality[index]
    }

    /// All quality scalars of `side`
    pub fn qualities(&self, side: Side) -> &[f64] {
        &self.sides[side.slot()].quality
    }
}

fn validate_permutation(list: &[usize], n: usize) -> std::result::Result<(), String> {
    if list.len() != n {
        return Err(format!("expected {} entries, found {}", n, list.len()));
    }
    let mut seen = vec![false; n];
    for &candidate in list {
        if candidate >= n {
            return Err(format!("candidate {} out of range 0..{}", candidate, n));
        }
        if seen[candidate] {
            return Err(format!("candidate {} listed twice", candidate));
        }
        seen[candidate] = true;
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> PreferenceTable {
        PreferenceTable::from_lists(
            vec![vec![2, 0, 1], vec![0, 1, 2], vec![1, 2, 0]],
            vec![vec![0, 1, 2], vec![2, 1, 0], vec![1, 0, 2]],
        )
        .expect("valid table")
    }

    #[test]
    fn test_inverse_ranks() {
        let table = sample_table();

        assert_eq!(table.rank(Side::A, 0, 2), 0);
        assert_eq!(table.rank(Side::A, 0, 0), 1);
        assert_eq!(table.rank(Side::A, 0, 1), 2);
        assert_eq!(table.rank(Side::B, 1, 2), 0);
        assert_eq!(table.rank(Side::B, 1, 0), 2);

        // rank is the inverse of list for every participant
        for side in Side::ALL {
            for i in 0..table.population() {
                for (pos, &c) in table.list(side, i).iter().enumerate() {
                    assert_eq!(table.rank(side, i, c), pos);
                }
            }
        }
    }

    #[test]
    fn test_prefers() {
        let table = sample_table();
        assert!(table.prefers(Side::A, 0, 2, 1));
        assert!(!table.prefers(Side::A, 0, 1, 2));
        assert!(!table.prefers(Side::A, 0, 1, 1));
    }

    #[test]
    fn test_from_lists_rejects_empty() {
        let result = PreferenceTable::from_lists(vec![], vec![]);
        assert!(matches!(result, Err(EngineError::InvalidPopulation { got: 0, .. })));
    }

    #[test]
    fn test_from_lists_rejects_duplicate() {
        let result = PreferenceTable::from_lists(
            vec![vec![0, 1], vec![1, 1]],
            vec![vec![0, 1], vec![1, 0]],
        );
        match result {
            Err(EngineError::MalformedPreferences { participant, .. }) => {
                assert_eq!(participant, ParticipantId::a(1));
            }
            other => panic!("expected MalformedPreferences, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lists_rejects_out_of_range() {
        let result = PreferenceTable::from_lists(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 1], vec![2, 0]],
        );
        assert!(matches!(
            result,
            Err(EngineError::MalformedPreferences { participant, .. }) if participant == ParticipantId::b(1)
        ));
    }

    #[test]
    fn test_from_lists_rejects_size_mismatch() {
        let result = PreferenceTable::from_lists(
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 1]],
        );
        assert!(matches!(result, Err(EngineError::SideCountMismatch { a: 2, b: 1 })));
    }
}
