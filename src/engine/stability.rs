//! Post-hoc stability verification.
//!
//! A blocking pair is an A participant `a` and a B participant `b`, not
//! matched to each other, where `a` strictly prefers `b` to its current
//! partner and `b` strictly prefers `a` to its current partner. Being
//! unmatched counts as worse than any partner.
//!
//! The scan is O(n²) with O(1) rank lookups from the inverse rank tables.

use serde::Serialize;

use crate::matching::MatchingState;
use crate::preferences::PreferenceTable;
use crate::types::Side;

/// Outcome of a stability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StabilityReport {
    /// Number of blocking pairs
    pub blocking_pairs: usize,

    /// `blocking_pairs == 0`
    pub verified: bool,

    /// The blocking pairs as `(a, b)`, ascending
    pub pairs: Vec<(usize, usize)>,
}

/// Count the blocking pairs of `state` under `prefs`.
///
/// The matching is only read; calling this twice gives the same report.
pub fn verify(state: &MatchingState, prefs: &PreferenceTable) -> StabilityReport {
    let n = prefs.population();

    // Rank of each participant's current partner; n when single
    let partner_rank = |side: Side, index: usize| -> usize {
        state
            .partner(side, index)
            .map_or(n, |partner| prefs.rank(side, index, partner))
    };
    let rank_b: Vec<usize> = (0..n).map(|b| partner_rank(Side::B, b)).collect();

    let mut pairs = Vec::new();
    for a in 0..n {
        let rank_a = partner_rank(Side::A, a);
        // Only candidates a ranks above its partner can block
        for &b in &prefs.list(Side::A, a)[..rank_a] {
            if prefs.rank(Side::B, b, a) < rank_b[b] {
                pairs.push((a, b));
            }
        }
    }
    pairs.sort_unstable();

    StabilityReport {
        blocking_pairs: pairs.len(),
        verified: pairs.is_empty(),
        pairs,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
