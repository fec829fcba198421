//! Average achieved rank, by side and by role.
//!
//! Ranks are 1-based: a participant matched with its first choice has rank
//! 1, with its last choice rank n. Only matched participants contribute.

use serde::Serialize;

use crate::matching::MatchingState;
use crate::preferences::PreferenceTable;
use crate::types::{Role, Side};

/// The four averages reported for a matching
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RankSummary {
    /// Mean rank side-A participants achieved
    pub side_a: f64,
    /// Mean rank side-B participants achieved
    pub side_b: f64,
    /// Mean rank of asker role holders (both sides)
    pub askers: f64,
    /// Mean rank of asked role holders (both sides)
    pub asked: f64,
}

#[derive(Default)]
struct Mean {
    total: usize,
    count: usize,
}

impl Mean {
    fn add(&mut self, rank: usize) {
        self.total += rank;
        self.count += 1;
    }

    /// 0 for an empty group
    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

impl RankSummary {
    /// Summarize the matched participants of `state`
    pub fn from_state(state: &MatchingState, prefs: &PreferenceTable) -> Self {
        let mut sides = [Mean::default(), Mean::default()];
        let mut askers = Mean::default();
        let mut asked = Mean::default();

        for record in state.iter() {
            for side in Side::ALL {
                let index = record.member(side);
                let partner = record.member(side.opposite());
                let rank = prefs.rank(side, index, partner) + 1;

                sides[side.slot()].add(rank);
                match record.role_of(side) {
                    Role::Asker => askers.add(rank),
                    Role::Asked => asked.add(rank),
                }
            }
        }

        Self {
            side_a: sides[Side::A.slot()].value(),
            side_b: sides[Side::B.slot()].value(),
            askers: askers.value(),
            asked: asked.value(),
        }
    }

    /// The four averages as an array: side A, side B, askers, asked
    pub fn values(&self) -> [f64; 4] {
        [self.side_a, self.side_b, self.askers, self.asked]
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
