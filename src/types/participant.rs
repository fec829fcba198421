//! Participant identity for the two populations.
//!
//! A participant is nothing more than a side and an index in `[0, n)`.
//! Everything else about it (quality, preference list, cursor) lives in
//! the tables that own the population.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Side enum
// ============================================================================

/// Population side.
///
/// Represented as u8 for SSZ compatibility:
/// - A = 0
/// - B = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Side {
    /// Side A (the side favoured by a high proposer bias)
    #[default]
    A,
    /// Side B
    B,
}

impl Side {
    /// Both sides, in index order
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::A),
            1 => Some(Side::B),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Array slot for per-side tables
    #[inline]
    pub fn slot(self) -> usize {
        self.to_u8() as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

// ============================================================================
// ParticipantId
// ============================================================================

/// A participant: side plus index within that side's population.
///
/// Displays as `A3`, `B7`.
///
/// ```
/// use stable_match_lab::types::{ParticipantId, Side};
///
/// let p = ParticipantId::new(Side::B, 7);
/// assert_eq!(p.to_string(), "B7");
/// assert_eq!(p.side.opposite(), Side::A);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId {
    pub side: Side,
    pub index: usize,
}

impl ParticipantId {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }

    /// Shorthand for a side-A participant
    pub fn a(index: usize) -> Self {
        Self::new(Side::A, index)
    }

    /// Shorthand for a side-B participant
    pub fn b(index: usize) -> Self {
        Self::new(Side::B, index)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}{}", self.side, self.index))
    }
}

// ============================================================================
// Role
// ============================================================================

/// Role a participant holds inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Proposed and was accepted
    Asker,
    /// Received the proposal and accepted it
    Asked,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::A.to_u8(), 0);
        assert_eq!(Side::B.to_u8(), 1);
        assert_eq!(Side::from_u8(0), Some(Side::A));
        assert_eq!(Side::from_u8(1), Some(Side::B));
        assert_eq!(Side::from_u8(2), None);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::A.opposite(), Side::B);
        assert_eq!(Side::B.opposite(), Side::A);
    }

    #[test]
    fn test_participant_display() {
        assert_eq!(ParticipantId::a(3).to_string(), "A3");
        assert_eq!(ParticipantId::b(12).to_string(), "B12");
    }

    #[test]
    fn test_participant_ordering() {
        // Side A sorts before side B, then by index
        let mut ids = vec![ParticipantId::b(0), ParticipantId::a(2), ParticipantId::a(1)];
        ids.sort();
        assert_eq!(ids, vec![ParticipantId::a(1), ParticipantId::a(2), ParticipantId::b(0)]);
    }
}
