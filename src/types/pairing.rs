//! The match record: one A participant paired with one B participant.
//!
//! ## SSZ Serialization
//!
//! `Match` derives `SimpleSerialize` from ssz_rs so a final matching can be
//! encoded deterministically and fingerprinted. The record is a fixed-size
//! container: 8 + 8 + 1 = 17 bytes.

use ssz_rs::prelude::*;

use crate::types::{ParticipantId, Role, Side};

/// A pairing between side-A index `a` and side-B index `b`.
///
/// The side that proposed holds the [`Role::Asker`] role, the other side
/// holds [`Role::Asked`].
///
/// ## Example
///
/// ```
/// use stable_match_lab::types::{Match, ParticipantId, Role, Side};
///
/// // B2 proposed to A5 and was accepted
/// let m = Match::from_proposal(ParticipantId::b(2), 5);
/// assert_eq!(m.a_index(), 5);
/// assert_eq!(m.b_index(), 2);
/// assert_eq!(m.role_of(Side::B), Role::Asker);
/// assert_eq!(m.role_of(Side::A), Role::Asked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Match {
    /// Side-A participant index
    pub a: u64,

    /// Side-B participant index
    pub b: u64,

    /// Side of the asker as u8 (0=A, 1=B)
    /// Stored as u8 for SSZ compatibility
    pub asker_raw: u8,
}

impl Match {
    /// Create a match from its two indices and the asker's side
    pub fn new(a: usize, b: usize, asker: Side) -> Self {
        Self {
            a: a as u64,
            b: b as u64,
            asker_raw: asker.to_u8(),
        }
    }

    /// Create the match formed when `proposer` is accepted by `receiver`
    /// (an index on the proposer's opposite side)
    pub fn from_proposal(proposer: ParticipantId, receiver: usize) -> Self {
        match proposer.side {
            Side::A => Self::new(proposer.index, receiver, Side::A),
            Side::B => Self::new(receiver, proposer.index, Side::B),
        }
    }

    #[inline]
    pub fn a_index(&self) -> usize {
        self.a as usize
    }

    #[inline]
    pub fn b_index(&self) -> usize {
        self.b as usize
    }

    /// Index of the member on `side`
    #[inline]
    pub fn member(&self, side: Side) -> usize {
        match side {
            Side::A => self.a_index(),
            Side::B => self.b_index(),
        }
    }

    /// Side of the participant that proposed
    pub fn asker(&self) -> Side {
        Side::from_u8(self.asker_raw).unwrap_or(Side::A)
    }

    /// Role held by the member on `side`
    pub fn role_of(&self, side: Side) -> Role {
        if self.asker() == side {
            Role::Asker
        } else {
            Role::Asked
        }
    }

    /// Partner of `participant`, if it is a member of this match
    pub fn partner_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.member(participant.side) != participant.index {
            return None;
        }
        let other = participant.side.opposite();
        Some(ParticipantId::new(other, self.member(other)))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
