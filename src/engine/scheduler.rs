//! Deferred-acceptance engine with a biased proposal scheduler.
//!
//! ## One Step
//!
//! 1. Collect the eligible proposers on each side: unmatched participants
//!    whose cursor has not run off the end of their list.
//! 2. If neither side has one, the round is over.
//! 3. If only one side has eligible proposers, that side proposes.
//!    Otherwise side A proposes with probability `bias`.
//! 4. A uniformly random eligible proposer from that side proposes to the
//!    candidate under its cursor; the cursor advances whatever happens.
//! 5. An unmatched receiver accepts. A matched receiver switches only if it
//!    strictly prefers the proposer, leaving its old partner single.
//!
//! The bias is a coin flip between the two *populations* each tick. It is
//! not a per-individual weighting and does not try to be fair between
//! individuals.
//!
//! ## Termination
//!
//! Every proposal advances one of the 2n cursors and no cursor passes n, so
//! a round makes at most n² proposals per side. The engine refuses to go
//! past `2 * n²` total and reports [`EngineError::ProposalLimitExceeded`].
//!
//! ## Stability
//!
//! With `bias` at 0 or 1 only one side ever proposes and this is textbook
//! Gale–Shapley: the result is complete, stable and optimal for the
//! proposing side. With both sides proposing, a participant can be
//! accepted by a lesser partner while its preferred match never proposes,
//! so the final matching may contain blocking pairs. Use
//! [`verify`](crate::engine::verify) to count them.
//!
//! Mixed rounds can also end incomplete. A participant who keeps being
//! displaced may walk off the end of its list while a counterpart on the
//! other side does the same. Both stay single and ineligible, no proposer
//! is left, and [`Step::Finished`] is returned with
//! [`MatchingState::is_complete`] false.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::error::{EngineError, Result};
use crate::matching::MatchingState;
use crate::preferences::PreferenceTable;
use crate::types::{ParticipantId, Side};

/// Total proposals allowed per participant slot, as a multiple of n
const PROPOSAL_BOUND_FACTOR: u64 = 2;

/// What happened to a single proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProposalOutcome {
    /// Receiver was single and accepted
    Accepted,
    /// Receiver left `displaced` (same side as the proposer) for the proposer
    Replaced { displaced: usize },
    /// Receiver kept its current partner
    Rejected,
}

impl ProposalOutcome {
    /// Whether a match was formed
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ProposalOutcome::Rejected)
    }
}

/// The proposer/receiver pair that just interacted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub proposer: ParticipantId,
    pub receiver: ParticipantId,
    pub outcome: ProposalOutcome,
}

/// Result of [`Engine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One proposal was made
    Proposed(Interaction),
    /// No eligible proposer remains; the matching is final
    Finished,
}

/// Deferred-acceptance engine.
///
/// Owns the preferences, the matching and the proposal cursors of one
/// round. Each step borrows the engine exclusively.
///
/// ## Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use stable_match_lab::engine::{verify, Engine};
/// use stable_match_lab::preferences::generate;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let prefs = generate(10, 0.5, 0.5, &mut rng).unwrap();
///
/// // Side A always proposes
/// let mut engine = Engine::new(prefs, 1.0);
/// engine.run_to_completion(&mut rng).unwrap();
///
/// assert!(engine.state().is_complete());
/// assert!(verify(engine.state(), engine.preferences()).verified);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    prefs: PreferenceTable,
    state: MatchingState,

    /// Per side: index of the next candidate in each participant's list
    cursors: [Vec<usize>; 2],

    /// Probability that side A proposes when both sides are eligible
    bias: f64,

    /// Per side proposal counters
    proposals: [u64; 2],

    /// Defensive bound on total proposals
    limit: u64,

    last: Option<Interaction>,
    finished: bool,
}

impl Engine {
    /// Start a fresh round over `prefs`.
    ///
    /// `bias` is the probability in `[0, 1]` that side A proposes next.
    pub fn new(prefs: PreferenceTable, bias: f64) -> Self {
        let n = prefs.population();
        Self {
            state: MatchingState::with_population(n),
            cursors: [vec![0; n], vec![0; n]],
            bias: clamp_bias(bias),
            proposals: [0; 2],
            limit: PROPOSAL_BOUND_FACTOR * (n as u64) * (n as u64),
            last: None,
            finished: false,
            prefs,
        }
    }

    /// Replace the defensive proposal bound
    pub fn with_proposal_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn preferences(&self) -> &PreferenceTable {
        &self.prefs
    }

    #[inline]
    pub fn state(&self) -> &MatchingState {
        &self.state
    }

    /// Population size per side
    #[inline]
    pub fn population(&self) -> usize {
        self.prefs.population()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Change the proposer bias mid-round
    pub fn set_bias(&mut self, bias: f64) {
        self.bias = clamp_bias(bias);
    }

    /// Cursor of `participant`: how many candidates it has proposed to
    #[inline]
    pub fn cursor(&self, participant: ParticipantId) -> usize {
        self.cursors[participant.side.slot()][participant.index]
    }

    /// Total proposals made this round
    pub fn proposals(&self) -> u64 {
        self.proposals[0] + self.proposals[1]
    }

    /// Proposals made by `side` this round
    pub fn proposals_by(&self, side: Side) -> u64 {
        self.proposals[side.slot()]
    }

    pub fn proposal_limit(&self) -> u64 {
        self.limit
    }

    /// Most recent proposer/receiver pair, for highlighting
    pub fn last_interaction(&self) -> Option<&Interaction> {
        self.last.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Unmatched participants on `side` that still have candidates left
    pub fn eligible(&self, side: Side) -> Vec<usize> {
        let n = self.population();
        let cursors = &self.cursors[side.slot()];
        self.state
            .singles(side)
            .into_iter()
            .filter(|&i| cursors[i] < n)
            .collect()
    }

    /// Give back the preferences and final matching
    pub fn into_parts(self) -> (PreferenceTable, MatchingState) {
        (self.prefs, self.state)
    }

    // ========================================================================
    // Proposal loop
    // ========================================================================

    /// Make one scheduled proposal, or report that the round is over.
    ///
    /// # Errors
    ///
    /// [`EngineError::ProposalLimitExceeded`] if the defensive bound is hit.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step> {
        if self.finished {
            return Ok(Step::Finished);
        }

        let eligible_a = self.eligible(Side::A);
        let eligible_b = self.eligible(Side::B);

        let side = match (eligible_a.is_empty(), eligible_b.is_empty()) {
            (true, true) => {
                self.finished = true;
                debug!(
                    proposals = self.proposals(),
                    matched = self.state.len(),
                    population = self.population(),
                    "round finished"
                );
                return Ok(Step::Finished);
            }
            (false, true) => Side::A,
            (true, false) => Side::B,
            (false, false) => {
                if rng.gen::<f64>() < self.bias {
                    Side::A
                } else {
                    Side::B
                }
            }
        };

        let candidates = match side {
            Side::A => &eligible_a,
            Side::B => &eligible_b,
        };
        let index = candidates[rng.gen_range(0..candidates.len())];

        self.propose(ParticipantId::new(side, index)).map(Step::Proposed)
    }

    /// Have `proposer` propose to the candidate under its cursor.
    ///
    /// This is the acceptance half of [`step`](Self::step) with the
    /// scheduling decision made by the caller.
    ///
    /// # Errors
    ///
    /// - [`EngineError::IneligibleProposer`] if `proposer` is matched or has
    ///   exhausted its list
    /// - [`EngineError::ProposalLimitExceeded`] if the defensive bound is hit
    pub fn propose(&mut self, proposer: ParticipantId) -> Result<Interaction> {
        let n = self.population();
        if proposer.index >= n
            || self.state.is_matched(proposer.side, proposer.index)
            || self.cursor(proposer) >= n
        {
            return Err(EngineError::IneligibleProposer(proposer));
        }
        if self.proposals() >= self.limit {
            error!(
                limit = self.limit,
                population = n,
                "proposal loop exceeded its bound"
            );
            return Err(EngineError::ProposalLimitExceeded { limit: self.limit });
        }

        let side = proposer.side;
        let receiver_side = side.opposite();

        let cursor = &mut self.cursors[side.slot()][proposer.index];
        let receiver = self.prefs.list(side, proposer.index)[*cursor];
        *cursor += 1;
        self.proposals[side.slot()] += 1;

        let outcome = match self.state.partner(receiver_side, receiver) {
            None => {
                self.state.pair(proposer, receiver);
                ProposalOutcome::Accepted
            }
            Some(current) => {
                if self.prefs.prefers(receiver_side, receiver, proposer.index, current) {
                    self.state.dissolve(receiver_side, receiver);
                    self.state.pair(proposer, receiver);
                    ProposalOutcome::Replaced { displaced: current }
                } else {
                    ProposalOutcome::Rejected
                }
            }
        };

        let interaction = Interaction {
            proposer,
            receiver: ParticipantId::new(receiver_side, receiver),
            outcome,
        };
        trace!(
            proposer = %interaction.proposer,
            receiver = %interaction.receiver,
            outcome = ?outcome,
            "proposal"
        );
        self.last = Some(interaction);
        Ok(interaction)
    }

    /// Run steps until the round is over (headless mode).
    ///
    /// # Returns
    ///
    /// The total number of proposals made this round
    pub fn run_to_completion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        while let Step::Proposed(_) = self.step(rng)? {}
        Ok(self.proposals())
    }
}

fn clamp_bias(bias: f64) -> f64 {
    if bias.is_nan() {
        0.5
    } else {
        bias.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
