//! Correlated random preference generation.
//!
//! Each participant ranks the opposite side by
//!
//! ```text
//! score(j) = consensus * quality[j] + (1 - consensus) * noise_ij
//! ```
//!
//! with a fresh uniform `noise_ij` per ordered pair. A consensus of 0 gives
//! fully idiosyncratic lists, a consensus of 1 makes the whole side agree on
//! the quality ordering.
//!
//! ## Draw Order
//!
//! Randomness is consumed in a fixed order (side-A qualities, side-B
//! qualities, side-A noise row by row, side-B noise row by row), so a seeded
//! RNG reproduces the same table exactly.
//!
//! ## Ties
//!
//! Lists are sorted with a stable sort, so exactly equal scores keep
//! ascending index order.

use rand::Rng;

use crate::config::validate_population;
use crate::error::Result;
use crate::preferences::PreferenceTable;

/// Generate preferences for two populations of size `n`.
///
/// `consensus_a` shapes side A's lists (over side-B qualities) and
/// `consensus_b` shapes side B's lists. Both are clamped into `[0, 1]`.
///
/// # Errors
///
/// [`EngineError::InvalidPopulation`](crate::error::EngineError::InvalidPopulation)
/// when `n` is 0 or above [`MAX_POPULATION`](crate::config::MAX_POPULATION).
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use stable_match_lab::preferences::generate;
/// use stable_match_lab::types::Side;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let table = generate(5, 1.0, 0.0, &mut rng).unwrap();
///
/// // Full consensus: every A participant ranks B by quality
/// let first = table.list(Side::A, 0).to_vec();
/// for i in 1..5 {
///     assert_eq!(table.list(Side::A, i), first.as_slice());
/// }
/// ```
pub fn generate<R: Rng + ?Sized>(
    n: usize,
    consensus_a: f64,
    consensus_b: f64,
    rng: &mut R,
) -> Result<PreferenceTable> {
    validate_population(n)?;

    let quality_a: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let quality_b: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();

    let lists_a = ranked_lists(n, clamp_unit(consensus_a), &quality_b, rng);
    let lists_b = ranked_lists(n, clamp_unit(consensus_b), &quality_a, rng);

    Ok(PreferenceTable::from_parts(quality_a, quality_b, lists_a, lists_b))
}

/// One list per participant, ranking all `n` candidates by blended score
fn ranked_lists<R: Rng + ?Sized>(
    n: usize,
    consensus: f64,
    candidate_quality: &[f64],
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let mut scored: Vec<(usize, f64)> = Vec::with_capacity(n);

    (0..n)
        .map(|_| {
            scored.clear();
            scored.extend(candidate_quality.iter().enumerate().map(|(j, &q)| {
                let noise = rng.gen::<f64>();
                (j, consensus * q + (1.0 - consensus) * noise)
            }));
            // Descending by score; stable so ties keep index order
            scored.sort_by(|x, y| y.1.total_cmp(&x.1));
            scored.iter().map(|&(j, _)| j).collect()
        })
        .collect()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
