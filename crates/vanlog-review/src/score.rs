//! Achievement scoring over a reconciled state.
//!
//! Rates are integer percentages with round-half-up semantics. The overall
//! score weights main purposes 70/30 over sub purposes; item usage is
//! reported but never feeds the overall score, since packing the right gear
//! is not a travel achievement. Both weights are fixed product decisions.

use serde::{Deserialize, Serialize};

use crate::reconcile::ReconciledState;

/// Weight of the main-purpose rate in the overall score, in tenths.
const MAIN_WEIGHT_TENTHS: u16 = 7;
/// Weight of the sub-purpose rate in the overall score, in tenths.
const SUB_WEIGHT_TENTHS: u16 = 3;

/// The displayable outcome of a trip review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub main_rate: u8,
    pub sub_rate: u8,
    pub items_rate: u8,
    pub overall_rate: u8,
    pub main_achieved: usize,
    pub main_total: usize,
    pub sub_achieved: usize,
    pub sub_total: usize,
    pub items_used: usize,
    pub items_total: usize,
    /// False when no purposes were planned at all; callers should suppress
    /// the overall rate instead of showing a misleading 0%.
    pub scoreable: bool,
}

/// Compute per-category rates and the weighted overall score.
#[must_use]
pub fn score(state: &ReconciledState) -> ScoreReport {
    let main_rate = rate(state.main_achieved.len(), state.main_total);
    let sub_rate = rate(state.sub_achieved.len(), state.sub_total);
    let items_rate = rate(state.items_used.len(), state.items_total);

    let scoreable = state.main_total > 0 || state.sub_total > 0;
    let overall_rate = if scoreable {
        weighted_overall(main_rate, sub_rate)
    } else {
        0
    };

    ScoreReport {
        main_rate,
        sub_rate,
        items_rate,
        overall_rate,
        main_achieved: state.main_achieved.len(),
        main_total: state.main_total,
        sub_achieved: state.sub_achieved.len(),
        sub_total: state.sub_total,
        items_used: state.items_used.len(),
        items_total: state.items_total,
        scoreable,
    }
}

/// Integer percentage with round-half-up, 0 when nothing was planned.
fn rate(achieved: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // (achieved / total * 100) rounded half up, in integer arithmetic.
    let scaled = (achieved * 200 + total) / (2 * total);
    u8::try_from(scaled.min(100)).unwrap_or(100)
}

/// `round(main * 0.7 + sub * 0.3)`, clamped to 0..=100.
fn weighted_overall(main_rate: u8, sub_rate: u8) -> u8 {
    let weighted = u16::from(main_rate) * MAIN_WEIGHT_TENTHS
        + u16::from(sub_rate) * SUB_WEIGHT_TENTHS
        + 5;
    u8::try_from((weighted / 10).min(100)).unwrap_or(100)
}
