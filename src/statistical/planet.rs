//! Planetary step: settlements, chunks and zones

use rand_chacha::ChaCha8Rng;

use crate::statistical::{step_core, StepContext, StepOutcome};
use crate::tier::state::Tier;

/// Advance a planet-scale tier. No construction or civilization layer at
/// this resolution; just the shared growth/research/economy/event core.
pub fn step(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> StepOutcome {
    let (_, outcome) = step_core(tier, years, ctx, rng);
    outcome
}
