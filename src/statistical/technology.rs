//! Research accumulation and tech-level advancement

use crate::statistical::constants::profile_constants;
use crate::statistical::{StepContext, StepOutcome};
use crate::tier::events::{TierEvent, TierEventKind};
use crate::tier::level::StepProfile;
use crate::tier::state::{Population, Tier};

/// Research produced by a population's researchers over `years`
pub fn research_gain(population: &Population, profile: StepProfile, years: f64) -> f64 {
    population.researchers() * profile_constants(profile).research_per_capita * years
}

/// Accumulate research and advance levels. The cost of each level is
/// subtracted from the accumulator, so overflow carries into the next
/// level.
pub fn advance(tier: &mut Tier, years: f64, profile: StepProfile, ctx: &StepContext<'_>) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let max_level = ctx.tables.max_level();

    let gain = research_gain(&tier.population, profile, years);
    if gain.is_finite() && gain > 0.0 {
        tier.tech.research += gain;
    }

    while tier.tech.level < max_level && tier.tech.research >= ctx.tables.tech_cost(tier.tech.level) {
        tier.tech.research -= ctx.tables.tech_cost(tier.tech.level);
        tier.tech.level += 1;

        tracing::debug!(tier = %tier.id, level = tier.tech.level, "tech breakthrough");
        tier.active_events.push(TierEvent {
            tick: ctx.tick,
            tier: tier.id,
            kind: TierEventKind::TechBreakthrough { level: tier.tech.level },
            participants: vec![tier.id],
        });
    }

    if tier.tech.level > max_level {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, level = tier.tech.level, "tech level above max");
        tier.tech.level = max_level;
    }
    if !tier.tech.research.is_finite() || tier.tech.research < 0.0 {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, research = tier.tech.research, "research accumulator clamped");
        tier.tech.research = 0.0;
    }

    tier.tech.efficiency = ctx.tables.efficiency(tier.tech.level);
    outcome
}
