//! Sector step: sectors and megasegments
//!
//! Adds wormhole links and, at high tech, megastructures.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::statistical::constants::{
    profile_constants, MAX_MEGASTRUCTURES, MAX_WORMHOLE_LINKS, MEGASTRUCTURE_CAPACITY, MEGASTRUCTURE_TECH, WORMHOLE_INFRASTRUCTURE,
};
use crate::statistical::{step_core, StepContext, StepOutcome};
use crate::tier::events::{InfrastructureKind, TierEvent, TierEventKind};
use crate::tier::level::StepProfile;
use crate::tier::state::Tier;

pub fn step(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> StepOutcome {
    let (fraction, outcome) = step_core(tier, years, ctx, rng);
    construct(tier, fraction, ctx, rng);
    outcome
}

fn construct(tier: &mut Tier, fraction: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) {
    let constants = profile_constants(StepProfile::Sector);
    if tier.tech.level < constants.construction_tech || fraction <= 0.0 {
        return;
    }

    if tier.infrastructure.wormhole_links < MAX_WORMHOLE_LINKS && rng.gen::<f64>() < constants.construction_chance * fraction {
        tier.infrastructure.wormhole_links += 1;
        tier.stability.infrastructure = (tier.stability.infrastructure + WORMHOLE_INFRASTRUCTURE).min(1.0);
        push_built(tier, InfrastructureKind::WormholeLink, ctx);
    }

    if tier.tech.level >= MEGASTRUCTURE_TECH
        && tier.infrastructure.megastructures < MAX_MEGASTRUCTURES
        && rng.gen::<f64>() < constants.construction_chance * 0.5 * fraction {
        tier.infrastructure.megastructures += 1;
        tier.population.carrying_capacity *= MEGASTRUCTURE_CAPACITY;
        push_built(tier, InfrastructureKind::Megastructure, ctx);
    }
}

fn push_built(tier: &mut Tier, kind: InfrastructureKind, ctx: &StepContext<'_>) {
    tier.active_events.push(TierEvent {
        tick: ctx.tick,
        tier: tier.id,
        kind: TierEventKind::InfrastructureBuilt { kind },
        participants: vec![tier.id],
    });
}
