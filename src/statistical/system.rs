//! Stellar step: star systems, regions and subsections
//!
//! Adds orbital-station construction once tech allows it.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::statistical::constants::{
    profile_constants, MAX_ORBITAL_STATIONS, ORBITAL_STATION_CAPACITY, ORBITAL_STATION_INFRASTRUCTURE,
};
use crate::statistical::{step_core, StepContext, StepOutcome};
use crate::tier::events::{InfrastructureKind, TierEvent, TierEventKind};
use crate::tier::level::StepProfile;
use crate::tier::state::Tier;

pub fn step(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> StepOutcome {
    let (fraction, outcome) = step_core(tier, years, ctx, rng);
    build_orbital_stations(tier, fraction, ctx, rng);
    outcome
}

fn build_orbital_stations(tier: &mut Tier, fraction: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) {
    let constants = profile_constants(StepProfile::Stellar);
    if tier.tech.level < constants.construction_tech || fraction <= 0.0 {
        return;
    }
    if tier.infrastructure.orbital_stations >= MAX_ORBITAL_STATIONS {
        return;
    }
    if rng.gen::<f64>() >= constants.construction_chance * fraction {
        return;
    }

    tier.infrastructure.orbital_stations += 1;
    tier.stability.infrastructure = (tier.stability.infrastructure + ORBITAL_STATION_INFRASTRUCTURE).min(1.0);
    tier.population.carrying_capacity *= ORBITAL_STATION_CAPACITY;

    tier.active_events.push(TierEvent {
        tick: ctx.tick,
        tier: tier.id,
        kind: TierEventKind::InfrastructureBuilt { kind: InfrastructureKind::OrbitalStation },
        participants: vec![tier.id],
    });
}
