//! Random event rolls
//!
//! Odds are scaled by the share of a nominal tick that elapsed, so a zero
//! step never rolls. Shocks saturate at the score bounds.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::statistical::StepContext;
use crate::tier::events::{MegaEventKind, TierEvent, TierEventKind};
use crate::tier::state::Tier;

/// Odds of a generic instability event this step
pub fn instability_chance(tier: &Tier, fraction: f64, ctx: &StepContext<'_>) -> f64 {
    (ctx.config.events.instability_base * (1.0 - tier.stability.overall) * fraction).clamp(0.0, 1.0)
}

pub fn roll_instability(tier: &mut Tier, fraction: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) {
    let chance = instability_chance(tier, fraction, ctx);
    if chance <= 0.0 || rng.gen::<f64>() >= chance {
        return;
    }

    let ev = &ctx.config.events;
    let severity = if ev.instability_severity_max > ev.instability_severity_min {
        rng.gen_range(ev.instability_severity_min..ev.instability_severity_max)
    } else {
        ev.instability_severity_min
    };

    tier.stability.overall = (tier.stability.overall - severity).max(0.0);
    tier.stability.happiness = (tier.stability.happiness - severity / 2.0).max(0.0);

    tier.active_events.push(TierEvent {
        tick: ctx.tick,
        tier: tier.id,
        kind: TierEventKind::Unrest { severity },
        participants: vec![tier.id],
    });
}

/// Roll the coarsest tier's mega-event table. At most one fires per step.
pub fn roll_mega_event(tier: &mut Tier, fraction: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) {
    let chance = (ctx.config.events.mega_event_base * fraction).clamp(0.0, 1.0);
    if chance <= 0.0 || rng.gen::<f64>() >= chance {
        return;
    }

    let kind = MegaEventKind::ALL[rng.gen_range(0..MegaEventKind::ALL.len())];
    apply_mega_event(tier, kind, ctx);

    tracing::info!(tier = %tier.id, ?kind, "mega-event");
    tier.active_events.push(TierEvent {
        tick: ctx.tick,
        tier: tier.id,
        kind: TierEventKind::Mega(kind),
        participants: vec![tier.id],
    });
}

pub fn apply_mega_event(tier: &mut Tier, kind: MegaEventKind, ctx: &StepContext<'_>) {
    let effect = kind.effect();
    let floor = ctx.config.population.min_viable;
    let before = tier.population.total;

    tier.population.total = (before * effect.population).max(floor);
    if before > 0.0 {
        let ratio = tier.population.total / before;
        for flow in tier.economy.resources.values_mut() {
            flow.production *= ratio;
            flow.consumption *= ratio;
        }
    }

    tier.tech.level = tier
        .tech
        .level
        .saturating_add(effect.tech_levels)
        .min(ctx.tables.max_level());
    tier.tech.efficiency = ctx.tables.efficiency(tier.tech.level);

    let shift = |v: f64| (v + effect.stability).clamp(0.0, 1.0);
    tier.stability.overall = shift(tier.stability.overall);
    tier.stability.happiness = shift(tier.stability.happiness);
    tier.stability.infrastructure = shift(tier.stability.infrastructure);
}
