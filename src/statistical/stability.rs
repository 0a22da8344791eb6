//! Stability relaxation
//!
//! Each score moves toward a target by the exact exponential-relaxation
//! fraction for the elapsed years, so scores stay convex combinations of
//! values in [0, 1].

use crate::statistical::{StepContext, StepOutcome};
use crate::tier::state::Tier;

fn relax(current: f64, target: f64, rate: f64, years: f64) -> f64 {
    let moved = current + (target - current) * (1.0 - (-rate * years).exp());
    if !(current.is_finite() && target.is_finite()) {
        return moved;
    }
    // rounding must not carry the value past either end of the interval
    moved.clamp(current.min(target), current.max(target))
}

pub fn happiness_target(tier: &Tier, ctx: &StepContext<'_>) -> f64 {
    let s = &ctx.config.stability;
    (s.neutral_happiness - s.shortage_penalty * tier.economy.shortages() as f64).clamp(0.0, 1.0)
}

pub fn infrastructure_target(tier: &Tier, ctx: &StepContext<'_>) -> f64 {
    let s = &ctx.config.stability;
    (s.infrastructure_base + s.infrastructure_per_tech * tier.tech.level as f64).clamp(0.0, 1.0)
}

pub fn advance(tier: &mut Tier, years: f64, ctx: &StepContext<'_>) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let s = &ctx.config.stability;

    let happiness = relax(tier.stability.happiness, happiness_target(tier, ctx), s.happiness_relax_rate, years);
    let infrastructure = relax(
        tier.stability.infrastructure,
        infrastructure_target(tier, ctx),
        s.infrastructure_relax_rate,
        years,
    );
    let overall = relax(
        tier.stability.overall,
        (happiness + infrastructure) / 2.0,
        s.overall_relax_rate,
        years,
    );

    for (value, slot) in [
        (happiness, &mut tier.stability.happiness),
        (infrastructure, &mut tier.stability.infrastructure),
        (overall, &mut tier.stability.overall),
    ] {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            *slot = value;
        } else {
            outcome.clamps += 1;
            *slot = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.5 };
        }
    }
    if outcome.clamps > 0 {
        tracing::warn!(tier = %tier.id, clamps = outcome.clamps, "stability score forced into [0, 1]");
    }

    outcome
}
