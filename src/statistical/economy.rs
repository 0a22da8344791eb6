//! Stockpile dynamics
//!
//! Each resource follows dS/dt = a − d·S, where a is effective production
//! minus consumption and d the spoilage rate. Running dry through a
//! deficit is a shortage, not an error.

use crate::statistical::{finite_or, StepContext, StepOutcome};
use crate::tier::state::Tier;

/// Production multiplier from the infrastructure sub-score, linear around
/// the configured midpoint
pub fn infrastructure_modifier(infrastructure: f64, ctx: &StepContext<'_>) -> f64 {
    let e = &ctx.config.economy;
    (1.0 + (infrastructure - e.infrastructure_midpoint) * e.infrastructure_sensitivity).max(0.0)
}

/// Exact solution of dS/dt = a − d·S after `t`
pub fn stockpile_after(s0: f64, net: f64, decay: f64, t: f64) -> f64 {
    if decay > 0.0 {
        let equilibrium = net / decay;
        equilibrium + (s0 - equilibrium) * (-decay * t).exp()
    } else {
        s0 + net * t
    }
}

pub fn advance(tier: &mut Tier, years: f64, ctx: &StepContext<'_>) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let multiplier = tier.tech.efficiency * infrastructure_modifier(tier.stability.infrastructure, ctx);
    let decay = ctx.config.economy.decay_rate;

    let mut results = Vec::with_capacity(tier.economy.resources.len());
    for (kind, flow) in &tier.economy.resources {
        let net = flow.production * multiplier - flow.consumption;
        let raw = stockpile_after(flow.stockpile, net, decay, years);
        results.push((*kind, net, raw));
    }

    for (kind, net, raw) in results {
        let raw = finite_or(raw, 0.0, &mut outcome, tier, "stockpile");
        if let Some(flow) = tier.economy.resources.get_mut(&kind) {
            flow.shortage = net < 0.0 && raw <= 0.0;
            if flow.shortage {
                outcome.shortages += 1;
            }
            flow.stockpile = raw.max(0.0);
        }
    }

    outcome
}
