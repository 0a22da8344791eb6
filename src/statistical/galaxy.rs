//! Galactic step: galaxies and gigasegments
//!
//! The coarsest tier carries a civilization metric on a bounded 0..=3.5
//! scale. It approaches the ceiling exponentially at a pace set by tech,
//! and energy output follows it as 10^(10·K + 6) watts. Mega-events are
//! rolled here and nowhere else.

use rand_chacha::ChaCha8Rng;

use crate::statistical::constants::{KARDASHEV_MILESTONE, KARDASHEV_RATE};
use crate::statistical::events::roll_mega_event;
use crate::statistical::{step_core, StepContext, StepOutcome};
use crate::tier::events::{TierEvent, TierEventKind};
use crate::tier::state::{Civilization, Tier};

pub fn step(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> StepOutcome {
    let (fraction, mut outcome) = step_core(tier, years, ctx, rng);
    outcome.merge(advance_civilization(tier, years, ctx));
    roll_mega_event(tier, fraction, ctx, rng);
    outcome
}

/// Kardashev progress after `years` for a given tech level
pub fn kardashev_after(kardashev: f64, tech_level: u8, max_level: u8, years: f64) -> f64 {
    let tech_factor = if max_level == 0 {
        0.0
    } else {
        tech_level as f64 / max_level as f64
    };
    let gap = Civilization::MAX_KARDASHEV - kardashev;
    Civilization::MAX_KARDASHEV - gap * (-KARDASHEV_RATE * tech_factor * years).exp()
}

fn advance_civilization(tier: &mut Tier, years: f64, ctx: &StepContext<'_>) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let Some(civ) = tier.civilization else {
        return outcome;
    };

    let mut k = kardashev_after(civ.kardashev, tier.tech.level, ctx.tables.max_level(), years);
    if !k.is_finite() || !(0.0..=Civilization::MAX_KARDASHEV).contains(&k) {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, kardashev = k, "civilization metric forced into range");
        k = if k.is_finite() { k.clamp(0.0, Civilization::MAX_KARDASHEV) } else { civ.kardashev };
    }

    let milestone = |v: f64| (v / KARDASHEV_MILESTONE).floor() as i64;
    if milestone(k) > milestone(civ.kardashev) {
        tier.active_events.push(TierEvent {
            tick: ctx.tick,
            tier: tier.id,
            kind: TierEventKind::CivilizationAdvanced { kardashev: k },
            participants: vec![tier.id],
        });
    }

    tier.civilization = Some(Civilization::new(k));
    outcome
}
