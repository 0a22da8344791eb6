//! Logistic growth and unstable decline
//!
//! Growth uses the closed-form logistic solution so large steps cannot
//! overshoot the carrying capacity. Below the decline threshold the
//! population shrinks exponentially toward the minimum viable floor.

use crate::statistical::constants::profile_constants;
use crate::statistical::{StepContext, StepOutcome};
use crate::tier::events::{TierEvent, TierEventKind};
use crate::tier::level::StepProfile;
use crate::tier::state::Tier;

/// Growth-rate multiplier for a happiness score in [0, 1]
pub fn happiness_multiplier(happiness: f64, ctx: &StepContext<'_>) -> f64 {
    let p = &ctx.config.population;
    let h = happiness.clamp(0.0, 1.0);
    p.happiness_growth_min + (p.happiness_growth_max - p.happiness_growth_min) * h
}

/// Exact solution of dP/dt = r·P·(1 − P/K) after `t`
pub fn logistic(p0: f64, k: f64, r: f64, t: f64) -> f64 {
    if p0 <= 0.0 || k <= 0.0 {
        return 0.0;
    }
    k / (1.0 + (k / p0 - 1.0) * (-r * t).exp())
}

/// Carrying capacity after the tech bonus
pub fn effective_capacity(tier: &Tier, ctx: &StepContext<'_>) -> f64 {
    tier.population.carrying_capacity * ctx.tables.capacity_bonus(tier.tech.level)
}

pub fn advance(tier: &mut Tier, years: f64, profile: StepProfile, ctx: &StepContext<'_>) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let floor = ctx.config.population.min_viable;
    let constants = profile_constants(profile);
    let before = tier.population.total;

    let mut after = if tier.stability.overall < ctx.config.population.decline_threshold {
        let declined = before * (-constants.decline_rate * years).exp();
        if declined < floor && before < floor {
            outcome.clamps += 1;
            tracing::warn!(tier = %tier.id, population = before, floor, "declining population already below minimum viable floor");
        }
        let declined = declined.max(floor);
        if before > floor && declined <= floor {
            tier.active_events.push(TierEvent {
                tick: ctx.tick,
                tier: tier.id,
                kind: TierEventKind::PopulationCollapse { from: before, to: declined },
                participants: vec![tier.id],
            });
        }
        declined
    } else {
        let r = constants.growth_rate * tier.population.growth_rate * happiness_multiplier(tier.stability.happiness, ctx);
        let k = effective_capacity(tier, ctx);
        logistic(before, k, r, years)
    };

    if !after.is_finite() {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, "population went non-finite");
        after = before.max(floor);
    }
    if after < floor {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, population = after, floor, "population raised to minimum viable floor");
        after = floor;
    }

    let collapse_fraction = ctx.config.events.collapse_fraction;
    let already_reported = tier
        .active_events
        .iter()
        .any(|e| matches!(e.kind, TierEventKind::PopulationCollapse { .. }));
    if !already_reported && collapse_fraction > 0.0 && before > 0.0 && (before - after) / before > collapse_fraction {
        tier.active_events.push(TierEvent {
            tick: ctx.tick,
            tier: tier.id,
            kind: TierEventKind::PopulationCollapse { from: before, to: after },
            participants: vec![tier.id],
        });
    }

    tier.population.total = after;

    // Economy totals follow the population they feed
    if before > 0.0 && after != before {
        let ratio = after / before;
        for flow in tier.economy.resources.values_mut() {
            flow.production *= ratio;
            flow.consumption *= ratio;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::TierId;
    use crate::statistical::LevelTables;
    use crate::tier::address::TierAddress;
    use crate::tier::level::TierLevel;
    use crate::tier::state::{ResourceKind, TierSeed};

    fn planet(population: f64, capacity: f64) -> Tier {
        Tier::from_seed(
            TierId(1),
            TierAddress::root(),
            TierSeed::new("Terra", TierLevel::Planet).with_population(population, capacity),
        )
    }

    #[test]
    fn test_logistic_converges_to_capacity() {
        let p = logistic(100.0, 1_000.0, 0.5, 1_000.0);
        assert!((p - 1_000.0).abs() < 1e-6);
        assert!((logistic(100.0, 1_000.0, 0.5, 0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_logistic_above_capacity_shrinks_toward_it() {
        let p = logistic(2_000.0, 1_000.0, 0.1, 5.0);
        assert!(p < 2_000.0 && p > 1_000.0);
    }

    #[test]
    fn test_happiness_multiplier_range() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };
        assert_eq!(happiness_multiplier(0.0, &ctx), 0.5);
        assert_eq!(happiness_multiplier(1.0, &ctx), 1.5);
        assert_eq!(happiness_multiplier(7.0, &ctx), 1.5);
    }

    #[test]
    fn test_stable_tier_grows_without_passing_capacity() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };

        let mut tier = planet(1_000.0, 10_000.0);
        for _ in 0..100 {
            let outcome = advance(&mut tier, 10.0, StepProfile::Planetary, &ctx);
            assert_eq!(outcome.clamps, 0);
        }
        assert!(tier.population.total > 1_000.0);
        assert!(tier.population.total <= effective_capacity(&tier, &ctx) + 1e-6);
    }

    #[test]
    fn test_unstable_tier_declines_to_floor() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };

        let mut tier = planet(1_000.0, 10_000.0);
        tier.stability.overall = 0.1;

        let mut last = tier.population.total;
        for _ in 0..10 {
            advance(&mut tier, 10.0, StepProfile::Planetary, &ctx);
            assert!(tier.population.total < last);
            last = tier.population.total;
        }

        for _ in 0..1_000 {
            let outcome = advance(&mut tier, 10.0, StepProfile::Planetary, &ctx);
            assert_eq!(outcome.clamps, 0);
        }
        assert_eq!(tier.population.total, config.population.min_viable);
        assert!(tier
            .active_events
            .iter()
            .any(|e| matches!(e.kind, TierEventKind::PopulationCollapse { .. })));
    }

    #[test]
    fn test_economy_scales_with_population() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };

        let mut tier = Tier::from_seed(
            TierId(1),
            TierAddress::root(),
            TierSeed::new("Terra", TierLevel::Planet)
                .with_population(1_000.0, 10_000.0)
                .with_resource(ResourceKind::Food, 100.0, 80.0, 0.0),
        );
        advance(&mut tier, 10.0, StepProfile::Planetary, &ctx);

        let ratio = tier.population.total / 1_000.0;
        let food = tier.economy.get(ResourceKind::Food).unwrap();
        assert!((food.production - 100.0 * ratio).abs() < 1e-9);
        assert!((food.consumption - 80.0 * ratio).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_capacity_hits_clamp() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };

        let mut tier = planet(20.0, 1.0);
        let mut clamps = 0;
        for _ in 0..200 {
            clamps += advance(&mut tier, 10.0, StepProfile::Planetary, &ctx).clamps;
        }
        assert!(clamps > 0, "a capacity below the floor is a content error the clamp must surface");
        assert_eq!(tier.population.total, config.population.min_viable);
    }

    #[test]
    fn test_declining_tier_below_floor_counts_clamp() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };

        let mut tier = planet(5.0, 10_000.0);
        tier.stability.overall = 0.1;
        let outcome = advance(&mut tier, 10.0, StepProfile::Planetary, &ctx);
        assert_eq!(outcome.clamps, 1);
        assert_eq!(tier.population.total, config.population.min_viable);
    }
}
