//! Property and scenario tests for the statistical step functions

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use strata::generation::{ProceduralGenerator, TierSource};
use strata::statistical::technology::research_gain;
use strata::statistical::{advance_tier, prime_tier, LevelTables, StepContext};
use strata::tier::{ResourceKind, StepProfile, TierEventKind, TierLadder, TierLevel, TierSeed, TierTree};
use strata::{SimulationConfig, SimulationController};

fn single_tier(seed: TierSeed) -> SimulationController {
    let tree = TierTree::new(seed).unwrap();
    let mut sim = SimulationController::from_tree(SimulationConfig::default(), tree).unwrap();
    sim.start();
    sim
}

fn assert_sane(sim: &SimulationController) {
    let config = sim.config();
    for tier in sim.tree().iter() {
        assert!(
            tier.population.total >= config.population.min_viable,
            "{} population {} below floor",
            tier.name,
            tier.population.total
        );
        assert!(tier.population.total.is_finite());
        for flow in tier.economy.resources.values() {
            assert!(flow.stockpile >= 0.0 && flow.stockpile.is_finite());
            assert!(flow.production >= 0.0 && flow.consumption >= 0.0);
        }
        assert!(tier.tech.level <= config.technology.max_level);
        assert!(tier.tech.research >= 0.0);
        assert!(tier.stability.in_bounds(), "{} stability {:?}", tier.name, tier.stability);
        if let Some(civ) = tier.civilization {
            assert!((0.0..=3.5).contains(&civ.kardashev));
        }
    }
}

#[test]
fn test_zero_delta_changes_nothing_numerically() {
    let config = SimulationConfig::default();
    let tables = LevelTables::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut tree = ProceduralGenerator::new(TierLadder::Astronomical, 2, 11).build(4).unwrap();

    for tier in tree.iter_mut() {
        prime_tier(tier, &tables);
        let before = tier.clone();
        let ctx = StepContext { config: &config, tables: &tables, tick: 0 };
        let outcome = advance_tier(tier, 0.0, &ctx, &mut rng);

        let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * b.abs().max(1.0);
        assert_eq!(outcome.clamps, 0);
        assert!(close(tier.population.total, before.population.total));
        assert_eq!(tier.tech, before.tech);
        assert_eq!(tier.stability, before.stability);
        assert!(tier.active_events.is_empty());
        for (kind, flow) in &tier.economy.resources {
            assert!(close(flow.stockpile, before.economy.stockpile(*kind)));
        }
    }
}

#[test]
fn test_tiny_delta_is_well_behaved() {
    let config = SimulationConfig::default();
    let tables = LevelTables::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut tree = ProceduralGenerator::new(TierLadder::Habitat, 1, 12).build(6).unwrap();

    for tier in tree.iter_mut() {
        prime_tier(tier, &tables);
        for tick in 0..100 {
            let ctx = StepContext { config: &config, tables: &tables, tick };
            let outcome = advance_tier(tier, 1e-12, &ctx, &mut rng);
            assert_eq!(outcome.clamps, 0);
        }
        assert!(tier.population.total.is_finite());
        assert!(tier.stability.in_bounds());
    }
}

#[test]
fn test_tech_advancement_carries_overflow() {
    let mut sim = single_tier(
        TierSeed::new("Terra", TierLevel::Planet)
            .with_population(1_000_000.0, 10_000_000.0)
            .with_tech(0, 998.0),
    );
    let id = sim.tree().root_id();
    let population = sim.get_tier_by_id(id).unwrap().population.clone();
    let gain = research_gain(&population, StepProfile::Planetary, TierLevel::Planet.time_scale());
    let cost = LevelTables::new(sim.config()).tech_cost(0);
    assert!(998.0 + gain >= cost);

    sim.update(1.0).unwrap();

    let tech = &sim.get_tier_by_id(id).unwrap().tech;
    assert_eq!(tech.level, 1);
    assert!((tech.research - (998.0 + gain - cost)).abs() < 1e-9);
    assert!(tech.research > 0.0);
    assert!(tech.efficiency > 1.0);
    assert_eq!(sim.stats().clamp_hits, 0);
}

#[test]
fn test_stability_collapse_declines_to_floor() {
    let mut sim = single_tier(
        TierSeed::new("Ruin", TierLevel::Planet)
            .with_population(1_000_000.0, 10_000_000.0)
            .with_stability(0.1, 0.1, 0.1),
    );
    let id = sim.tree().root_id();
    let threshold = sim.config().population.decline_threshold;
    let floor = sim.config().population.min_viable;

    let mut previous = sim.get_tier_by_id(id).unwrap().population.total;
    for _ in 0..10 {
        assert!(sim.get_tier_by_id(id).unwrap().stability.overall < threshold);
        sim.update(1.0).unwrap();
        let now = sim.get_tier_by_id(id).unwrap().population.total;
        assert!(now < previous, "population did not decline: {} -> {}", previous, now);
        assert!(now >= floor);
        previous = now;
    }
    assert_eq!(sim.stats().clamp_hits, 0);
}

#[test]
fn test_collapse_never_breaches_floor() {
    let mut sim = single_tier(
        TierSeed::new("Outpost", TierLevel::Planet)
            .with_population(12.0, 1_000.0)
            .with_stability(0.0, 0.0, 0.0),
    );
    let id = sim.tree().root_id();
    let floor = sim.config().population.min_viable;
    sim.run_frames(5, 1.0).unwrap();

    assert_eq!(sim.get_tier_by_id(id).unwrap().population.total, floor);
    assert!(sim
        .events()
        .iter()
        .any(|e| matches!(e.event.kind, TierEventKind::PopulationCollapse { .. })));
    assert_eq!(sim.stats().clamp_hits, 0);
}

#[test]
fn test_deficit_runs_dry_without_going_negative() {
    let mut sim = single_tier(
        TierSeed::new("Arid", TierLevel::Planet)
            .with_population(1_000.0, 10_000.0)
            .with_resource(ResourceKind::Water, 100.0, 400.0, 500.0),
    );
    let id = sim.tree().root_id();
    sim.run_frames(5, 1.0).unwrap();

    let flow = *sim.get_tier_by_id(id).unwrap().economy.get(ResourceKind::Water).unwrap();
    assert_eq!(flow.stockpile, 0.0);
    assert!(flow.shortage);
    assert_eq!(sim.stats().clamp_hits, 0);
}

fn ladder_strategy() -> impl Strategy<Value = TierLadder> {
    prop_oneof![Just(TierLadder::Astronomical), Just(TierLadder::Habitat)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn property_no_negative_state(
        ladder in ladder_strategy(),
        seed in 0_u64..10_000,
        speed in 0.1_f64..20.0,
        deltas in prop::collection::vec(0.0_f64..6.0, 1..60),
    ) {
        let mut config = SimulationConfig::default();
        config.controller.seed = seed;
        let depth = ladder.levels().len().min(4);
        let generator = ProceduralGenerator::new(ladder, 2, seed);
        let mut sim = SimulationController::new(config, Box::new(generator), depth).unwrap();
        sim.start();
        sim.set_speed(speed);

        for delta in deltas {
            sim.update(delta).unwrap();
            assert_sane(&sim);
        }
        prop_assert_eq!(sim.stats().clamp_hits, 0);
    }

    #[test]
    fn property_deterministic_given_seed(
        seed in 0_u64..10_000,
        deltas in prop::collection::vec(0.0_f64..3.0, 1..40),
    ) {
        let run = |deltas: &[f64]| {
            let mut config = SimulationConfig::default();
            config.controller.seed = seed;
            config.events.instability_base = 0.5;
            config.events.mega_event_base = 0.2;
            let generator = ProceduralGenerator::new(TierLadder::Astronomical, 2, seed);
            let mut sim = SimulationController::new(config, Box::new(generator), 3).unwrap();
            sim.start();
            for delta in deltas {
                sim.update(*delta).unwrap();
            }
            sim
        };

        let a = run(&deltas);
        let b = run(&deltas);

        let events_a: Vec<_> = a.events().iter().cloned().collect();
        let events_b: Vec<_> = b.events().iter().cloned().collect();
        prop_assert_eq!(events_a, events_b);

        let tiers_a: Vec<_> = a.tree().iter().cloned().collect();
        let tiers_b: Vec<_> = b.tree().iter().cloned().collect();
        prop_assert_eq!(tiers_a, tiers_b);
        prop_assert_eq!(a.stats(), b.stats());
    }
}
