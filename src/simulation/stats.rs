//! Aggregate statistics recomputed once per tick

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::tier::tree::TierTree;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub tick: Tick,
    pub total_population: f64,
    pub total_production: f64,
    pub total_consumption: f64,
    pub trade_volume: f64,
    /// Population-weighted mean tech efficiency
    pub efficiency: f64,
    /// Mean overall stability across tiers
    pub average_stability: f64,
    pub active_tiers: usize,
    pub abstract_tiers: usize,
    pub total_tiers: usize,
    /// Safety clamps fired since the last reset
    pub clamp_hits: u64,
    pub events_this_tick: usize,
}

impl SimulationStats {
    /// One pass over every tier in the tree
    pub fn collect(tree: &TierTree, tick: Tick, clamp_hits: u64, events_this_tick: usize) -> Self {
        let mut stats = SimulationStats {
            tick,
            clamp_hits,
            events_this_tick,
            ..Default::default()
        };

        let mut weighted_efficiency = 0.0;
        let mut stability_sum = 0.0;

        for tier in tree.iter() {
            let population = tier.population.total;
            stats.total_population += population;
            stats.total_production += tier.economy.total_production();
            stats.total_consumption += tier.economy.total_consumption();
            stats.trade_volume += tier.economy.trade_volume();
            weighted_efficiency += tier.tech.efficiency * population;
            stability_sum += tier.stability.overall;

            if tier.is_active() {
                stats.active_tiers += 1;
            } else {
                stats.abstract_tiers += 1;
            }
            stats.total_tiers += 1;
        }

        if stats.total_population > 0.0 {
            stats.efficiency = weighted_efficiency / stats.total_population;
        }
        if stats.total_tiers > 0 {
            stats.average_stability = stability_sum / stats.total_tiers as f64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::level::TierLevel;
    use crate::tier::state::{ResourceKind, SimulationMode, TierSeed};

    #[test]
    fn test_collect_sums_every_tier() {
        let mut tree = TierTree::new(
            TierSeed::new("Sol", TierLevel::System)
                .with_population(3_000.0, 10_000.0)
                .with_resource(ResourceKind::Food, 10.0, 4.0, 0.0),
        )
        .unwrap();
        let root = tree.root_id();
        let child = tree
            .insert_child(
                root,
                TierSeed::new("Mars", TierLevel::Planet)
                    .with_population(1_000.0, 5_000.0)
                    .with_resource(ResourceKind::Food, 2.0, 6.0, 0.0),
            )
            .unwrap();
        tree.get_mut(child).unwrap().mode = SimulationMode::Active;

        let stats = SimulationStats::collect(&tree, 7, 0, 2);
        assert_eq!(stats.tick, 7);
        assert_eq!(stats.total_population, 4_000.0);
        assert_eq!(stats.total_production, 12.0);
        assert_eq!(stats.total_consumption, 10.0);
        assert_eq!(stats.trade_volume, 4.0 + 2.0);
        assert_eq!(stats.active_tiers, 1);
        assert_eq!(stats.abstract_tiers, 1);
        assert_eq!(stats.total_tiers, 2);
        assert_eq!(stats.events_this_tick, 2);
        assert!((stats.efficiency - 1.0).abs() < 1e-12);
    }
}
