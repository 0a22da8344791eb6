//! Tier summaries and the instantiation contract derived from them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, TierId};
use crate::tier::level::TierLevel;
use crate::tier::state::{ResourceFlow, ResourceKind, RoleDistribution, Stability};

/// Immutable statistical snapshot of a tier and its active descendants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: TierId,
    pub level: TierLevel,
    /// `ticks_simulated` of the tier when the snapshot was taken
    pub ticks_simulated: u64,
    /// The tier itself followed by its active descendants, pre-order
    pub included: Vec<TierId>,
    pub population: f64,
    pub carrying_capacity: f64,
    pub roles: RoleDistribution,
    pub economy: BTreeMap<ResourceKind, ResourceFlow>,
    pub tech_level: u8,
    pub research: f64,
    pub efficiency: f64,
    /// Population-weighted across included tiers
    pub stability: Stability,
    pub belief_density: f64,
    pub dominant_influence: Option<ActorId>,
}

impl TierSummary {
    pub fn total_stockpile(&self) -> f64 {
        self.economy.values().map(|f| f.stockpile).sum()
    }

    pub fn total_production(&self) -> f64 {
        self.economy.values().map(|f| f.production).sum()
    }
}

/// Relative slack the detailed engine may use around the target population
pub const POPULATION_TOLERANCE: f64 = 0.01;

/// Bounds the detailed engine must respect when it populates a freshly
/// activated tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiationConstraints {
    pub tier: TierId,
    pub level: TierLevel,
    pub target_population: f64,
    pub min_population: f64,
    pub max_population: f64,
    /// Head counts per role, derived from the role fractions
    pub role_targets: RoleDistribution,
    pub stockpiles: BTreeMap<ResourceKind, f64>,
    pub production: BTreeMap<ResourceKind, f64>,
    pub consumption: BTreeMap<ResourceKind, f64>,
    pub tech_level: u8,
    pub stability: Stability,
    pub belief_density: f64,
    pub dominant_influence: Option<ActorId>,
}

impl InstantiationConstraints {
    pub fn from_summary(summary: &TierSummary) -> Self {
        let p = summary.population;
        let r = &summary.roles;

        Self {
            tier: summary.tier,
            level: summary.level,
            target_population: p,
            min_population: p * (1.0 - POPULATION_TOLERANCE),
            max_population: p * (1.0 + POPULATION_TOLERANCE),
            role_targets: RoleDistribution {
                workers: p * r.workers,
                researchers: p * r.researchers,
                military: p * r.military,
                children: p * r.children,
                elderly: p * r.elderly,
            },
            stockpiles: summary.economy.iter().map(|(k, f)| (*k, f.stockpile)).collect(),
            production: summary.economy.iter().map(|(k, f)| (*k, f.production)).collect(),
            consumption: summary.economy.iter().map(|(k, f)| (*k, f.consumption)).collect(),
            tech_level: summary.tech_level,
            stability: summary.stability,
            belief_density: summary.belief_density,
            dominant_influence: summary.dominant_influence,
        }
    }

    pub fn total_stockpile(&self) -> f64 {
        self.stockpiles.values().sum()
    }

    /// True if a detailed population count honors the contract
    pub fn accepts_population(&self, count: f64) -> bool {
        count >= self.min_population && count <= self.max_population
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> TierSummary {
        let mut economy = BTreeMap::new();
        economy.insert(ResourceKind::Food, ResourceFlow::new(10.0, 8.0, 100.0));
        TierSummary {
            tier: TierId(4),
            level: TierLevel::Planet,
            ticks_simulated: 3,
            included: vec![TierId(4)],
            population: 1_000.0,
            carrying_capacity: 5_000.0,
            roles: RoleDistribution::default(),
            economy,
            tech_level: 2,
            research: 10.0,
            efficiency: 1.2,
            stability: Stability::default(),
            belief_density: 0.0,
            dominant_influence: None,
        }
    }

    #[test]
    fn test_constraints_project_summary() {
        let constraints = InstantiationConstraints::from_summary(&summary());
        assert_eq!(constraints.target_population, 1_000.0);
        assert_eq!(constraints.stockpiles[&ResourceKind::Food], 100.0);
        assert_eq!(constraints.tech_level, 2);
        assert!((constraints.role_targets.researchers - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_population_window() {
        let constraints = InstantiationConstraints::from_summary(&summary());
        assert!(constraints.accepts_population(1_000.0));
        assert!(constraints.accepts_population(1_005.0));
        assert!(!constraints.accepts_population(1_100.0));
        assert!(!constraints.accepts_population(0.0));
    }
}
