//! Lookup tables precomputed once from config
//!
//! Anything that depends only on an integer tech level is computed here at
//! startup so the step functions never call `powf` per tick.

use serde::Serialize;

use crate::core::config::SimulationConfig;

/// Tech levels 0..=10
pub const TECH_TABLE_SIZE: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelTables {
    /// Research needed to advance from level i to i + 1
    tech_cost: [f64; TECH_TABLE_SIZE],
    /// Production multiplier at level i
    efficiency: [f64; TECH_TABLE_SIZE],
    /// Carrying-capacity multiplier at level i
    capacity_bonus: [f64; TECH_TABLE_SIZE],
    max_level: u8,
}

impl LevelTables {
    pub fn new(config: &SimulationConfig) -> Self {
        let tech = &config.technology;
        let mut tech_cost = [0.0; TECH_TABLE_SIZE];
        let mut efficiency = [0.0; TECH_TABLE_SIZE];
        let mut capacity_bonus = [0.0; TECH_TABLE_SIZE];

        for level in 0..TECH_TABLE_SIZE {
            let l = level as f64;
            tech_cost[level] = tech.base_cost * (l + 1.0).powf(tech.cost_exponent);
            efficiency[level] = 1.0 + l * tech.efficiency_per_level;
            capacity_bonus[level] = 1.0 + l * config.population.capacity_bonus_per_level;
        }

        Self {
            tech_cost,
            efficiency,
            capacity_bonus,
            max_level: tech.max_level.min((TECH_TABLE_SIZE - 1) as u8),
        }
    }

    pub fn tech_cost(&self, level: u8) -> f64 {
        self.tech_cost[Self::index(level)]
    }

    pub fn efficiency(&self, level: u8) -> f64 {
        self.efficiency[Self::index(level)]
    }

    pub fn capacity_bonus(&self, level: u8) -> f64 {
        self.capacity_bonus[Self::index(level)]
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    fn index(level: u8) -> usize {
        (level as usize).min(TECH_TABLE_SIZE - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_follows_power_law() {
        let tables = LevelTables::new(&SimulationConfig::default());
        assert!((tables.tech_cost(0) - 1_000.0).abs() < 1e-9);
        assert!((tables.tech_cost(1) - 4_000.0).abs() < 1e-9);
        assert!((tables.tech_cost(9) - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_costs_strictly_increase() {
        let tables = LevelTables::new(&SimulationConfig::default());
        for level in 0..10u8 {
            assert!(tables.tech_cost(level + 1) > tables.tech_cost(level));
        }
    }

    #[test]
    fn test_efficiency_and_capacity_linear() {
        let tables = LevelTables::new(&SimulationConfig::default());
        assert_eq!(tables.efficiency(0), 1.0);
        assert!((tables.efficiency(5) - 1.5).abs() < 1e-12);
        assert!((tables.capacity_bonus(2) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_level_uses_last_entry() {
        let tables = LevelTables::new(&SimulationConfig::default());
        assert_eq!(tables.tech_cost(200), tables.tech_cost(10));
    }
}
