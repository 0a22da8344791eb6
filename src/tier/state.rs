//! Tier node state: population, economy, technology, stability
//!
//! Population roles are fractions of the total, not independently
//! simulated groups. Economy figures are totals for the whole tier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::TierId;
use crate::tier::address::TierAddress;
use crate::tier::events::TierEvent;
use crate::tier::level::TierLevel;

/// Who advances a tier each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationMode {
    /// Simulated entity-by-entity by the detailed engine
    Active,
    /// Advanced by the statistical step functions
    Abstract,
}

/// Age/role split of a population, as fractions summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleDistribution {
    pub workers: f64,
    pub researchers: f64,
    pub military: f64,
    pub children: f64,
    pub elderly: f64,
}

impl Default for RoleDistribution {
    fn default() -> Self {
        Self {
            workers: 0.45,
            researchers: 0.05,
            military: 0.05,
            children: 0.3,
            elderly: 0.15,
        }
    }
}

impl RoleDistribution {
    pub fn sum(&self) -> f64 {
        self.workers + self.researchers + self.military + self.children + self.elderly
    }

    fn fractions(&self) -> [f64; 5] {
        [self.workers, self.researchers, self.military, self.children, self.elderly]
    }

    /// Weighted blend of two distributions (`weight` applies to `other`)
    pub fn blend(&self, other: &RoleDistribution, weight: f64) -> RoleDistribution {
        let mix = |a: f64, b: f64| a + (b - a) * weight;
        RoleDistribution {
            workers: mix(self.workers, other.workers),
            researchers: mix(self.researchers, other.researchers),
            military: mix(self.military, other.military),
            children: mix(self.children, other.children),
            elderly: mix(self.elderly, other.elderly),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub total: f64,
    /// Per-tier multiplier on the level's intrinsic growth rate
    pub growth_rate: f64,
    pub carrying_capacity: f64,
    pub roles: RoleDistribution,
}

impl Population {
    pub fn researchers(&self) -> f64 {
        self.total * self.roles.researchers
    }

    pub fn workers(&self) -> f64 {
        self.total * self.roles.workers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Water,
    Energy,
    Materials,
    Luxuries,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Food,
        ResourceKind::Water,
        ResourceKind::Energy,
        ResourceKind::Materials,
        ResourceKind::Luxuries,
    ];
}

/// Rates are per simulated year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceFlow {
    pub production: f64,
    pub consumption: f64,
    pub stockpile: f64,
    /// Set when the last step ran the stockpile dry
    pub shortage: bool,
}

impl ResourceFlow {
    pub fn new(production: f64, consumption: f64, stockpile: f64) -> Self {
        Self {
            production,
            consumption,
            stockpile,
            shortage: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    pub resources: BTreeMap<ResourceKind, ResourceFlow>,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&ResourceFlow> {
        self.resources.get(&kind)
    }

    pub fn set(&mut self, kind: ResourceKind, flow: ResourceFlow) {
        self.resources.insert(kind, flow);
    }

    pub fn stockpile(&self, kind: ResourceKind) -> f64 {
        self.resources.get(&kind).map(|f| f.stockpile).unwrap_or(0.0)
    }

    pub fn total_production(&self) -> f64 {
        self.resources.values().map(|f| f.production).sum()
    }

    pub fn total_consumption(&self) -> f64 {
        self.resources.values().map(|f| f.consumption).sum()
    }

    pub fn total_stockpile(&self) -> f64 {
        self.resources.values().map(|f| f.stockpile).sum()
    }

    /// Volume satisfied internally: production that meets consumption
    pub fn trade_volume(&self) -> f64 {
        self.resources
            .values()
            .map(|f| f.production.min(f.consumption))
            .sum()
    }

    pub fn shortages(&self) -> usize {
        self.resources.values().filter(|f| f.shortage).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub level: u8,
    /// Research accumulated toward the next level
    pub research: f64,
    /// Derived: 1 + level × efficiency_per_level
    pub efficiency: f64,
}

impl Default for Technology {
    fn default() -> Self {
        Self {
            level: 0,
            research: 0.0,
            efficiency: 1.0,
        }
    }
}

/// All scores lie in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stability {
    pub overall: f64,
    pub happiness: f64,
    pub infrastructure: f64,
}

impl Default for Stability {
    fn default() -> Self {
        Self {
            overall: 0.6,
            happiness: 0.6,
            infrastructure: 0.5,
        }
    }
}

impl Stability {
    pub fn in_bounds(&self) -> bool {
        [self.overall, self.happiness, self.infrastructure]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// Large-scale construction accumulated by intermediate tiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    pub orbital_stations: u32,
    pub wormhole_links: u32,
    pub megastructures: u32,
}

impl Infrastructure {
    pub fn total(&self) -> u32 {
        self.orbital_stations + self.wormhole_links + self.megastructures
    }
}

/// Civilization progression tracked at the coarsest tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    /// Kardashev-style scale, 0.0..=3.5
    pub kardashev: f64,
    /// Watts, 10^(10·K + 6)
    pub energy_output: f64,
}

impl Civilization {
    pub const MAX_KARDASHEV: f64 = 3.5;

    pub fn new(kardashev: f64) -> Self {
        let kardashev = kardashev.clamp(0.0, Self::MAX_KARDASHEV);
        Self {
            kardashev,
            energy_output: energy_output(kardashev),
        }
    }
}

pub fn energy_output(kardashev: f64) -> f64 {
    10f64.powf(10.0 * kardashev + 6.0)
}

/// One node of the tier tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    pub level: TierLevel,
    pub address: TierAddress,
    pub mode: SimulationMode,
    /// Fraction of the level's time scale currently applied
    pub time_scale: f64,
    pub population: Population,
    pub economy: Economy,
    pub tech: Technology,
    pub stability: Stability,
    pub infrastructure: Infrastructure,
    pub civilization: Option<Civilization>,
    /// Owned children, in coordinate order
    pub children: Vec<TierId>,
    /// Events raised this tick, drained by the controller
    pub active_events: Vec<TierEvent>,
    /// Ticks this tier has been advanced, by either regime
    pub ticks_simulated: u64,
}

impl Tier {
    pub(crate) fn from_seed(id: TierId, address: TierAddress, seed: TierSeed) -> Self {
        let civilization = if seed.level.coarser().is_none() {
            Some(Civilization::new(seed.kardashev))
        } else {
            None
        };

        Self {
            id,
            name: seed.name,
            level: seed.level,
            address,
            mode: SimulationMode::Abstract,
            time_scale: 1.0,
            population: Population {
                total: seed.population,
                growth_rate: seed.growth_rate,
                carrying_capacity: seed.carrying_capacity,
                roles: seed.roles,
            },
            economy: seed.economy,
            tech: Technology {
                level: seed.tech_level,
                research: seed.research,
                efficiency: 1.0,
            },
            stability: seed.stability,
            infrastructure: Infrastructure::default(),
            civilization,
            children: Vec::new(),
            active_events: Vec::new(),
            ticks_simulated: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.mode == SimulationMode::Active
    }

    pub fn is_abstract(&self) -> bool {
        self.mode == SimulationMode::Abstract
    }

    /// Years this tier advances for a controller delta of `delta`
    pub fn effective_years(&self, delta: f64) -> f64 {
        delta * self.level.time_scale() * self.time_scale
    }
}

/// Initial values supplied by content generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSeed {
    pub name: String,
    pub level: TierLevel,
    pub population: f64,
    pub growth_rate: f64,
    pub carrying_capacity: f64,
    pub roles: RoleDistribution,
    pub economy: Economy,
    pub tech_level: u8,
    pub research: f64,
    pub stability: Stability,
    /// Only used by the coarsest level
    pub kardashev: f64,
}

impl TierSeed {
    pub fn new(name: impl Into<String>, level: TierLevel) -> Self {
        Self {
            name: name.into(),
            level,
            population: 1_000.0,
            growth_rate: 1.0,
            carrying_capacity: 10_000.0,
            roles: RoleDistribution::default(),
            economy: Economy::new(),
            tech_level: 0,
            research: 0.0,
            stability: Stability::default(),
            kardashev: 0.0,
        }
    }

    pub fn with_population(mut self, total: f64, carrying_capacity: f64) -> Self {
        self.population = total;
        self.carrying_capacity = carrying_capacity;
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    pub fn with_roles(mut self, roles: RoleDistribution) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_resource(mut self, kind: ResourceKind, production: f64, consumption: f64, stockpile: f64) -> Self {
        self.economy
            .set(kind, ResourceFlow::new(production, consumption, stockpile));
        self
    }

    pub fn with_tech(mut self, level: u8, research: f64) -> Self {
        self.tech_level = level;
        self.research = research;
        self
    }

    pub fn with_stability(mut self, overall: f64, happiness: f64, infrastructure: f64) -> Self {
        self.stability = Stability {
            overall,
            happiness,
            infrastructure,
        };
        self
    }

    pub fn with_kardashev(mut self, kardashev: f64) -> Self {
        self.kardashev = kardashev;
        self
    }

    /// Reject seeds no step function can work with. Content errors are
    /// fatal at construction time.
    pub fn validate(&self, max_tech_level: u8) -> Result<()> {
        let bad = |msg: String| Err(SimError::InvalidConfig(format!("tier '{}': {}", self.name, msg)));

        for (label, value) in [
            ("population", self.population),
            ("growth_rate", self.growth_rate),
            ("carrying_capacity", self.carrying_capacity),
            ("research", self.research),
            ("kardashev", self.kardashev),
        ] {
            if !value.is_finite() || value < 0.0 {
                return bad(format!("{} must be finite and >= 0, got {}", label, value));
            }
        }
        if self.kardashev > Civilization::MAX_KARDASHEV {
            return bad(format!("kardashev {} exceeds {}", self.kardashev, Civilization::MAX_KARDASHEV));
        }
        if self.tech_level > max_tech_level {
            return bad(format!("tech level {} exceeds max {}", self.tech_level, max_tech_level));
        }
        if !self.stability.in_bounds() {
            return bad(format!("stability {:?} outside [0, 1]", self.stability));
        }
        if self.roles.fractions().iter().any(|f| !f.is_finite() || *f < 0.0)
            || (self.roles.sum() - 1.0).abs() > 1e-6
        {
            return bad(format!("role fractions must be >= 0 and sum to 1, got {}", self.roles.sum()));
        }
        for (kind, flow) in &self.economy.resources {
            for value in [flow.production, flow.consumption, flow.stockpile] {
                if !value.is_finite() || value < 0.0 {
                    return bad(format!("{:?} flow has negative or non-finite value {}", kind, value));
                }
            }
        }
        Ok(())
    }
}
