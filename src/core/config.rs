//! Simulation configuration with documented constants
//!
//! All tunable magic numbers are collected here. Per-level magnitudes
//! (growth rates, research rates, construction odds) live in
//! `statistical::constants`; everything here applies to every tier level.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the whole simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub population: PopulationConfig,
    pub technology: TechnologyConfig,
    pub economy: EconomyConfig,
    pub stability: StabilityConfig,
    pub events: EventConfig,
    pub belief: BeliefConfig,
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Minimum viable population. Neither growth nor decline takes a tier
    /// below this; extinction is never a side effect of rounding.
    pub min_viable: f64,

    /// Growth-rate multiplier at happiness 0.0
    pub happiness_growth_min: f64,

    /// Growth-rate multiplier at happiness 1.0
    pub happiness_growth_max: f64,

    /// Below this overall stability a tier declines instead of growing
    pub decline_threshold: f64,

    /// Carrying-capacity bonus per tech level (K × (1 + level × bonus))
    pub capacity_bonus_per_level: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_viable: 10.0,
            happiness_growth_min: 0.5,
            happiness_growth_max: 1.5,
            decline_threshold: 0.3,
            capacity_bonus_per_level: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnologyConfig {
    /// Highest reachable tech level. Tables are sized for 0..=10.
    pub max_level: u8,

    /// cost(level) = base_cost × (level + 1)^cost_exponent
    pub base_cost: f64,
    pub cost_exponent: f64,

    /// efficiency(level) = 1 + level × efficiency_per_level
    pub efficiency_per_level: f64,
}

impl Default for TechnologyConfig {
    fn default() -> Self {
        Self {
            max_level: 10,
            base_cost: 1_000.0,
            cost_exponent: 2.0,
            efficiency_per_level: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Fraction of a stockpile lost to spoilage per simulated year
    pub decay_rate: f64,

    /// Production multiplier swing across the infrastructure range.
    /// At 1.0 the modifier spans 0.5..=1.5 around the midpoint.
    pub infrastructure_sensitivity: f64,

    /// Infrastructure score at which the modifier is exactly 1.0
    pub infrastructure_midpoint: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.01,
            infrastructure_sensitivity: 1.0,
            infrastructure_midpoint: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Happiness target when every resource is in surplus
    pub neutral_happiness: f64,

    /// Happiness target reduction per resource in shortage
    pub shortage_penalty: f64,

    /// Infrastructure target at tech 0, raised by `infrastructure_per_tech`
    pub infrastructure_base: f64,
    pub infrastructure_per_tech: f64,

    /// Relaxation rates toward targets, per simulated year
    pub happiness_relax_rate: f64,
    pub infrastructure_relax_rate: f64,
    pub overall_relax_rate: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            neutral_happiness: 0.6,
            shortage_penalty: 0.15,
            infrastructure_base: 0.3,
            infrastructure_per_tech: 0.05,
            happiness_relax_rate: 0.005,
            infrastructure_relax_rate: 0.002,
            overall_relax_rate: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Instability-event odds per nominal tick at stability 0.0
    pub instability_base: f64,

    /// Severity range of an instability event (stability points lost)
    pub instability_severity_min: f64,
    pub instability_severity_max: f64,

    /// Mega-event odds per nominal tick at the galactic tier
    pub mega_event_base: f64,

    /// Population lost in one step (fraction) that counts as a collapse
    pub collapse_fraction: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            instability_base: 0.05,
            instability_severity_min: 0.02,
            instability_severity_max: 0.08,
            mega_event_base: 0.002,
            collapse_fraction: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefConfig {
    pub miracle_density_gain: f64,
    pub miracle_influence: f64,
    pub temple_density_gain: f64,
    pub temple_influence: f64,

    /// Density generated per temple per controller tick
    pub temple_generation: f64,

    /// Exponential density decay per controller tick
    pub decay_rate: f64,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            miracle_density_gain: 1.0,
            miracle_influence: 1.0,
            temple_density_gain: 2.0,
            temple_influence: 3.0,
            temple_generation: 0.01,
            decay_rate: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seed for the controller-owned PRNG
    pub seed: u64,

    /// Largest per-frame delta fed into the tree. A stalled host must not
    /// produce one enormous step on resume.
    pub max_frame_delta: f64,

    pub min_speed: f64,
    pub max_speed: f64,

    /// Ticks between history samples
    pub history_interval: u64,
    pub history_capacity: usize,

    pub event_log_capacity: usize,

    /// Time scale applied to a tier right after it is zoomed out
    pub zoom_out_time_scale: f64,

    /// Fraction of the remaining gap to 1.0 closed per tick
    pub time_scale_easing: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            max_frame_delta: 4.0,
            min_speed: 0.1,
            max_speed: 100.0,
            history_interval: 10,
            history_capacity: 200,
            event_log_capacity: 1_000,
            zoom_out_time_scale: 0.1,
            time_scale_easing: 0.05,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let p = &self.population;
        non_negative("population.min_viable", p.min_viable)?;
        if p.min_viable <= 0.0 {
            return Err(invalid("population.min_viable must be > 0"));
        }
        non_negative("population.happiness_growth_min", p.happiness_growth_min)?;
        non_negative("population.happiness_growth_max", p.happiness_growth_max)?;
        if p.happiness_growth_min > p.happiness_growth_max {
            return Err(invalid(format!(
                "population.happiness_growth_min ({}) exceeds happiness_growth_max ({})",
                p.happiness_growth_min, p.happiness_growth_max
            )));
        }
        unit_interval("population.decline_threshold", p.decline_threshold)?;
        non_negative("population.capacity_bonus_per_level", p.capacity_bonus_per_level)?;

        let t = &self.technology;
        if t.max_level as usize >= crate::statistical::TECH_TABLE_SIZE {
            return Err(invalid(format!(
                "technology.max_level ({}) must be below {}",
                t.max_level,
                crate::statistical::TECH_TABLE_SIZE
            )));
        }
        non_negative("technology.base_cost", t.base_cost)?;
        if t.base_cost <= 0.0 {
            return Err(invalid("technology.base_cost must be > 0"));
        }
        non_negative("technology.cost_exponent", t.cost_exponent)?;
        non_negative("technology.efficiency_per_level", t.efficiency_per_level)?;

        let e = &self.economy;
        non_negative("economy.decay_rate", e.decay_rate)?;
        non_negative("economy.infrastructure_sensitivity", e.infrastructure_sensitivity)?;
        if e.infrastructure_sensitivity > 2.0 {
            return Err(invalid("economy.infrastructure_sensitivity must be <= 2.0"));
        }
        unit_interval("economy.infrastructure_midpoint", e.infrastructure_midpoint)?;

        let s = &self.stability;
        unit_interval("stability.neutral_happiness", s.neutral_happiness)?;
        unit_interval("stability.shortage_penalty", s.shortage_penalty)?;
        unit_interval("stability.infrastructure_base", s.infrastructure_base)?;
        non_negative("stability.infrastructure_per_tech", s.infrastructure_per_tech)?;
        non_negative("stability.happiness_relax_rate", s.happiness_relax_rate)?;
        non_negative("stability.infrastructure_relax_rate", s.infrastructure_relax_rate)?;
        non_negative("stability.overall_relax_rate", s.overall_relax_rate)?;

        let ev = &self.events;
        unit_interval("events.instability_base", ev.instability_base)?;
        unit_interval("events.instability_severity_min", ev.instability_severity_min)?;
        unit_interval("events.instability_severity_max", ev.instability_severity_max)?;
        if ev.instability_severity_min > ev.instability_severity_max {
            return Err(invalid("events.instability_severity_min exceeds instability_severity_max"));
        }
        unit_interval("events.mega_event_base", ev.mega_event_base)?;
        unit_interval("events.collapse_fraction", ev.collapse_fraction)?;

        let b = &self.belief;
        non_negative("belief.miracle_density_gain", b.miracle_density_gain)?;
        non_negative("belief.miracle_influence", b.miracle_influence)?;
        non_negative("belief.temple_density_gain", b.temple_density_gain)?;
        non_negative("belief.temple_influence", b.temple_influence)?;
        non_negative("belief.temple_generation", b.temple_generation)?;
        non_negative("belief.decay_rate", b.decay_rate)?;

        let c = &self.controller;
        non_negative("controller.max_frame_delta", c.max_frame_delta)?;
        if c.max_frame_delta <= 0.0 {
            return Err(invalid("controller.max_frame_delta must be > 0"));
        }
        non_negative("controller.min_speed", c.min_speed)?;
        non_negative("controller.max_speed", c.max_speed)?;
        if c.min_speed <= 0.0 || c.min_speed > c.max_speed {
            return Err(invalid(format!(
                "controller speed range {}..={} is empty or non-positive",
                c.min_speed, c.max_speed
            )));
        }
        if c.history_interval == 0 {
            return Err(invalid("controller.history_interval must be >= 1"));
        }
        if c.history_capacity == 0 || c.event_log_capacity == 0 {
            return Err(invalid("controller history/event capacities must be >= 1"));
        }
        unit_interval("controller.zoom_out_time_scale", c.zoom_out_time_scale)?;
        if c.zoom_out_time_scale <= 0.0 {
            return Err(invalid("controller.zoom_out_time_scale must be > 0"));
        }
        unit_interval("controller.time_scale_easing", c.time_scale_easing)?;

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidConfig(msg.into())
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{} must be finite and >= 0, got {}", name, value)));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{} must lie in [0, 1], got {}", name, value)));
    }
    Ok(())
}
