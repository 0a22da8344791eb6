//! Statistical simulation of abstract tiers
//!
//! One step function per step profile, each advancing a single tier by a
//! number of simulated years in O(1). Step functions touch nothing but
//! the tier they are given and the PRNG they are handed.

pub mod constants;
pub mod economy;
pub mod events;
pub mod galaxy;
pub mod planet;
pub mod population;
pub mod sector;
pub mod stability;
pub mod system;
pub mod tables;
pub mod technology;

use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::tier::level::{StepProfile, TierLevel};
use crate::tier::state::{SimulationMode, Tier};

pub use tables::{LevelTables, TECH_TABLE_SIZE};

/// Read-only inputs shared by every step in a tick
pub struct StepContext<'a> {
    pub config: &'a SimulationConfig,
    pub tables: &'a LevelTables,
    pub tick: Tick,
}

/// What happened during one step that the caller may want to count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Safety-net clamps that fired. Zero under sane parameters.
    pub clamps: u32,
    /// Resources that ran dry this step
    pub shortages: u32,
}

impl StepOutcome {
    pub fn merge(&mut self, other: StepOutcome) {
        self.clamps += other.clamps;
        self.shortages += other.shortages;
    }
}

pub type StepFn = fn(&mut Tier, f64, &StepContext<'_>, &mut ChaCha8Rng) -> StepOutcome;

const STEP_TABLE: [StepFn; StepProfile::COUNT] = [planet::step, system::step, sector::step, galaxy::step];

/// Step function for a tier in `mode` at `level`. Active tiers belong to
/// the detailed engine and have none.
pub fn step_function(mode: SimulationMode, level: TierLevel) -> Option<StepFn> {
    match mode {
        SimulationMode::Active => None,
        SimulationMode::Abstract => Some(STEP_TABLE[level.profile().index()]),
    }
}

/// Advance an abstract tier by `years`. Returns an empty outcome for
/// active tiers.
pub fn advance_tier(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> StepOutcome {
    match step_function(tier.mode, tier.level) {
        Some(step) => step(tier, years, ctx, rng),
        None => StepOutcome::default(),
    }
}

/// Bring derived fields in line with the tables (used on fresh trees)
pub fn prime_tier(tier: &mut Tier, tables: &LevelTables) {
    tier.tech.level = tier.tech.level.min(tables.max_level());
    tier.tech.efficiency = tables.efficiency(tier.tech.level);
}

/// Steps shared by every profile: technology, population, economy,
/// stability, then generic instability events
pub(crate) fn step_core(tier: &mut Tier, years: f64, ctx: &StepContext<'_>, rng: &mut ChaCha8Rng) -> (f64, StepOutcome) {
    let mut outcome = StepOutcome::default();

    let years = if years.is_finite() && years >= 0.0 {
        years
    } else {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, years, "non-finite or negative step, treating as zero");
        0.0
    };

    let profile = tier.level.profile();
    outcome.merge(technology::advance(tier, years, profile, ctx));
    outcome.merge(population::advance(tier, years, profile, ctx));
    outcome.merge(economy::advance(tier, years, ctx));
    outcome.merge(stability::advance(tier, years, ctx));

    let fraction = tick_fraction(tier.level, years);
    events::roll_instability(tier, fraction, ctx, rng);

    (fraction, outcome)
}

/// Share of one nominal tick at `level` covered by `years`, capped at 1
pub fn tick_fraction(level: TierLevel, years: f64) -> f64 {
    (years / level.time_scale()).clamp(0.0, 1.0)
}

/// Replace a non-finite value, counting the clamp
pub(crate) fn finite_or(value: f64, fallback: f64, outcome: &mut StepOutcome, tier: &Tier, what: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        outcome.clamps += 1;
        tracing::warn!(tier = %tier.id, what, "non-finite value clamped");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TierId;
    use crate::tier::address::TierAddress;
    use crate::tier::state::TierSeed;

    #[test]
    fn test_active_tiers_have_no_step_function() {
        assert!(step_function(SimulationMode::Active, TierLevel::Planet).is_none());
        assert!(step_function(SimulationMode::Abstract, TierLevel::Planet).is_some());
    }

    #[test]
    fn test_advance_leaves_active_tier_untouched() {
        let config = SimulationConfig::default();
        let tables = LevelTables::new(&config);
        let ctx = StepContext { config: &config, tables: &tables, tick: 1 };
        let mut rng = <ChaCha8Rng as rand::SeedableRng>::seed_from_u64(1);

        let mut tier = Tier::from_seed(TierId(1), TierAddress::root(), TierSeed::new("Terra", TierLevel::Planet));
        tier.mode = SimulationMode::Active;
        let before = tier.clone();

        let outcome = advance_tier(&mut tier, 10.0, &ctx, &mut rng);
        assert_eq!(outcome, StepOutcome::default());
        assert_eq!(tier, before);
    }

    #[test]
    fn test_tick_fraction() {
        assert_eq!(tick_fraction(TierLevel::Planet, 5.0), 0.5);
        assert_eq!(tick_fraction(TierLevel::Planet, 500.0), 1.0);
        assert_eq!(tick_fraction(TierLevel::Galaxy, 0.0), 0.0);
    }
}
