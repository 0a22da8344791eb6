//! Per-profile magnitude constants
//!
//! The step functions share one algorithm; only these magnitudes differ
//! between resolutions. Rates are per simulated year, chances are per
//! nominal tick at the tier's level.

use crate::tier::level::StepProfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileConstants {
    /// Intrinsic logistic growth rate r
    pub growth_rate: f64,
    /// Exponential decline rate while unstable
    pub decline_rate: f64,
    /// Research points per researcher per year
    pub research_per_capita: f64,
    /// Odds of one infrastructure project completing per tick
    pub construction_chance: f64,
    /// Minimum tech level before construction starts
    pub construction_tech: u8,
}

pub const PLANETARY: ProfileConstants = ProfileConstants {
    growth_rate: 0.02,
    decline_rate: 0.01,
    research_per_capita: 1e-5,
    construction_chance: 0.0,
    construction_tech: u8::MAX,
};

pub const STELLAR: ProfileConstants = ProfileConstants {
    growth_rate: 0.005,
    decline_rate: 0.002,
    research_per_capita: 1e-7,
    construction_chance: 0.05,
    construction_tech: 2,
};

pub const SECTOR: ProfileConstants = ProfileConstants {
    growth_rate: 0.001,
    decline_rate: 0.0005,
    research_per_capita: 1e-9,
    construction_chance: 0.02,
    construction_tech: 5,
};

pub const GALACTIC: ProfileConstants = ProfileConstants {
    growth_rate: 0.0002,
    decline_rate: 0.0001,
    research_per_capita: 1e-11,
    construction_chance: 0.0,
    construction_tech: u8::MAX,
};

pub const PROFILE_CONSTANTS: [ProfileConstants; StepProfile::COUNT] = [PLANETARY, STELLAR, SECTOR, GALACTIC];

pub fn profile_constants(profile: StepProfile) -> &'static ProfileConstants {
    &PROFILE_CONSTANTS[profile.index()]
}

// Infrastructure effects
pub const ORBITAL_STATION_INFRASTRUCTURE: f64 = 0.02;
pub const ORBITAL_STATION_CAPACITY: f64 = 1.02;
pub const WORMHOLE_INFRASTRUCTURE: f64 = 0.03;
pub const MEGASTRUCTURE_TECH: u8 = 8;
pub const MEGASTRUCTURE_CAPACITY: f64 = 1.05;
/// Per-tier build limits; capacity tops out at 1.02^20 and 1.05^10 of seed
pub const MAX_ORBITAL_STATIONS: u32 = 20;
pub const MAX_WORMHOLE_LINKS: u32 = 20;
pub const MAX_MEGASTRUCTURES: u32 = 10;

// Civilization progression (galactic tier)
pub const KARDASHEV_RATE: f64 = 1e-5;
/// Kardashev progress is reported in steps of this size
pub const KARDASHEV_MILESTONE: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coarser_profiles_grow_slower() {
        for pair in PROFILE_CONSTANTS.windows(2) {
            assert!(pair[1].growth_rate < pair[0].growth_rate);
            assert!(pair[1].decline_rate < pair[0].decline_rate);
        }
    }

    #[test]
    fn test_lookup_matches_profile() {
        assert_eq!(profile_constants(StepProfile::Sector), &SECTOR);
        assert_eq!(profile_constants(StepProfile::Galactic), &GALACTIC);
    }
}
