//! Tier levels, ladders and the static time-scale table
//!
//! A tier level is one resolution step. Levels belong to a ladder and are
//! only ordered against other levels of the same ladder.

use serde::{Deserialize, Serialize};

/// A family of tier levels that can appear together in one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierLadder {
    /// planet < system < sector < galaxy
    Astronomical,
    /// chunk < zone < region < subsection < megasegment < gigasegment
    Habitat,
}

impl TierLadder {
    /// Levels of this ladder, finest first
    pub fn levels(&self) -> &'static [TierLevel] {
        match self {
            TierLadder::Astronomical => &ASTRONOMICAL,
            TierLadder::Habitat => &HABITAT,
        }
    }

    pub fn finest(&self) -> TierLevel {
        self.levels()[0]
    }

    pub fn coarsest(&self) -> TierLevel {
        let levels = self.levels();
        levels[levels.len() - 1]
    }
}

const ASTRONOMICAL: [TierLevel; 4] = [
    TierLevel::Planet,
    TierLevel::System,
    TierLevel::Sector,
    TierLevel::Galaxy,
];

const HABITAT: [TierLevel; 6] = [
    TierLevel::Chunk,
    TierLevel::Zone,
    TierLevel::Region,
    TierLevel::Subsection,
    TierLevel::Megasegment,
    TierLevel::Gigasegment,
];

/// Resolution step of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierLevel {
    Planet,
    System,
    Sector,
    Galaxy,
    Chunk,
    Zone,
    Region,
    Subsection,
    Megasegment,
    Gigasegment,
}

/// Which statistical step function (and which magnitude constants) drives
/// an abstract tier of a given level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StepProfile {
    Planetary = 0,
    Stellar = 1,
    Sector = 2,
    Galactic = 3,
}

impl StepProfile {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TierLevel {
    pub fn ladder(&self) -> TierLadder {
        match self {
            TierLevel::Planet | TierLevel::System | TierLevel::Sector | TierLevel::Galaxy => {
                TierLadder::Astronomical
            }
            _ => TierLadder::Habitat,
        }
    }

    /// Position within the ladder, 0 = finest
    pub fn rank(&self) -> u8 {
        match self {
            TierLevel::Planet | TierLevel::Chunk => 0,
            TierLevel::System | TierLevel::Zone => 1,
            TierLevel::Sector | TierLevel::Region => 2,
            TierLevel::Galaxy | TierLevel::Subsection => 3,
            TierLevel::Megasegment => 4,
            TierLevel::Gigasegment => 5,
        }
    }

    /// Simulated years represented by one tick at this level
    pub fn time_scale(&self) -> f64 {
        match self {
            TierLevel::Planet => 10.0,
            TierLevel::System => 100.0,
            TierLevel::Sector => 1_000.0,
            TierLevel::Galaxy => 10_000.0,
            TierLevel::Chunk => 1.0,
            TierLevel::Zone => 5.0,
            TierLevel::Region => 25.0,
            TierLevel::Subsection => 100.0,
            TierLevel::Megasegment => 1_000.0,
            TierLevel::Gigasegment => 10_000.0,
        }
    }

    pub fn profile(&self) -> StepProfile {
        match self {
            TierLevel::Planet | TierLevel::Chunk | TierLevel::Zone => StepProfile::Planetary,
            TierLevel::System | TierLevel::Region | TierLevel::Subsection => StepProfile::Stellar,
            TierLevel::Sector | TierLevel::Megasegment => StepProfile::Sector,
            TierLevel::Galaxy | TierLevel::Gigasegment => StepProfile::Galactic,
        }
    }

    /// Next finer level in the same ladder
    pub fn finer(&self) -> Option<TierLevel> {
        let rank = self.rank() as usize;
        if rank == 0 {
            None
        } else {
            Some(self.ladder().levels()[rank - 1])
        }
    }

    /// Next coarser level in the same ladder
    pub fn coarser(&self) -> Option<TierLevel> {
        self.ladder().levels().get(self.rank() as usize + 1).copied()
    }

    /// True if both levels share a ladder and `self` is strictly coarser
    pub fn is_coarser_than(&self, other: &TierLevel) -> bool {
        self.ladder() == other.ladder() && self.rank() > other.rank()
    }

    /// Level `steps` below the coarsest level of `ladder`
    pub fn from_top(ladder: TierLadder, steps: usize) -> Option<TierLevel> {
        let levels = ladder.levels();
        levels.len().checked_sub(steps + 1).map(|i| levels[i])
    }
}
