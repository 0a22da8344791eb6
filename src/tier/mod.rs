//! Tier hierarchy data model
//!
//! A world is a tree of tiers, each one resolution step coarser than its
//! children. Every tier is either active (driven by the detailed engine)
//! or abstract (driven by the statistical step functions).

pub mod address;
pub mod events;
pub mod level;
pub mod state;
pub mod tree;

pub use address::TierAddress;
pub use events::{EventLog, InfrastructureKind, LoggedEvent, MegaEventKind, TierEvent, TierEventKind};
pub use level::{StepProfile, TierLadder, TierLevel};
pub use state::{
    Civilization, Economy, Infrastructure, Population, ResourceFlow, ResourceKind, RoleDistribution,
    SimulationMode, Stability, Technology, Tier, TierSeed,
};
pub use tree::TierTree;
