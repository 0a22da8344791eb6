//! Strata - hierarchical renormalization simulation
//!
//! A world is a tree of tiers from settlements and planets up to
//! galaxies. Tiers under observation are driven entity-by-entity by an
//! external engine; everything else advances through closed-form
//! statistical step functions. The renormalization engine converts
//! between the two when the observer zooms.

pub mod core;
pub mod generation;
pub mod renormalization;
pub mod simulation;
pub mod statistical;
pub mod tier;

pub use crate::core::{Result, SimError, SimulationConfig};
pub use generation::{ProceduralGenerator, StaticSource, TierSource};
pub use renormalization::{InstantiationConstraints, RenormalizationEngine, TierSummary};
pub use simulation::{SimulationController, SimulationStats};
pub use tier::{TierLadder, TierLevel, TierTree};
