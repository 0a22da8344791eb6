//! Renormalization between detailed and statistical simulation
//!
//! Owns the summary cache, the instantiation contract handed to the
//! detailed engine on zoom-in, and per-tier belief tracking.

pub mod belief;
pub mod engine;
pub mod summary;

pub use belief::{dominant_influence, BeliefCell, BeliefState};
pub use engine::RenormalizationEngine;
pub use summary::{InstantiationConstraints, TierSummary, POPULATION_TOLERANCE};
