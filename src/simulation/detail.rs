//! Seam to the entity-level engine that drives active tiers

use crate::renormalization::summary::InstantiationConstraints;
use crate::tier::state::Tier;

/// The detailed engine, as seen from the controller.
///
/// `instantiate` runs on zoom-in with the constraints the new entities
/// must honor. `step` advances an active tier by `years`. `flush` runs
/// before zoom-out and must write population and stockpiles back into
/// the tier's aggregate fields.
pub trait DetailedSimulation {
    fn instantiate(&mut self, tier: &mut Tier, constraints: &InstantiationConstraints);
    fn step(&mut self, tier: &mut Tier, years: f64);
    fn flush(&mut self, tier: &mut Tier);
}

/// Leaves active tiers frozen at their last statistical state
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveDetail;

impl DetailedSimulation for PassiveDetail {
    fn instantiate(&mut self, _tier: &mut Tier, _constraints: &InstantiationConstraints) {}

    fn step(&mut self, _tier: &mut Tier, _years: f64) {}

    fn flush(&mut self, _tier: &mut Tier) {}
}
