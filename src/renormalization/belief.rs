//! Belief density and dominant-influence tracking per tier

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::BeliefConfig;
use crate::core::types::{ActorId, TierId};
use crate::tier::address::TierAddress;
use crate::tier::level::TierLevel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub density: f64,
    pub miracles: u32,
    influence: BTreeMap<ActorId, f64>,
    temples: BTreeMap<ActorId, u32>,
}

impl BeliefState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_miracle(&mut self, actor: ActorId, config: &BeliefConfig) {
        self.miracles += 1;
        self.density += config.miracle_density_gain;
        *self.influence.entry(actor).or_insert(0.0) += config.miracle_influence;
    }

    pub fn add_temple(&mut self, actor: ActorId, config: &BeliefConfig) {
        *self.temples.entry(actor).or_insert(0) += 1;
        self.density += config.temple_density_gain;
        *self.influence.entry(actor).or_insert(0.0) += config.temple_influence;
    }

    /// Exponential decay plus steady generation from temples
    pub fn decay(&mut self, dt: f64, config: &BeliefConfig) {
        let generated = self.temple_count() as f64 * config.temple_generation * dt;
        self.density = (self.density * (-config.decay_rate * dt).exp() + generated).max(0.0);
    }

    pub fn influence(&self, actor: ActorId) -> f64 {
        self.influence.get(&actor).copied().unwrap_or(0.0)
    }

    pub fn temples(&self, actor: ActorId) -> u32 {
        self.temples.get(&actor).copied().unwrap_or(0)
    }

    pub fn temple_count(&self) -> u32 {
        self.temples.values().sum()
    }

    pub fn dominant(&self) -> Option<ActorId> {
        dominant_influence(&self.influence)
    }

    pub(crate) fn influence_map(&self) -> &BTreeMap<ActorId, f64> {
        &self.influence
    }
}

/// Actor with the greatest influence; ties go to the lowest id
pub fn dominant_influence(weights: &BTreeMap<ActorId, f64>) -> Option<ActorId> {
    weights
        .iter()
        .max_by_key(|(id, weight)| (OrderedFloat(**weight), Reverse(**id)))
        .map(|(id, _)| *id)
}

/// One cell of the belief overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefCell {
    pub tier: TierId,
    pub level: TierLevel,
    pub address: TierAddress,
    pub density: f64,
    pub dominant: Option<ActorId>,
}
