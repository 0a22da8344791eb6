//! The renormalization engine
//!
//! Converts between the detailed and statistical representations of a
//! tier. Zooming out runs `summarize` and then marks the tier abstract;
//! zooming in projects the latest summary into instantiation constraints
//! and hands the tier back to the detailed engine. Belief bookkeeping
//! lives here too so it is visible at every resolution.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::config::BeliefConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{ActorId, TierId};
use crate::renormalization::belief::{dominant_influence, BeliefState};
use crate::renormalization::summary::{InstantiationConstraints, TierSummary};
use crate::tier::state::{ResourceFlow, ResourceKind, RoleDistribution, SimulationMode, Stability, Tier};
use crate::tier::tree::TierTree;

#[derive(Debug, Clone, Default)]
pub struct RenormalizationEngine {
    belief_config: BeliefConfig,
    summaries: AHashMap<TierId, TierSummary>,
    beliefs: AHashMap<TierId, BeliefState>,
}

impl RenormalizationEngine {
    pub fn new(belief_config: BeliefConfig) -> Self {
        Self {
            belief_config,
            summaries: AHashMap::new(),
            beliefs: AHashMap::new(),
        }
    }

    /// Summarize `id` and its active descendants, replacing any cached
    /// summary. Two calls with no simulation in between return equal
    /// snapshots.
    pub fn summarize(&mut self, tree: &TierTree, id: TierId) -> Result<TierSummary> {
        let summary = self.compute_summary(tree, id)?;
        self.summaries.insert(id, summary.clone());
        Ok(summary)
    }

    /// Build a summary without touching the cache
    pub fn compute_summary(&self, tree: &TierTree, id: TierId) -> Result<TierSummary> {
        let tier = tree.get(id).ok_or(SimError::TierNotFound(id))?;

        let included: Vec<&Tier> = tree
            .pre_order(id)
            .into_iter()
            .filter_map(|t| tree.get(t))
            .filter(|t| t.id == id || t.is_active())
            .collect();

        let mut population = 0.0;
        let mut carrying_capacity = 0.0;
        let mut economy: BTreeMap<ResourceKind, ResourceFlow> = BTreeMap::new();
        let mut influence: BTreeMap<ActorId, f64> = BTreeMap::new();
        let mut belief_density = 0.0;

        for t in &included {
            population += t.population.total;
            carrying_capacity += t.population.carrying_capacity;

            for (kind, flow) in &t.economy.resources {
                let total = economy.entry(*kind).or_default();
                total.production += flow.production;
                total.consumption += flow.consumption;
                total.stockpile += flow.stockpile;
                total.shortage |= flow.shortage;
            }

            if let Some(belief) = self.beliefs.get(&t.id) {
                belief_density += belief.density;
                for (actor, weight) in belief.influence_map() {
                    *influence.entry(*actor).or_insert(0.0) += weight;
                }
            }
        }

        let (roles, stability) = if included.len() > 1 && population > 0.0 {
            weighted_shares(&included, population)
        } else {
            (tier.population.roles, tier.stability)
        };

        Ok(TierSummary {
            tier: id,
            level: tier.level,
            ticks_simulated: tier.ticks_simulated,
            included: included.iter().map(|t| t.id).collect(),
            population,
            carrying_capacity,
            roles,
            economy,
            tech_level: tier.tech.level,
            research: tier.tech.research,
            efficiency: tier.tech.efficiency,
            stability,
            belief_density,
            dominant_influence: dominant_influence(&influence),
        })
    }

    /// Constraints for instantiating `id`. Uses the cached summary when it
    /// is current, otherwise summarizes afresh. A tier that was never
    /// summarized and never simulated has nothing to project.
    pub fn get_instantiation_constraints(&mut self, tree: &TierTree, id: TierId) -> Result<InstantiationConstraints> {
        let tier = tree.get(id).ok_or(SimError::TierNotFound(id))?;

        match self.summaries.get(&id) {
            Some(cached) if cached.ticks_simulated == tier.ticks_simulated => {
                return Ok(InstantiationConstraints::from_summary(cached));
            }
            None if tier.ticks_simulated == 0 => return Err(SimError::NotSummarized(id)),
            _ => {}
        }

        let summary = self.summarize(tree, id)?;
        Ok(InstantiationConstraints::from_summary(&summary))
    }

    /// Hand `id` to the detailed engine. Returns the constraints it must
    /// honor; a tier with no history is projected from its seed state.
    pub fn activate_tier(&mut self, tree: &mut TierTree, id: TierId) -> Result<InstantiationConstraints> {
        let constraints = match self.get_instantiation_constraints(tree, id) {
            Ok(constraints) => constraints,
            Err(SimError::NotSummarized(_)) => {
                tracing::debug!(tier = %id, "no history, projecting seed state");
                InstantiationConstraints::from_summary(&self.summarize(tree, id)?)
            }
            Err(e) => return Err(e),
        };

        let tier = tree.get_mut(id).ok_or(SimError::TierNotFound(id))?;
        tier.mode = SimulationMode::Active;
        tier.time_scale = 1.0;
        self.invalidate_ancestors(tree, id);

        tracing::info!(tier = %id, population = constraints.target_population, "tier activated");
        Ok(constraints)
    }

    /// Return `id` to statistical simulation. The detailed engine must
    /// have flushed its state into the tier before this runs.
    pub fn deactivate_tier(&mut self, tree: &mut TierTree, id: TierId) -> Result<TierSummary> {
        let summary = self.summarize(tree, id)?;

        let tier = tree.get_mut(id).ok_or(SimError::TierNotFound(id))?;
        tier.mode = SimulationMode::Abstract;
        self.invalidate_ancestors(tree, id);

        tracing::info!(tier = %id, population = summary.population, "tier deactivated");
        Ok(summary)
    }

    /// False for unknown ids
    pub fn is_tier_active(&self, tree: &TierTree, id: TierId) -> bool {
        tree.get(id).map_or(false, Tier::is_active)
    }

    pub fn record_miracle(&mut self, tree: &TierTree, id: TierId, actor: ActorId) -> Result<()> {
        if !tree.contains(id) {
            return Err(SimError::TierNotFound(id));
        }
        self.beliefs
            .entry(id)
            .or_default()
            .record_miracle(actor, &self.belief_config);
        self.invalidate_lineage(tree, id);
        Ok(())
    }

    pub fn add_temple(&mut self, tree: &TierTree, id: TierId, actor: ActorId) -> Result<()> {
        if !tree.contains(id) {
            return Err(SimError::TierNotFound(id));
        }
        self.beliefs
            .entry(id)
            .or_default()
            .add_temple(actor, &self.belief_config);
        self.invalidate_lineage(tree, id);
        Ok(())
    }

    /// Advance every tier's belief by `dt` controller ticks
    pub fn decay_beliefs(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for belief in self.beliefs.values_mut() {
            belief.decay(dt, &self.belief_config);
        }
    }

    pub fn belief(&self, id: TierId) -> Option<&BeliefState> {
        self.beliefs.get(&id)
    }

    pub fn get_summary(&self, id: TierId) -> Option<&TierSummary> {
        self.summaries.get(&id)
    }

    /// Cached summaries ordered by tier id
    pub fn get_all_summaries(&self) -> Vec<&TierSummary> {
        let mut all: Vec<&TierSummary> = self.summaries.values().collect();
        all.sort_by_key(|s| s.tier);
        all
    }

    /// Drop cached state for tiers that no longer exist
    pub fn forget(&mut self, ids: &[TierId]) {
        for id in ids {
            self.summaries.remove(id);
            self.beliefs.remove(id);
        }
    }

    /// Drop cached summaries for `ids`, keeping their belief state
    pub fn invalidate(&mut self, ids: &[TierId]) {
        for id in ids {
            self.summaries.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.summaries.clear();
        self.beliefs.clear();
    }

    fn invalidate_ancestors(&mut self, tree: &TierTree, id: TierId) {
        for ancestor in tree.ancestors(id) {
            self.summaries.remove(&ancestor);
        }
    }

    fn invalidate_lineage(&mut self, tree: &TierTree, id: TierId) {
        self.summaries.remove(&id);
        self.invalidate_ancestors(tree, id);
    }
}

/// Population-weighted role split and stability across `tiers`
fn weighted_shares(tiers: &[&Tier], population: f64) -> (RoleDistribution, Stability) {
    let mut roles = RoleDistribution {
        workers: 0.0,
        researchers: 0.0,
        military: 0.0,
        children: 0.0,
        elderly: 0.0,
    };
    let mut stability = Stability {
        overall: 0.0,
        happiness: 0.0,
        infrastructure: 0.0,
    };

    for t in tiers {
        let w = t.population.total / population;
        let r = &t.population.roles;
        roles.workers += r.workers * w;
        roles.researchers += r.researchers * w;
        roles.military += r.military * w;
        roles.children += r.children * w;
        roles.elderly += r.elderly * w;

        stability.overall += t.stability.overall * w;
        stability.happiness += t.stability.happiness * w;
        stability.infrastructure += t.stability.infrastructure * w;
    }

    stability.overall = stability.overall.clamp(0.0, 1.0);
    stability.happiness = stability.happiness.clamp(0.0, 1.0);
    stability.infrastructure = stability.infrastructure.clamp(0.0, 1.0);
    (roles, stability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::level::TierLevel;
    use crate::tier::state::TierSeed;

    fn tree() -> (TierTree, TierId, TierId) {
        let mut tree = TierTree::new(
            TierSeed::new("Sol", TierLevel::System)
                .with_population(2_000.0, 20_000.0)
                .with_resource(ResourceKind::Energy, 50.0, 40.0, 500.0),
        )
        .unwrap();
        let root = tree.root_id();
        let child = tree
            .insert_child(
                root,
                TierSeed::new("Terra", TierLevel::Planet)
                    .with_population(1_000.0, 8_000.0)
                    .with_resource(ResourceKind::Energy, 10.0, 5.0, 100.0)
                    .with_stability(0.2, 0.2, 0.2),
            )
            .unwrap();
        (tree, root, child)
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let (tree, root, _) = tree();
        let mut engine = RenormalizationEngine::default();
        let first = engine.summarize(&tree, root).unwrap();
        let second = engine.summarize(&tree, root).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.get_summary(root), Some(&first));
    }

    #[test]
    fn test_abstract_children_are_not_folded_in() {
        let (tree, root, _) = tree();
        let engine = RenormalizationEngine::default();
        let summary = engine.compute_summary(&tree, root).unwrap();
        assert_eq!(summary.included, vec![root]);
        assert_eq!(summary.population, 2_000.0);
    }

    #[test]
    fn test_active_children_are_folded_in() {
        let (mut tree, root, child) = tree();
        tree.get_mut(child).unwrap().mode = SimulationMode::Active;

        let engine = RenormalizationEngine::default();
        let summary = engine.compute_summary(&tree, root).unwrap();
        assert_eq!(summary.included, vec![root, child]);
        assert_eq!(summary.population, 3_000.0);
        assert_eq!(summary.economy[&ResourceKind::Energy].stockpile, 600.0);
        assert!(summary.stability.overall < 0.6);
        assert!(summary.stability.overall > 0.2);
    }

    #[test]
    fn test_constraints_need_history_or_summary() {
        let (mut tree, _, child) = tree();
        let mut engine = RenormalizationEngine::default();
        assert!(matches!(
            engine.get_instantiation_constraints(&tree, child),
            Err(SimError::NotSummarized(id)) if id == child
        ));

        tree.get_mut(child).unwrap().ticks_simulated = 1;
        let constraints = engine.get_instantiation_constraints(&tree, child).unwrap();
        assert_eq!(constraints.target_population, 1_000.0);
    }

    #[test]
    fn test_unknown_tier_is_not_found() {
        let (mut tree, _, _) = tree();
        let mut engine = RenormalizationEngine::default();
        let missing = TierId(99);
        assert!(matches!(engine.summarize(&tree, missing), Err(SimError::TierNotFound(_))));
        assert!(matches!(engine.activate_tier(&mut tree, missing), Err(SimError::TierNotFound(_))));
        assert!(matches!(engine.record_miracle(&tree, missing, ActorId(1)), Err(SimError::TierNotFound(_))));
        assert!(!engine.is_tier_active(&tree, missing));
    }

    #[test]
    fn test_activate_then_deactivate() {
        let (mut tree, _, child) = tree();
        let mut engine = RenormalizationEngine::default();

        let constraints = engine.activate_tier(&mut tree, child).unwrap();
        assert!(engine.is_tier_active(&tree, child));
        assert_eq!(constraints.stockpiles[&ResourceKind::Energy], 100.0);

        let summary = engine.deactivate_tier(&mut tree, child).unwrap();
        assert!(!engine.is_tier_active(&tree, child));
        assert_eq!(summary.population, 1_000.0);
    }

    #[test]
    fn test_mode_flip_drops_stale_parent_summary() {
        let (mut tree, root, child) = tree();
        let mut engine = RenormalizationEngine::default();
        engine.summarize(&tree, root).unwrap();
        engine.activate_tier(&mut tree, child).unwrap();
        assert!(engine.get_summary(root).is_none());
    }

    #[test]
    fn test_belief_flows_into_summary() {
        let (tree, _, child) = tree();
        let mut engine = RenormalizationEngine::default();
        engine.record_miracle(&tree, child, ActorId(3)).unwrap();
        engine.add_temple(&tree, child, ActorId(5)).unwrap();

        let summary = engine.summarize(&tree, child).unwrap();
        assert!(summary.belief_density > 0.0);
        assert_eq!(summary.dominant_influence, Some(ActorId(5)));
    }

    #[test]
    fn test_summaries_listed_in_id_order() {
        let (tree, root, child) = tree();
        let mut engine = RenormalizationEngine::default();
        engine.summarize(&tree, child).unwrap();
        engine.summarize(&tree, root).unwrap();
        let ids: Vec<TierId> = engine.get_all_summaries().iter().map(|s| s.tier).collect();
        assert_eq!(ids, vec![root, child]);
    }
}
