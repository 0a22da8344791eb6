//! The simulation driver
//!
//! Owns the tier tree, the tick counter, run state and the PRNG. Each
//! `update` walks the tree once parents-first, hands active tiers to the
//! detailed engine and abstract tiers to the statistical step functions,
//! then collects events children-first and refreshes the statistics.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{ActorId, Tick, TierId};
use crate::generation::{StaticSource, TierSource};
use crate::renormalization::{BeliefCell, InstantiationConstraints, RenormalizationEngine, TierSummary};
use crate::simulation::detail::{DetailedSimulation, PassiveDetail};
use crate::simulation::history::{History, HistorySample};
use crate::simulation::stats::SimulationStats;
use crate::statistical::{advance_tier, prime_tier, LevelTables, StepContext, StepOutcome};
use crate::tier::events::EventLog;
use crate::tier::state::Tier;
use crate::tier::tree::TierTree;

/// Borrowed view of the whole simulation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StateView<'a> {
    pub tick: Tick,
    pub running: bool,
    pub paused: bool,
    pub speed: f64,
    pub stats: &'a SimulationStats,
    pub tree: &'a TierTree,
}

/// Owned copy of the simulation state, safe to hand to another thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: Tick,
    pub running: bool,
    pub paused: bool,
    pub speed: f64,
    pub stats: SimulationStats,
    pub tree: TierTree,
}

pub struct SimulationController {
    config: SimulationConfig,
    tables: LevelTables,
    tree: TierTree,
    source: Box<dyn TierSource>,
    detail: Box<dyn DetailedSimulation>,
    renormalization: RenormalizationEngine,
    rng: ChaCha8Rng,
    tick: Tick,
    running: bool,
    paused: bool,
    speed: f64,
    stats: SimulationStats,
    history: History,
    events: EventLog,
}

impl SimulationController {
    /// Validate `config`, then build the initial tree from `source`
    pub fn new(config: SimulationConfig, mut source: Box<dyn TierSource>, depth: usize) -> Result<Self> {
        config.validate()?;
        let tables = LevelTables::new(&config);
        let tree = prepare_tree(source.build(depth)?, &tables, config.population.min_viable)?;
        let stats = SimulationStats::collect(&tree, 0, 0, 0);

        tracing::info!(tiers = tree.len(), ladder = ?tree.ladder(), depth, "simulation created");

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.controller.seed),
            renormalization: RenormalizationEngine::new(config.belief.clone()),
            history: History::new(config.controller.history_capacity),
            events: EventLog::new(config.controller.event_log_capacity),
            tables,
            tree,
            source,
            detail: Box::new(PassiveDetail),
            tick: 0,
            running: false,
            paused: false,
            speed: 1.0,
            stats,
            config,
        })
    }

    /// Drive a fixed, hand-built tree
    pub fn from_tree(config: SimulationConfig, tree: TierTree) -> Result<Self> {
        Self::new(config, Box::new(StaticSource::new(tree)), 0)
    }

    /// Replace the detailed engine used for active tiers
    pub fn with_detail(mut self, detail: Box<dyn DetailedSimulation>) -> Self {
        self.detail = detail;
        self
    }

    // ------------------------------------------------------------------
    // Run control

    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
        tracing::info!(tick = self.tick, "simulation started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        tracing::info!(tick = self.tick, "simulation stopped");
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        tracing::info!(tick = self.tick, paused = self.paused, "pause toggled");
        self.paused
    }

    /// Clamp `multiplier` to the configured range and apply it. NaN is
    /// ignored. Returns the speed now in effect.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        if !multiplier.is_nan() {
            let c = &self.config.controller;
            self.speed = multiplier.clamp(c.min_speed, c.max_speed);
        }
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    // ------------------------------------------------------------------
    // Tick

    /// Advance one frame of `delta` ticks. Does nothing unless running
    /// and unpaused. Negative or non-finite deltas are rejected.
    pub fn update(&mut self, delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(SimError::InvalidDeltaTime(delta));
        }
        if !self.running || self.paused {
            return Ok(());
        }

        let delta = delta.min(self.config.controller.max_frame_delta) * self.speed;
        let outcome = self.advance_tree(delta);
        self.tick += 1;

        self.renormalization.decay_beliefs(delta);

        let mut collected = 0;
        for id in self.tree.post_order(self.tree.root_id()) {
            if let Some(tier) = self.tree.get_mut(id) {
                for event in tier.active_events.drain(..) {
                    self.events.push(event);
                    collected += 1;
                }
            }
        }

        let clamp_hits = self.stats.clamp_hits + outcome.clamps as u64;
        self.stats = SimulationStats::collect(&self.tree, self.tick, clamp_hits, collected);

        if self.tick % self.config.controller.history_interval == 0 {
            self.history.push(HistorySample::from(&self.stats));
        }

        tracing::debug!(
            tick = self.tick,
            population = self.stats.total_population,
            events = collected,
            clamps = outcome.clamps,
            "tick complete"
        );
        Ok(())
    }

    /// Run `frames` updates of `delta` each
    pub fn run_frames(&mut self, frames: usize, delta: f64) -> Result<()> {
        for _ in 0..frames {
            self.update(delta)?;
        }
        Ok(())
    }

    fn advance_tree(&mut self, delta: f64) -> StepOutcome {
        let ctx = StepContext {
            config: &self.config,
            tables: &self.tables,
            tick: self.tick,
        };
        let easing = self.config.controller.time_scale_easing;
        let mut outcome = StepOutcome::default();

        for id in self.tree.pre_order(self.tree.root_id()) {
            let Some(tier) = self.tree.get_mut(id) else {
                continue;
            };
            let years = tier.effective_years(delta);

            if tier.is_active() {
                self.detail.step(tier, years);
            } else {
                outcome.merge(advance_tier(tier, years, &ctx, &mut self.rng));
                ease_time_scale(tier, easing);
            }
            tier.ticks_simulated += 1;
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Zoom

    /// Collapse an active tier into its statistical summary. The tier then
    /// runs at a reduced time scale that eases back to 1.0.
    pub fn zoom_out(&mut self, id: TierId) -> Result<TierSummary> {
        let tier = self.tree.get_mut(id).ok_or(SimError::TierNotFound(id))?;
        let was_active = tier.is_active();
        if was_active {
            self.detail.flush(tier);
        }

        let summary = self.renormalization.deactivate_tier(&mut self.tree, id)?;
        if was_active {
            if let Some(tier) = self.tree.get_mut(id) {
                tier.time_scale = self.config.controller.zoom_out_time_scale;
            }
        }

        tracing::info!(tier = %id, tick = self.tick, "zoomed out");
        Ok(summary)
    }

    /// Hand a tier to the detailed engine along with the constraints its
    /// entities must honor
    pub fn zoom_in(&mut self, id: TierId) -> Result<InstantiationConstraints> {
        // Already active: the detailed engine owns the live state, so sync
        // it back and report current constraints without re-instantiating
        if let Some(tier) = self.tree.get_mut(id) {
            if tier.is_active() {
                self.detail.flush(tier);
                self.renormalization.invalidate(&self.tree.ancestors(id));
                let summary = self.renormalization.summarize(&self.tree, id)?;
                return Ok(InstantiationConstraints::from_summary(&summary));
            }
        }

        let constraints = self.renormalization.activate_tier(&mut self.tree, id)?;
        if let Some(tier) = self.tree.get_mut(id) {
            self.detail.instantiate(tier, &constraints);
        }

        tracing::info!(tier = %id, tick = self.tick, "zoomed in");
        Ok(constraints)
    }

    pub fn is_tier_active(&self, id: TierId) -> bool {
        self.renormalization.is_tier_active(&self.tree, id)
    }

    /// Destroy a tier and its subtree, dropping their cached state
    pub fn remove_tier(&mut self, id: TierId) -> Result<Vec<Tier>> {
        let ancestors = self.tree.ancestors(id);
        let removed = self.tree.remove_subtree(id)?;
        self.renormalization.invalidate(&ancestors);
        let ids: Vec<TierId> = removed.iter().map(|t| t.id).collect();
        self.renormalization.forget(&ids);
        tracing::info!(tier = %id, removed = ids.len(), "tier removed");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Belief

    pub fn record_miracle(&mut self, id: TierId, actor: ActorId) -> Result<()> {
        self.renormalization.record_miracle(&self.tree, id, actor)
    }

    pub fn add_temple(&mut self, id: TierId, actor: ActorId) -> Result<()> {
        self.renormalization.add_temple(&self.tree, id, actor)
    }

    /// Belief density and dominant influence for every tier, parents first
    pub fn get_belief_heatmap(&self) -> Vec<BeliefCell> {
        self.tree
            .pre_order(self.tree.root_id())
            .into_iter()
            .filter_map(|id| self.tree.get(id))
            .map(|tier| {
                let belief = self.renormalization.belief(tier.id);
                BeliefCell {
                    tier: tier.id,
                    level: tier.level,
                    address: tier.address.clone(),
                    density: belief.map_or(0.0, |b| b.density),
                    dominant: belief.and_then(|b| b.dominant()),
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Queries

    pub fn get_tier_by_id(&self, id: TierId) -> Option<&Tier> {
        self.tree.get(id)
    }

    /// Every tier beneath `id`, parents first
    pub fn get_all_descendants(&self, id: TierId) -> Vec<&Tier> {
        self.tree
            .descendants(id)
            .into_iter()
            .filter_map(|d| self.tree.get(d))
            .collect()
    }

    /// A fresh summary of every tier, regardless of activation state
    pub fn get_all_tier_summaries(&self) -> Vec<TierSummary> {
        self.tree
            .pre_order(self.tree.root_id())
            .into_iter()
            .filter_map(|id| self.renormalization.compute_summary(&self.tree, id).ok())
            .collect()
    }

    pub fn get_state(&self) -> StateView<'_> {
        StateView {
            tick: self.tick,
            running: self.running,
            paused: self.paused,
            speed: self.speed,
            stats: &self.stats,
            tree: &self.tree,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tick: self.tick,
            running: self.running,
            paused: self.paused,
            speed: self.speed,
            stats: self.stats.clone(),
            tree: self.tree.clone(),
        }
    }

    pub fn get_history(&self) -> &History {
        &self.history
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn tree(&self) -> &TierTree {
        &self.tree
    }

    pub fn renormalization(&self) -> &RenormalizationEngine {
        &self.renormalization
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Reset

    /// Rebuild the tree from the content source and start over from
    /// tick 0 with a freshly seeded PRNG
    pub fn reset(&mut self, depth: usize) -> Result<()> {
        self.tree = prepare_tree(self.source.build(depth)?, &self.tables, self.config.population.min_viable)?;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.controller.seed);
        self.renormalization.clear();
        self.history.clear();
        self.events.clear();
        self.tick = 0;
        self.paused = false;
        self.stats = SimulationStats::collect(&self.tree, 0, 0, 0);

        tracing::info!(tiers = self.tree.len(), depth, "simulation reset");
        Ok(())
    }
}

fn prepare_tree(mut tree: TierTree, tables: &LevelTables, min_viable: f64) -> Result<TierTree> {
    tree.validate()?;
    if let Some(tier) = tree.iter().find(|t| t.population.total < min_viable) {
        return Err(SimError::InvalidConfig(format!(
            "tier '{}' starts with population {} below the minimum viable {}",
            tier.name, tier.population.total, min_viable
        )));
    }
    for tier in tree.iter_mut() {
        prime_tier(tier, tables);
    }
    Ok(tree)
}

/// Close a fraction of the gap to full speed
fn ease_time_scale(tier: &mut Tier, easing: f64) {
    if tier.time_scale >= 1.0 {
        return;
    }
    let eased = tier.time_scale + (1.0 - tier.time_scale) * easing;
    tier.time_scale = if 1.0 - eased < 1e-6 { 1.0 } else { eased };
}
