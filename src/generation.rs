//! Content sources for the tier tree
//!
//! The controller asks a `TierSource` for a fresh tree on construction and
//! on every reset. `ProceduralGenerator` builds seeded demo/test content;
//! `StaticSource` replays a hand-authored tree.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::TierId;
use crate::tier::address::TierAddress;
use crate::tier::level::{TierLadder, TierLevel};
use crate::tier::state::{ResourceKind, TierSeed};
use crate::tier::tree::TierTree;

/// Produces an initial tier tree `depth` levels deep (1 = root only)
pub trait TierSource {
    fn build(&mut self, depth: usize) -> Result<TierTree>;
}

/// Per-capita (production, consumption) per year, before jitter
const PER_CAPITA: [(ResourceKind, f64, f64); 5] = [
    (ResourceKind::Food, 1.05, 1.0),
    (ResourceKind::Water, 1.1, 1.0),
    (ResourceKind::Energy, 2.0, 1.8),
    (ResourceKind::Materials, 0.5, 0.45),
    (ResourceKind::Luxuries, 0.1, 0.12),
];

/// Seeded random content, `branching` children per node
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    pub ladder: TierLadder,
    pub branching: u32,
    pub seed: u64,
}

impl ProceduralGenerator {
    pub fn new(ladder: TierLadder, branching: u32, seed: u64) -> Self {
        Self { ladder, branching, seed }
    }

    /// Typical population of one tier at `level`
    pub fn nominal_population(level: TierLevel) -> f64 {
        1_000.0 * level.time_scale().powf(1.5)
    }

    fn seed_for(&self, level: TierLevel, address: &TierAddress, rng: &mut ChaCha8Rng) -> TierSeed {
        let population = Self::nominal_population(level) * rng.gen_range(0.5..1.5);
        let capacity = population * rng.gen_range(2.0..5.0);

        let mut seed = TierSeed::new(format!("{:?} {}", level, address), level)
            .with_population(population, capacity)
            .with_tech(rng.gen_range(0..=3), 0.0)
            .with_stability(
                rng.gen_range(0.5..0.8),
                rng.gen_range(0.5..0.8),
                rng.gen_range(0.4..0.7),
            );

        for (kind, produce, consume) in PER_CAPITA {
            let production = population * produce * rng.gen_range(0.9..1.1);
            let consumption = population * consume * rng.gen_range(0.9..1.1);
            let stockpile = consumption * rng.gen_range(1.0..5.0);
            seed = seed.with_resource(kind, production, consumption, stockpile);
        }

        if level.coarser().is_none() {
            seed = seed.with_kardashev(rng.gen_range(0.7..1.2));
        }
        seed
    }
}

impl TierSource for ProceduralGenerator {
    fn build(&mut self, depth: usize) -> Result<TierTree> {
        let max_depth = self.ladder.levels().len();
        if depth == 0 || depth > max_depth {
            return Err(SimError::InvalidConfig(format!(
                "depth must be in 1..={} for the {:?} ladder, got {}",
                max_depth, self.ladder, depth
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let root_level = self.ladder.coarsest();
        let mut tree = TierTree::new(self.seed_for(root_level, &TierAddress::root(), &mut rng))?;

        let mut frontier: Vec<TierId> = vec![tree.root_id()];
        for steps in 1..depth {
            let Some(level) = TierLevel::from_top(self.ladder, steps) else {
                break;
            };

            let mut next = Vec::with_capacity(frontier.len() * self.branching as usize);
            for parent in frontier {
                for coord in 0..self.branching {
                    let address = match tree.get(parent) {
                        Some(p) => p.address.child(coord),
                        None => return Err(SimError::TierNotFound(parent)),
                    };
                    let seed = self.seed_for(level, &address, &mut rng);
                    next.push(tree.insert_child(parent, seed)?);
                }
            }
            frontier = next;
        }

        tracing::debug!(ladder = ?self.ladder, depth, tiers = tree.len(), "generated tier tree");
        Ok(tree)
    }
}

/// Replays one fixed tree regardless of the requested depth
#[derive(Debug, Clone)]
pub struct StaticSource {
    tree: TierTree,
}

impl StaticSource {
    pub fn new(tree: TierTree) -> Self {
        Self { tree }
    }
}

impl TierSource for StaticSource {
    fn build(&mut self, _depth: usize) -> Result<TierTree> {
        Ok(self.tree.clone())
    }
}
