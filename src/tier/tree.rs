//! Tier tree: an arena of tiers plus a parent index
//!
//! Ownership is a plain tree. Each tier lists its children by id and the
//! arena holds every node; removing a tier removes its whole subtree.
//! Parent links live in a separate id -> id index rather than on the
//! nodes themselves.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::TierId;
use crate::statistical::TECH_TABLE_SIZE;
use crate::tier::address::TierAddress;
use crate::tier::level::TierLadder;
use crate::tier::state::{Tier, TierSeed};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierTree {
    nodes: BTreeMap<TierId, Tier>,
    parents: AHashMap<TierId, TierId>,
    root: TierId,
    next_id: u32,
}

impl TierTree {
    /// Create a tree holding only a root tier
    pub fn new(root: TierSeed) -> Result<Self> {
        root.validate((TECH_TABLE_SIZE - 1) as u8)?;

        let id = TierId(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(id, Tier::from_seed(id, TierAddress::root(), root));

        Ok(Self {
            nodes,
            parents: AHashMap::new(),
            root: id,
            next_id: 2,
        })
    }

    /// Add a child beneath `parent`. The child must come from the same
    /// ladder and be strictly finer than its parent.
    pub fn insert_child(&mut self, parent: TierId, seed: TierSeed) -> Result<TierId> {
        seed.validate((TECH_TABLE_SIZE - 1) as u8)?;

        let parent_tier = self.nodes.get(&parent).ok_or(SimError::TierNotFound(parent))?;
        if !parent_tier.level.is_coarser_than(&seed.level) {
            return Err(SimError::InvalidHierarchy(format!(
                "{:?} '{}' cannot be placed under {:?} '{}'",
                seed.level, seed.name, parent_tier.level, parent_tier.name
            )));
        }

        let coord = parent_tier
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .map(|c| c.address.last() + 1)
            .max()
            .unwrap_or(0);
        let address = parent_tier.address.child(coord);

        let id = TierId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(id, Tier::from_seed(id, address, seed));
        self.parents.insert(id, parent);
        if let Some(parent_tier) = self.nodes.get_mut(&parent) {
            parent_tier.children.push(id);
        }

        Ok(id)
    }

    /// Detach a tier and release its whole subtree. The root cannot be
    /// removed. Returned tiers are in pre-order.
    pub fn remove_subtree(&mut self, id: TierId) -> Result<Vec<Tier>> {
        if id == self.root {
            return Err(SimError::InvalidHierarchy("the root tier cannot be removed".into()));
        }
        if !self.nodes.contains_key(&id) {
            return Err(SimError::TierNotFound(id));
        }

        if let Some(parent) = self.parents.get(&id).copied() {
            if let Some(parent_tier) = self.nodes.get_mut(&parent) {
                parent_tier.children.retain(|c| *c != id);
            }
        }

        let ids = self.pre_order(id);
        let mut removed = Vec::with_capacity(ids.len());
        for tier_id in ids {
            self.parents.remove(&tier_id);
            if let Some(tier) = self.nodes.remove(&tier_id) {
                removed.push(tier);
            }
        }
        Ok(removed)
    }

    pub fn root_id(&self) -> TierId {
        self.root
    }

    pub fn root(&self) -> &Tier {
        &self.nodes[&self.root]
    }

    pub fn ladder(&self) -> TierLadder {
        self.root().level.ladder()
    }

    pub fn get(&self, id: TierId) -> Option<&Tier> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: TierId) -> Option<&mut Tier> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: TierId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent_of(&self, id: TierId) -> Option<TierId> {
        self.parents.get(&id).copied()
    }

    pub fn children_of(&self, id: TierId) -> &[TierId] {
        self.nodes
            .get(&id)
            .map(|t| t.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All tiers in id order
    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tier> {
        self.nodes.values_mut()
    }

    /// `id` and everything beneath it, parents before children
    pub fn pre_order(&self, id: TierId) -> Vec<TierId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(&id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children_of(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// `id` and everything beneath it, children before parents
    pub fn post_order(&self, id: TierId) -> Vec<TierId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(&id) {
            return out;
        }
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                out.push(current);
                continue;
            }
            stack.push((current, true));
            for child in self.children_of(current).iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Everything beneath `id`, excluding `id` itself
    pub fn descendants(&self, id: TierId) -> Vec<TierId> {
        let mut ids = self.pre_order(id);
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self, id: TierId) -> Vec<TierId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            out.push(parent);
            current = parent;
        }
        out
    }

    pub fn find_by_address(&self, address: &TierAddress) -> Option<TierId> {
        self.nodes.values().find(|t| &t.address == address).map(|t| t.id)
    }

    /// Check structural invariants: every non-root node has a parent
    /// that lists it, addresses extend the parent's by one coordinate,
    /// and levels strictly coarsen toward the root.
    pub fn validate(&self) -> Result<()> {
        for tier in self.nodes.values() {
            if tier.id == self.root {
                if self.parents.contains_key(&tier.id) {
                    return Err(SimError::InvalidHierarchy("root has a parent".into()));
                }
                continue;
            }

            let parent_id = self.parents.get(&tier.id).ok_or_else(|| {
                SimError::InvalidHierarchy(format!("{} has no parent entry", tier.id))
            })?;
            let parent = self
                .nodes
                .get(parent_id)
                .ok_or(SimError::TierNotFound(*parent_id))?;

            if !parent.children.contains(&tier.id) {
                return Err(SimError::InvalidHierarchy(format!(
                    "{} is not listed by its parent {}",
                    tier.id, parent.id
                )));
            }
            if !tier.address.is_child_of(&parent.address) {
                return Err(SimError::InvalidHierarchy(format!(
                    "address {} of {} does not extend parent address {}",
                    tier.address, tier.id, parent.address
                )));
            }
            if !parent.level.is_coarser_than(&tier.level) {
                return Err(SimError::InvalidHierarchy(format!(
                    "{} ({:?}) is not finer than parent {} ({:?})",
                    tier.id, tier.level, parent.id, parent.level
                )));
            }
        }
        Ok(())
    }
}
