//! Structured tier coordinates
//!
//! An address holds one coordinate per level from the root down to the
//! tier itself. The root's address is `[0]`; a child's address is its
//! parent's plus the child's index. Addresses never change after creation.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TierAddress {
    coords: Vec<u32>,
}

impl TierAddress {
    pub fn root() -> Self {
        Self { coords: vec![0] }
    }

    /// Address of a child at coordinate `coord` beneath this one
    pub fn child(&self, coord: u32) -> Self {
        let mut coords = self.coords.clone();
        coords.push(coord);
        Self { coords }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.coords.len() <= 1 {
            return None;
        }
        Some(Self {
            coords: self.coords[..self.coords.len() - 1].to_vec(),
        })
    }

    /// Number of levels below the root (root = 0)
    pub fn depth(&self) -> usize {
        self.coords.len() - 1
    }

    pub fn coords(&self) -> &[u32] {
        &self.coords
    }

    /// Coordinate at this address's own level
    pub fn last(&self) -> u32 {
        self.coords[self.coords.len() - 1]
    }

    /// True if `self` is exactly `parent` plus one coordinate
    pub fn is_child_of(&self, parent: &TierAddress) -> bool {
        self.coords.len() == parent.coords.len() + 1 && self.coords.starts_with(&parent.coords)
    }

    pub fn is_descendant_of(&self, ancestor: &TierAddress) -> bool {
        self.coords.len() > ancestor.coords.len() && self.coords.starts_with(&ancestor.coords)
    }
}

impl Default for TierAddress {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for TierAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.coords.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}
