//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Controller tick counter (simulation time unit)
pub type Tick = u64;

/// Unique identifier for tiers
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "T{}", _0)]
pub struct TierId(pub u32);

impl TierId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for belief actors (deities, cults, anything that
/// performs miracles or founds temples)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "A{}", _0)]
pub struct ActorId(pub u32);

impl ActorId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier assigned to events by the global event log
pub type EventId = u64;
