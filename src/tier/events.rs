//! Tier events and the bounded event log

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{EventId, Tick, TierId};

/// An event raised by a step function during one tick. Lives in the
/// tier's `active_events` until the controller collects it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierEvent {
    pub tick: Tick,
    pub tier: TierId,
    pub kind: TierEventKind,
    pub participants: Vec<TierId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TierEventKind {
    /// Generic instability event; severity is stability lost
    Unrest { severity: f64 },
    /// Population hit the minimum viable floor while declining
    PopulationCollapse { from: f64, to: f64 },
    TechBreakthrough { level: u8 },
    InfrastructureBuilt { kind: InfrastructureKind },
    CivilizationAdvanced { kardashev: f64 },
    Mega(MegaEventKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfrastructureKind {
    OrbitalStation,
    WormholeLink,
    Megastructure,
}

/// Rare events that only fire at the coarsest tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MegaEventKind {
    GalacticWar,
    Plague,
    Ascension,
    GoldenAge,
    StellarCollapse,
}

/// Side effects of a mega-event on the tier it strikes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MegaEffect {
    /// Multiplier applied to population
    pub population: f64,
    /// Tech levels gained (never lost)
    pub tech_levels: u8,
    /// Added to every stability score before clamping
    pub stability: f64,
}

impl MegaEventKind {
    pub const ALL: [MegaEventKind; 5] = [
        MegaEventKind::GalacticWar,
        MegaEventKind::Plague,
        MegaEventKind::Ascension,
        MegaEventKind::GoldenAge,
        MegaEventKind::StellarCollapse,
    ];

    pub fn effect(&self) -> MegaEffect {
        match self {
            MegaEventKind::GalacticWar => MegaEffect { population: 0.8, tech_levels: 0, stability: -0.2 },
            MegaEventKind::Plague => MegaEffect { population: 0.9, tech_levels: 0, stability: -0.1 },
            MegaEventKind::Ascension => MegaEffect { population: 1.0, tech_levels: 1, stability: 0.05 },
            MegaEventKind::GoldenAge => MegaEffect { population: 1.05, tech_levels: 0, stability: 0.2 },
            MegaEventKind::StellarCollapse => MegaEffect { population: 0.95, tech_levels: 0, stability: -0.05 },
        }
    }
}

/// Event with its log-assigned id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub id: EventId,
    pub event: TierEvent,
}

/// Capacity-bounded log of collected events. Oldest entries are dropped
/// first; ids keep increasing regardless.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<LoggedEvent>,
    capacity: usize,
    next_event_id: EventId,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_event_id: 0,
        }
    }

    pub fn push(&mut self, event: TierEvent) -> EventId {
        let id = self.next_event_id;
        self.next_event_id += 1;

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(LoggedEvent { id, event });
        id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events ever pushed, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.next_event_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter()
    }

    pub fn events_for_tick(&self, tick: Tick) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter().filter(move |e| e.event.tick == tick)
    }

    pub fn events_for_tier(&self, tier: TierId) -> impl Iterator<Item = &LoggedEvent> {
        self.events
            .iter()
            .filter(move |e| e.event.tier == tier || e.event.participants.contains(&tier))
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.next_event_id = 0;
    }
}
