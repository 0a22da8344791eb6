//! Simulation driver: tick loop, zoom, statistics and history

pub mod controller;
pub mod detail;
pub mod history;
pub mod stats;

pub use controller::{SimulationController, StateSnapshot, StateView};
pub use detail::{DetailedSimulation, PassiveDetail};
pub use history::{History, HistorySample};
pub use stats::SimulationStats;
