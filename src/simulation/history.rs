//! Bounded rolling history for charting

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::simulation::stats::SimulationStats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub tick: Tick,
    pub population: f64,
    pub production: f64,
    pub consumption: f64,
    pub trade_volume: f64,
    pub efficiency: f64,
    pub stability: f64,
}

impl From<&SimulationStats> for HistorySample {
    fn from(stats: &SimulationStats) -> Self {
        Self {
            tick: stats.tick,
            population: stats.total_population,
            production: stats.total_production,
            consumption: stats.total_consumption,
            trade_volume: stats.trade_volume,
            efficiency: stats.efficiency,
            stability: stats.average_stability,
        }
    }
}

/// Oldest samples are dropped once `capacity` is reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: HistorySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn series(&self, metric: impl Fn(&HistorySample) -> f64) -> Vec<f64> {
        self.samples.iter().map(metric).collect()
    }

    pub fn ticks(&self) -> Vec<Tick> {
        self.samples.iter().map(|s| s.tick).collect()
    }

    pub fn population(&self) -> Vec<f64> {
        self.series(|s| s.population)
    }

    pub fn production(&self) -> Vec<f64> {
        self.series(|s| s.production)
    }

    pub fn consumption(&self) -> Vec<f64> {
        self.series(|s| s.consumption)
    }

    pub fn trade_volume(&self) -> Vec<f64> {
        self.series(|s| s.trade_volume)
    }

    pub fn efficiency(&self) -> Vec<f64> {
        self.series(|s| s.efficiency)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tick: Tick) -> HistorySample {
        HistorySample {
            tick,
            population: tick as f64 * 10.0,
            production: 0.0,
            consumption: 0.0,
            trade_volume: 0.0,
            efficiency: 1.0,
            stability: 0.5,
        }
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new(3);
        for tick in 1..=5 {
            history.push(sample(tick));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.ticks(), vec![3, 4, 5]);
        assert_eq!(history.population(), vec![30.0, 40.0, 50.0]);
        assert_eq!(history.latest().map(|s| s.tick), Some(5));
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(2);
        history.push(sample(1));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 2);
    }
}
