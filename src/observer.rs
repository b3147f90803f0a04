//! Post-stage observers.
//!
//! Observers run after every committed stage with read-only access to the
//! topology and the node states.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::graph::Topology;
use crate::types::StateStore;

/// Hook invoked by [`crate::DiffusionEngine`] after each stage commits.
pub trait StageObserver: Send {
    /// Called once per stage, after commit.
    fn on_stage(&mut self, graph: &dyn Topology, states: &StateStore, stage: usize);
}

/// Infected coverage at the end of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoveragePoint {
    /// Stage index.
    pub stage: usize,
    /// Infected node count.
    pub infected: usize,
    /// Infected fraction.
    pub fraction: f64,
}

/// Records coverage after every stage.
///
/// Clones share one buffer: register a clone with the engine and keep the
/// original to read the history.
#[derive(Debug, Clone, Default)]
pub struct CoverageRecorder {
    points: Arc<Mutex<Vec<CoveragePoint>>>,
}

impl CoverageRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded history.
    pub fn snapshot(&self) -> Vec<CoveragePoint> {
        self.points.lock().clone()
    }

    /// Most recent point.
    pub fn last(&self) -> Option<CoveragePoint> {
        self.points.lock().last().copied()
    }

    /// Number of recorded stages.
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }
}

impl StageObserver for CoverageRecorder {
    fn on_stage(&mut self, _graph: &dyn Topology, states: &StateStore, stage: usize) {
        let counts = states.counts();
        self.points.lock().push(CoveragePoint {
            stage,
            infected: counts.infected,
            fraction: counts.infected_fraction(),
        });
    }
}

/// Emits one `tracing` event per stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_stage(&mut self, graph: &dyn Topology, states: &StateStore, stage: usize) {
        let counts = states.counts();
        tracing::info!(
            stage = stage,
            infected = counts.infected,
            active = counts.active,
            nodes = graph.num_nodes(),
            fraction = counts.infected_fraction(),
            "Stage complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;

    #[test]
    fn test_recorder_clones_share_buffer() {
        let recorder = CoverageRecorder::new();
        let mut registered = recorder.clone();
        let graph = AdjacencyGraph::new(0);

        registered.on_stage(&graph, &StateStore::default(), 0);
        registered.on_stage(&graph, &StateStore::default(), 1);

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.last().map(|p| p.stage), Some(1));
        assert_eq!(recorder.snapshot()[0].fraction, 0.0);
    }

    #[test]
    fn test_tracing_observer_reads_without_mutating() {
        let graph = AdjacencyGraph::new(0);
        let states = StateStore::default();
        TracingObserver.on_stage(&graph, &states, 3);
        assert!(states.is_empty());
    }
}
