//! Stage-synchronous diffusion engine.
//!
//! The engine owns the node states of exactly one run and advances them one
//! stage at a time. Every decision in a stage is taken against the state as
//! it was when the stage began, so the outcome does not depend on the order
//! nodes are visited in.

use std::ops::Range;
use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::graph::Topology;
use crate::observer::StageObserver;
use crate::policy::DiffusionModel;
use crate::types::state::clamp_probability;
use crate::types::{NodeId, NodeState, StateCounts, StateStore};

/// Error type for engine construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Graph has no nodes.
    #[error("Cannot diffuse over an empty graph")]
    EmptyGraph,
    /// No seed nodes given.
    #[error("At least one seed node is required")]
    NoSeeds,
    /// Seed id outside the graph.
    #[error("Seed node {node} out of range for graph with {num_nodes} nodes")]
    SeedOutOfRange {
        /// Offending seed.
        node: NodeId,
        /// Node count of the graph.
        num_nodes: usize,
    },
    /// Fixed propagation root outside the graph.
    #[error("Propagation root {root} out of range for graph with {num_nodes} nodes")]
    RootOutOfRange {
        /// Offending root.
        root: NodeId,
        /// Node count of the graph.
        num_nodes: usize,
    },
}

/// Where the per-stage breadth-first propagation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "root", rename_all = "snake_case")]
pub enum PropagationMode {
    /// Breadth-first from all seed nodes at once.
    #[default]
    MultiSource,
    /// Breadth-first from a single node regardless of where the seeds are.
    ///
    /// Infected components not reachable from the root never spread.
    FixedRoot(NodeId),
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Propagation traversal roots.
    pub propagation: PropagationMode,
}

impl EngineConfig {
    /// Propagate from a single fixed root.
    pub fn fixed_root(root: NodeId) -> Self {
        Self { propagation: PropagationMode::FixedRoot(root) }
    }

    /// Propagate from every seed.
    pub fn multi_source() -> Self {
        Self { propagation: PropagationMode::MultiSource }
    }
}

/// Summary of one completed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage index passed to [`DiffusionEngine::diffuse_stage`].
    pub stage: usize,
    /// Nodes infected by this stage's commit.
    pub newly_infected: usize,
    /// Counts after commit.
    pub counts: StateCounts,
}

/// Diffusion state machine for one run.
///
/// ## Stage protocol
///
/// 1. Activation: every non-infected node gets a fresh activation decision;
///    infected nodes stay active
/// 2. Propagation: walk the breadth-first tree edges `(parent, child)` in
///    discovery order; for every infected parent with an active child, ask
///    the infection policy and buffer a positive answer on the child
/// 3. Commit: buffered infections become real, buffers are cleared
/// 4. Observers run with read-only access
///
/// Nodes infected during a stage never infect others in that same stage.
///
/// The breadth-first tree is fixed at construction: the topology is static
/// and the roots (seeds or a fixed root) never change.
pub struct DiffusionEngine<G: Topology> {
    graph: Arc<G>,
    model: DiffusionModel,
    states: StateStore,
    seeds: Vec<NodeId>,
    tree: Vec<(NodeId, NodeId)>,
    observers: Vec<Box<dyn StageObserver>>,
    rng: ChaCha8Rng,
    stages_run: usize,
}

impl<G: Topology> DiffusionEngine<G> {
    /// Create a new engine.
    ///
    /// Assigns both probabilities to every node in id order, then infects
    /// the seeds.
    ///
    /// # Arguments
    /// * `graph` - Shared topology, never mutated
    /// * `model` - Probability assignments and decision policies
    /// * `seeds` - Nodes infected before stage 0 (duplicates ignored)
    /// * `config` - Propagation mode
    /// * `rng` - Random source for every policy call in this run
    pub fn new(
        graph: Arc<G>,
        model: DiffusionModel,
        seeds: &[NodeId],
        config: EngineConfig,
        mut rng: ChaCha8Rng,
    ) -> Result<Self, EngineError> {
        let num_nodes = graph.num_nodes();
        if num_nodes == 0 {
            return Err(EngineError::EmptyGraph);
        }
        if seeds.is_empty() {
            return Err(EngineError::NoSeeds);
        }
        if let Some(&node) = seeds.iter().find(|s| !graph.contains(**s)) {
            return Err(EngineError::SeedOutOfRange { node, num_nodes });
        }

        let mut seeds = seeds.to_vec();
        seeds.sort();
        seeds.dedup();

        let roots = match config.propagation {
            PropagationMode::MultiSource => seeds.clone(),
            PropagationMode::FixedRoot(root) => {
                if !graph.contains(root) {
                    return Err(EngineError::RootOutOfRange { root, num_nodes });
                }
                vec![root]
            }
        };
        let tree = graph.bfs_successors(&roots);

        let mut clamped = 0usize;
        let mut nodes = Vec::with_capacity(num_nodes);
        for i in 0..num_nodes {
            let id = NodeId::new(i);
            let (ap, ap_clamped) = clamp_probability(model.activation_probability.assign(id, &mut rng));
            let (ip, ip_clamped) = clamp_probability(model.infection_probability.assign(id, &mut rng));
            clamped += ap_clamped as usize + ip_clamped as usize;
            nodes.push(NodeState::new(id, ap, ip));
        }
        if clamped > 0 {
            tracing::warn!(
                clamped = clamped,
                activation = model.activation_probability.name(),
                infection = model.infection_probability.name(),
                "Assigned probabilities outside [0, 1] were clamped"
            );
        }

        let mut states = StateStore::from_states(nodes);
        for &seed in &seeds {
            if let Some(state) = states.get_mut(seed) {
                state.infect();
            }
        }

        tracing::debug!(
            nodes = num_nodes,
            seeds = seeds.len(),
            tree_edges = tree.len(),
            propagation = ?config.propagation,
            "Diffusion engine initialized"
        );

        Ok(Self {
            graph,
            model,
            states,
            seeds,
            tree,
            observers: Vec::new(),
            rng,
            stages_run: 0,
        })
    }

    /// Register a post-stage observer.
    pub fn add_observer(&mut self, observer: impl StageObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Builder form of [`Self::add_observer`].
    pub fn with_observer(mut self, observer: impl StageObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    /// Advance the simulation by one stage.
    pub fn diffuse_stage(&mut self, stage: usize) -> StageReport {
        // Activation
        for state in self.states.iter_mut() {
            if !state.is_infected() {
                let active = self.model.activation.decide(state, &mut self.rng);
                state.set_active(active);
            }
        }

        // Propagation against the pre-commit snapshot; `infected` is not
        // written until commit
        for &(parent, child) in &self.tree {
            let (Some(p), Some(c)) = (self.states.get(parent), self.states.get(child)) else {
                continue;
            };
            if !(p.is_infected() && c.is_active()) {
                continue;
            }
            if self.model.infection.decide(p, c, &mut self.rng) {
                if let Some(c) = self.states.get_mut(child) {
                    c.mark_pending();
                }
            }
        }

        // Commit
        let mut newly_infected = 0;
        for state in self.states.iter_mut() {
            if state.commit() {
                newly_infected += 1;
            }
        }

        self.stages_run += 1;
        let counts = self.states.counts();

        tracing::debug!(
            stage = stage,
            newly_infected = newly_infected,
            infected = counts.infected,
            total = counts.total,
            "Stage committed"
        );

        for observer in &mut self.observers {
            observer.on_stage(self.graph.as_ref(), &self.states, stage);
        }

        StageReport { stage, newly_infected, counts }
    }

    /// Run one stage per index in `stages`.
    pub fn run(&mut self, stages: Range<usize>) -> Vec<StageReport> {
        stages.map(|stage| self.diffuse_stage(stage)).collect()
    }

    /// Node states.
    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// State of one node.
    pub fn state(&self, node: NodeId) -> Option<&NodeState> {
        self.states.get(node)
    }

    /// Current counts.
    pub fn counts(&self) -> StateCounts {
        self.states.counts()
    }

    /// Current infected fraction.
    pub fn infected_fraction(&self) -> f64 {
        self.states.infected_fraction()
    }

    /// Infected node ids, ascending.
    pub fn infected_nodes(&self) -> Vec<NodeId> {
        self.states.infected_nodes()
    }

    /// Seed nodes, ascending and deduplicated.
    pub fn seeds(&self) -> &[NodeId] {
        &self.seeds
    }

    /// Breadth-first tree edges the propagation phase walks.
    pub fn propagation_tree(&self) -> &[(NodeId, NodeId)] {
        &self.tree
    }

    /// Number of stages run so far.
    pub fn stages_run(&self) -> usize {
        self.stages_run
    }

    /// The topology.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Consume the engine, keeping the final node states.
    pub fn into_states(self) -> StateStore {
        self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;
    use crate::observer::CoverageRecorder;
    use crate::policy::{
        AlwaysActive, AlwaysInfect, Constant, DiffusionModel, NeverActive, ThresholdActivation,
    };
    use rand::SeedableRng;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(5)
    }

    fn path(len: usize) -> Arc<AdjacencyGraph> {
        Arc::new(AdjacencyGraph::from_pairs(len, (1..len).map(|i| (i - 1, i))).unwrap())
    }

    fn engine(graph: Arc<AdjacencyGraph>, model: DiffusionModel, seeds: &[NodeId]) -> DiffusionEngine<AdjacencyGraph> {
        DiffusionEngine::new(graph, model, seeds, EngineConfig::default(), rng()).unwrap()
    }

    #[test]
    fn test_seeds_infected_at_construction() {
        let e = engine(path(3), DiffusionModel::deterministic(), &[n(2), n(2)]);
        assert_eq!(e.infected_nodes(), vec![n(2)]);
        assert_eq!(e.seeds(), &[n(2)]);
        assert!(e.states().iter().all(|s| s.is_active() && !s.is_pending()));
    }

    #[test]
    fn test_one_hop_per_stage() {
        let mut e = engine(path(5), DiffusionModel::deterministic(), &[n(0)]);
        for stage in 0..4 {
            let report = e.diffuse_stage(stage);
            assert_eq!(report.newly_infected, 1);
            assert_eq!(report.counts.infected, stage + 2);
        }
        assert_eq!(e.counts().infected, 5);
        assert_eq!(e.stages_run(), 4);
    }

    #[test]
    fn test_newly_infected_do_not_propagate_same_stage() {
        // Star center 0 with leaves; path 1-5 hangs off leaf 1
        let g = Arc::new(AdjacencyGraph::from_pairs(6, [(0, 1), (0, 2), (1, 5)]).unwrap());
        let mut e = engine(g, DiffusionModel::deterministic(), &[n(0)]);
        e.diffuse_stage(0);
        assert_eq!(e.infected_nodes(), vec![n(0), n(1), n(2)]);
        assert!(!e.state(n(5)).unwrap().is_infected());
    }

    #[test]
    fn test_inactive_nodes_not_infected() {
        let model = DiffusionModel::new(Constant(1.0), Constant(1.0), NeverActive, AlwaysInfect);
        let mut e = engine(path(4), model, &[n(0)]);
        e.run(0..10);
        assert_eq!(e.infected_nodes(), vec![n(0)]);
        assert!(e.state(n(0)).unwrap().is_active());
        assert!(!e.state(n(1)).unwrap().is_active());
    }

    #[test]
    fn test_fixed_root_unreachable_seed_never_spreads() {
        // Components {0,1} and {2,3}; root 0 but seed 2
        let g = Arc::new(AdjacencyGraph::from_pairs(4, [(0, 1), (2, 3)]).unwrap());
        let mut e = DiffusionEngine::new(
            g,
            DiffusionModel::deterministic(),
            &[n(2)],
            EngineConfig::fixed_root(n(0)),
            rng(),
        )
        .unwrap();
        e.run(0..5);
        assert_eq!(e.infected_nodes(), vec![n(2)]);
    }

    #[test]
    fn test_multi_source_spreads_from_every_seed() {
        let g = Arc::new(AdjacencyGraph::from_pairs(4, [(0, 1), (2, 3)]).unwrap());
        let mut e = engine(g, DiffusionModel::deterministic(), &[n(0), n(2)]);
        e.diffuse_stage(0);
        assert_eq!(e.counts().infected, 4);
    }

    #[test]
    fn test_probabilities_clamped() {
        let model = DiffusionModel::new(Constant(2.5), Constant(-1.0), AlwaysActive, AlwaysInfect);
        let e = engine(path(2), model, &[n(0)]);
        let s = e.state(n(1)).unwrap();
        assert_eq!(s.activation_probability(), 1.0);
        assert_eq!(s.infection_probability(), 0.0);
    }

    #[test]
    fn test_construction_errors() {
        let g = path(3);
        let model = DiffusionModel::deterministic();
        let cfg = EngineConfig::default();

        let err = DiffusionEngine::new(Arc::clone(&g), model.clone(), &[], cfg, rng()).err();
        assert_eq!(err, Some(EngineError::NoSeeds));

        let err = DiffusionEngine::new(Arc::clone(&g), model.clone(), &[n(3)], cfg, rng()).err();
        assert_eq!(err, Some(EngineError::SeedOutOfRange { node: n(3), num_nodes: 3 }));

        let err = DiffusionEngine::new(g, model.clone(), &[n(0)], EngineConfig::fixed_root(n(9)), rng()).err();
        assert_eq!(err, Some(EngineError::RootOutOfRange { root: n(9), num_nodes: 3 }));

        let empty = Arc::new(AdjacencyGraph::new(0));
        let err = DiffusionEngine::new(empty, model, &[n(0)], cfg, rng()).err();
        assert_eq!(err, Some(EngineError::EmptyGraph));
    }

    #[test]
    fn test_observer_sees_every_stage() {
        let recorder = CoverageRecorder::new();
        let mut e = engine(path(3), DiffusionModel::deterministic(), &[n(0)])
            .with_observer(recorder.clone());
        e.run(0..3);

        let points = recorder.snapshot();
        assert_eq!(points.iter().map(|p| p.stage).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(points.iter().map(|p| p.infected).collect::<Vec<_>>(), vec![2, 3, 3]);
    }

    #[test]
    fn test_same_rng_seed_same_outcome() {
        let g = Arc::new(
            AdjacencyGraph::from_pairs(30, (1..30).flat_map(|i| [(i - 1, i), (0, i)])).unwrap(),
        );
        let model = DiffusionModel::new(Constant(0.5), Constant(0.5), ThresholdActivation, crate::policy::ThresholdInfection);

        let mut a = engine(Arc::clone(&g), model.clone(), &[n(0)]);
        let mut b = engine(g, model, &[n(0)]);
        assert_eq!(a.run(0..6), b.run(0..6));
        assert_eq!(a.infected_nodes(), b.infected_nodes());
    }
}
