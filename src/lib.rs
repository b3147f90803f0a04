//! # contagion-kernel
//!
//! Stage-synchronous stochastic diffusion over static networks.
//!
//! A set of seed nodes starts infected; every stage, non-infected nodes
//! decide whether they are active and infected nodes try to infect their
//! active neighbors. The kernel answers one question:
//!
//! > Given a network, a seeding strategy and a diffusion model, how many
//! > stages does it take to cover a target fraction of the network?
//!
//! ## Architecture
//!
//! ```text
//! Topology → SeedSelectionPolicy → DiffusionEngine ⟲ diffuse_stage
//!                                        ↓
//!                              PerformanceEvaluator → EvaluationReport
//! ```
//!
//! ## Determinism Guarantees
//!
//! - The engine draws no randomness itself; policies draw from an explicit
//!   per-run `ChaCha8Rng`
//! - Same graph + same model + same `rng_seed` → identical reports
//! - Neighbor lists, BFS order and seed ranking ties are ordered by node id

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod policy;
pub mod seeding;
pub mod engine;
pub mod observer;
pub mod evaluator;
pub mod canonical;

// Re-exports
pub use types::{NodeId, Edge, NodeState, StateCounts, StateStore};
pub use graph::{
    AdjacencyGraph, EdgeList, GraphError, Topology,
    betweenness_centrality, closeness_centrality, degree_centrality, bfs_depth,
};
pub use policy::{
    DiffusionModel, ProbabilityAssignment, ActivationPolicy, InfectionPolicy,
    Constant, UniformRange,
    AlwaysActive, NeverActive, CoinFlip, ThresholdActivation,
    AlwaysInfect, NeverInfect, ThresholdInfection,
};
pub use seeding::{
    SeedStrategy, SeedSelection, SeedSelectionPolicy, SeedError, UnknownStrategy,
    StrategySeeds, FixedSeeds, select_seeds,
};
pub use engine::{DiffusionEngine, EngineConfig, EngineError, PropagationMode, StageReport};
pub use observer::{StageObserver, CoverageRecorder, CoveragePoint, TracingObserver};
pub use evaluator::{
    PerformanceEvaluator, EvaluationConfig, EvaluationReport, EvaluationError,
    TrialOutcome, TrialRecord,
};
pub use canonical::{canonical_hash, canonical_hash_hex};

/// Schema version of serialized reports.
/// Increment on breaking changes to any serialized type.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
