//! Seed selection.
//!
//! Chooses the nodes that are infected before stage 0. Centrality
//! strategies rank nodes and then pick greedily under a minimum pairwise
//! hop distance, relaxing the distance one hop at a time until enough seeds
//! are found.

pub mod ranking;
pub mod selector;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::graph::Topology;
use crate::types::NodeId;

pub use ranking::{rank_scores, strategy_scores, RankedNode};
pub use selector::{select_seeds, FixedSeeds, StrategySeeds};

/// Error type for seed selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Graph has no nodes.
    #[error("Cannot select seeds from an empty graph")]
    EmptyGraph,
    /// Zero seeds requested.
    #[error("Seed count must be at least 1")]
    ZeroCount,
    /// More seeds requested than nodes exist.
    #[error("Requested {requested} seeds but graph has only {available} nodes")]
    CountExceedsNodes {
        /// Requested seed count.
        requested: usize,
        /// Nodes in the graph.
        available: usize,
    },
    /// Fixed seed outside the graph.
    #[error("Seed node {node} out of range for graph with {num_nodes} nodes")]
    NodeOutOfRange {
        /// Offending node.
        node: NodeId,
        /// Node count of the graph.
        num_nodes: usize,
    },
}

/// How seed nodes are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStrategy {
    /// Uniform sample without replacement; no diversity constraint.
    Random,
    /// Highest degree first.
    Degree,
    /// Highest betweenness centrality first.
    Betweenness,
    /// Highest closeness centrality first.
    Closeness,
}

impl SeedStrategy {
    /// All strategies, in comparison order.
    pub const ALL: [SeedStrategy; 4] = [
        SeedStrategy::Random,
        SeedStrategy::Degree,
        SeedStrategy::Betweenness,
        SeedStrategy::Closeness,
    ];
}

impl fmt::Display for SeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Degree => write!(f, "degree"),
            Self::Betweenness => write!(f, "betweenness"),
            Self::Closeness => write!(f, "closeness"),
        }
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown seed strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for SeedStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "degree" => Ok(Self::Degree),
            "betweenness" => Ok(Self::Betweenness),
            "closeness" => Ok(Self::Closeness),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Outcome of a seed selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSelection {
    /// Selected nodes in acceptance order.
    pub nodes: Vec<NodeId>,
    /// Number of seeds asked for.
    pub requested: usize,
    /// Smallest pairwise distance bound in force when the last seed was
    /// accepted. Equals the requested minimum unless the bound was relaxed.
    pub separation: usize,
}

impl SeedSelection {
    /// Whether the requested number of seeds was reached.
    pub fn satisfied(&self) -> bool {
        self.nodes.len() == self.requested
    }

    /// Number of selected seeds.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Chooses the seed set for a diffusion run.
pub trait SeedSelectionPolicy: Send + Sync {
    /// Short label for logs and reports.
    fn label(&self) -> String;

    /// Whether repeated calls can return different seed sets.
    fn is_randomized(&self) -> bool;

    /// Select seeds on `graph`.
    fn select(&self, graph: &dyn Topology, rng: &mut dyn RngCore) -> Result<SeedSelection, SeedError>;
}
