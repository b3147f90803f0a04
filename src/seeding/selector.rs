//! Diversity-constrained seed selection.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::graph::Topology;
use crate::types::NodeId;
use super::ranking::{rank_scores, strategy_scores, RankedNode};
use super::{SeedError, SeedSelection, SeedSelectionPolicy, SeedStrategy};

/// Select `count` seed nodes with `strategy`.
///
/// ## Algorithm
///
/// For centrality strategies:
///
/// 1. Rank all nodes by score, best first (ties by ascending id)
/// 2. Accept the top-ranked node
/// 3. For `distance` from `min_distance` down to 1:
///    - Scan the remaining ranked nodes in order
///    - Accept a node if its hop distance to every accepted node is at
///      least `distance` (unreachable counts as infinitely far)
///    - Stop once `count` nodes are accepted
///
/// `min_distance == 0` imposes no separation and yields the top `count`
/// nodes. [`SeedStrategy::Random`] ignores `min_distance` and samples
/// uniformly without replacement from `rng`; centrality strategies never
/// touch `rng`.
pub fn select_seeds<G: Topology + ?Sized>(
    graph: &G,
    strategy: SeedStrategy,
    count: usize,
    min_distance: usize,
    rng: &mut dyn RngCore,
) -> Result<SeedSelection, SeedError> {
    let n = graph.num_nodes();
    if n == 0 {
        return Err(SeedError::EmptyGraph);
    }
    if count == 0 {
        return Err(SeedError::ZeroCount);
    }
    if count > n {
        return Err(SeedError::CountExceedsNodes { requested: count, available: n });
    }

    let Some(scores) = strategy_scores(graph, strategy) else {
        let nodes = rand::seq::index::sample(rng, n, count)
            .into_iter()
            .map(NodeId::new)
            .collect();
        return Ok(SeedSelection { nodes, requested: count, separation: 0 });
    };

    let ranked = rank_scores(&scores);
    let selection = diverse_greedy(graph, &ranked, count, min_distance);

    if selection.separation < min_distance {
        tracing::warn!(
            strategy = %strategy,
            requested_distance = min_distance,
            achieved_distance = selection.separation,
            "Seed separation relaxed to reach requested count"
        );
    }
    tracing::debug!(
        strategy = %strategy,
        count = selection.len(),
        separation = selection.separation,
        "Seeds selected"
    );

    Ok(selection)
}

fn diverse_greedy<G: Topology + ?Sized>(
    graph: &G,
    ranked: &[RankedNode],
    count: usize,
    min_distance: usize,
) -> SeedSelection {
    let mut taken = vec![false; graph.num_nodes()];
    let mut nodes = Vec::with_capacity(count);
    let mut distances: Vec<Vec<Option<usize>>> = Vec::with_capacity(count);
    let mut separation = min_distance;

    let Some(top) = ranked.first() else {
        return SeedSelection { nodes, requested: count, separation };
    };
    taken[top.node.index()] = true;
    nodes.push(top.node);
    distances.push(graph.distances_from(top.node));

    for distance in (1..=min_distance.max(1)).rev() {
        for candidate in &ranked[1..] {
            if nodes.len() >= count {
                break;
            }
            let idx = candidate.node.index();
            if taken[idx] {
                continue;
            }
            let far_enough = distances
                .iter()
                .all(|from| from[idx].map_or(true, |hops| hops >= distance));
            if far_enough {
                taken[idx] = true;
                nodes.push(candidate.node);
                distances.push(graph.distances_from(candidate.node));
                separation = separation.min(distance);
            }
        }
        if nodes.len() >= count {
            break;
        }
    }

    SeedSelection { nodes, requested: count, separation }
}

/// Seed policy backed by [`select_seeds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySeeds {
    /// Ranking strategy.
    pub strategy: SeedStrategy,
    /// Number of seeds.
    pub count: usize,
    /// Requested minimum pairwise hop distance.
    pub min_distance: usize,
}

impl StrategySeeds {
    /// Create a new strategy seed policy.
    pub fn new(strategy: SeedStrategy, count: usize, min_distance: usize) -> Self {
        Self { strategy, count, min_distance }
    }
}

impl SeedSelectionPolicy for StrategySeeds {
    fn label(&self) -> String {
        format!("{}(n={}, d={})", self.strategy, self.count, self.min_distance)
    }

    fn is_randomized(&self) -> bool {
        self.strategy == SeedStrategy::Random
    }

    fn select(&self, graph: &dyn Topology, rng: &mut dyn RngCore) -> Result<SeedSelection, SeedError> {
        select_seeds(graph, self.strategy, self.count, self.min_distance, rng)
    }
}

/// Explicit seed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSeeds(pub Vec<NodeId>);

impl FixedSeeds {
    /// Seed a single node.
    pub fn single(node: NodeId) -> Self {
        Self(vec![node])
    }
}

impl SeedSelectionPolicy for FixedSeeds {
    fn label(&self) -> String {
        let ids: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        format!("fixed[{}]", ids.join(","))
    }

    fn is_randomized(&self) -> bool {
        false
    }

    fn select(&self, graph: &dyn Topology, _rng: &mut dyn RngCore) -> Result<SeedSelection, SeedError> {
        let num_nodes = graph.num_nodes();
        if num_nodes == 0 {
            return Err(SeedError::EmptyGraph);
        }
        if self.0.is_empty() {
            return Err(SeedError::ZeroCount);
        }

        let mut nodes = Vec::with_capacity(self.0.len());
        for &node in &self.0 {
            if !graph.contains(node) {
                return Err(SeedError::NodeOutOfRange { node, num_nodes });
            }
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }

        let requested = nodes.len();
        Ok(SeedSelection { nodes, requested, separation: 0 })
    }
}
