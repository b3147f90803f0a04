//! Node ranking for seed selection.

use crate::graph::{betweenness_centrality, closeness_centrality, degree_centrality, Topology};
use crate::types::NodeId;
use super::SeedStrategy;

/// Node with its ranking score.
#[derive(Debug, Clone, Copy)]
pub struct RankedNode {
    /// Node id.
    pub node: NodeId,
    /// Score under the ranking strategy.
    pub score: f64,
}

// Ordering for ranking: highest score first, then lowest id
impl PartialEq for RankedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for RankedNode {}

impl PartialOrd for RankedNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Primary: higher score first (NaN sorts last)
        // Secondary: lower id first (enumeration order)
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Scores for a centrality strategy, indexed by node id.
///
/// Returns `None` for [`SeedStrategy::Random`], which has no ranking.
pub fn strategy_scores<G: Topology + ?Sized>(graph: &G, strategy: SeedStrategy) -> Option<Vec<f64>> {
    match strategy {
        SeedStrategy::Random => None,
        SeedStrategy::Degree => Some(degree_centrality(graph)),
        SeedStrategy::Betweenness => Some(betweenness_centrality(graph)),
        SeedStrategy::Closeness => Some(closeness_centrality(graph)),
    }
}

/// Rank all nodes by score, best first.
pub fn rank_scores(scores: &[f64]) -> Vec<RankedNode> {
    let mut ranked: Vec<RankedNode> = scores
        .iter()
        .enumerate()
        .map(|(i, &score)| RankedNode {
            node: NodeId::new(i),
            // NaN would break the ordering contract; treat as worst
            score: if score.is_nan() { f64::NEG_INFINITY } else { score },
        })
        .collect();
    ranked.sort();
    ranked
}
