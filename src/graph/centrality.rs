//! Node centrality measures used for seed ranking.
//!
//! All functions return one score per node, indexed by node id.

use std::collections::VecDeque;

use crate::types::NodeId;
use super::Topology;

/// Degree of every node.
pub fn degree_centrality<G: Topology + ?Sized>(graph: &G) -> Vec<f64> {
    (0..graph.num_nodes())
        .map(|i| graph.degree(NodeId::new(i)) as f64)
        .collect()
}

/// Betweenness centrality (Brandes' algorithm, unweighted).
///
/// The score of `v` is the fraction of shortest paths between all other
/// pairs `(s, t)` that pass through `v`, normalized by the number of pairs
/// `(n-1)(n-2)/2`. Graphs with fewer than three nodes score all zeros.
pub fn betweenness_centrality<G: Topology + ?Sized>(graph: &G) -> Vec<f64> {
    let n = graph.num_nodes();
    let mut centrality = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for s in 0..n {
        stack.clear();
        for p in preds.iter_mut() {
            p.clear();
        }
        sigma.iter_mut().for_each(|x| *x = 0.0);
        dist.iter_mut().for_each(|d| *d = None);
        delta.iter_mut().for_each(|x| *x = 0.0);

        sigma[s] = 1.0;
        dist[s] = Some(0);
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in graph.neighbors(NodeId::new(v)) {
                let w = w.index();
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    // Each unordered pair was counted from both endpoints
    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        centrality.iter_mut().for_each(|c| *c *= scale);
    } else {
        centrality.iter_mut().for_each(|c| *c = 0.0);
    }

    centrality
}

/// Closeness centrality: inverse mean hop distance to reachable nodes.
///
/// For disconnected graphs the score is scaled by the fraction of the graph
/// the node can reach (Wasserman–Faust), so nodes in small components do
/// not outrank well-connected ones. Isolated nodes score zero.
pub fn closeness_centrality<G: Topology + ?Sized>(graph: &G) -> Vec<f64> {
    let n = graph.num_nodes();
    (0..n)
        .map(|i| {
            let dist = graph.distances_from(NodeId::new(i));
            let (reachable, total) = dist
                .iter()
                .flatten()
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));
            if total == 0 || n < 2 {
                return 0.0;
            }
            let others = (reachable - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}
