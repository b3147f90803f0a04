//! Network topology.
//!
//! The diffusion core only ever reads topology through [`Topology`]. Node ids
//! are the dense range `0..num_nodes()`; neighbor lists are returned in
//! ascending order so every traversal below is deterministic.

pub mod memory;
pub mod centrality;

use std::collections::VecDeque;

use crate::types::NodeId;

/// Read-only capability surface of a static, undirected network.
///
/// Implementations must return neighbor lists sorted ascending without
/// duplicates. The trait is object safe so observers can receive a
/// `&dyn Topology`.
pub trait Topology: Send + Sync {
    /// Number of nodes. Valid ids are `0..num_nodes()`.
    fn num_nodes(&self) -> usize;

    /// Neighbors of a node, ascending. Unknown nodes have no neighbors.
    fn neighbors(&self, node: NodeId) -> &[NodeId];

    /// Number of edges.
    fn num_edges(&self) -> usize;

    /// Check whether `node` is a valid id.
    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.num_nodes()
    }

    /// Degree of a node.
    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Breadth-first tree edges `(parent, child)` in discovery order.
    ///
    /// The search starts simultaneously from every root (in the order
    /// given); each reachable node is discovered exactly once, so each
    /// appears as a child at most once. Roots out of range or repeated are
    /// ignored. Nodes not reachable from any root do not appear.
    fn bfs_successors(&self, roots: &[NodeId]) -> Vec<(NodeId, NodeId)> {
        let n = self.num_nodes();
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        let mut tree = Vec::new();

        for &root in roots {
            if root.index() < n && !visited[root.index()] {
                visited[root.index()] = true;
                queue.push_back(root);
            }
        }

        while let Some(parent) = queue.pop_front() {
            for &child in self.neighbors(parent) {
                if !visited[child.index()] {
                    visited[child.index()] = true;
                    tree.push((parent, child));
                    queue.push_back(child);
                }
            }
        }

        tree
    }

    /// Hop distances from `source` to every node (`None` = unreachable).
    fn distances_from(&self, source: NodeId) -> Vec<Option<usize>> {
        let n = self.num_nodes();
        let mut dist = vec![None; n];
        if source.index() >= n {
            return dist;
        }

        let mut queue = VecDeque::new();
        dist[source.index()] = Some(0);
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            let next = dist[node.index()].map_or(0, |d| d + 1);
            for &nb in self.neighbors(node) {
                if dist[nb.index()].is_none() {
                    dist[nb.index()] = Some(next);
                    queue.push_back(nb);
                }
            }
        }

        dist
    }

    /// Shortest-path hop distance between two nodes.
    fn shortest_path_length(&self, a: NodeId, b: NodeId) -> Option<usize> {
        self.distances_from(a).get(b.index()).copied().flatten()
    }
}

/// Depth of the breadth-first tree grown from `roots`: the largest hop
/// distance from the nearest root to any reachable node.
pub fn bfs_depth<G: Topology + ?Sized>(graph: &G, roots: &[NodeId]) -> usize {
    let mut depth = vec![0usize; graph.num_nodes()];
    let mut max = 0;
    for (parent, child) in graph.bfs_successors(roots) {
        depth[child.index()] = depth[parent.index()] + 1;
        max = max.max(depth[child.index()]);
    }
    max
}

pub use memory::{AdjacencyGraph, EdgeList, GraphError};
pub use centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
