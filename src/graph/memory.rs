//! In-memory adjacency graph.

use serde::{Deserialize, Serialize};

use crate::types::{Edge, NodeId};
use super::Topology;

/// Error type for graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Edge endpoint outside `0..num_nodes`.
    #[error("Node {node} out of range for graph with {num_nodes} nodes")]
    NodeOutOfRange {
        /// Offending node.
        node: NodeId,
        /// Node count of the graph.
        num_nodes: usize,
    },
    /// Edge connecting a node to itself.
    #[error("Self loop on node {0}")]
    SelfLoop(NodeId),
}

/// Serializable edge-list description of a graph.
///
/// ```json
/// { "nodes": 4, "edges": [[0, 1], [1, 2], [2, 3]] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeList {
    /// Number of nodes; ids are `0..nodes`.
    pub nodes: usize,
    /// Undirected edges as id pairs.
    pub edges: Vec<(usize, usize)>,
}

/// Immutable-once-shared undirected graph backed by sorted adjacency lists.
///
/// Duplicate edges collapse. Neighbor lists stay sorted ascending for
/// deterministic traversal.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    adjacency: Vec<Vec<NodeId>>,
    edges: Vec<Edge>,
}

impl AdjacencyGraph {
    /// Create a graph with `num_nodes` isolated nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); num_nodes],
            edges: Vec::new(),
        }
    }

    /// Build a graph from `(u, v)` index pairs.
    pub fn from_pairs<I>(num_nodes: usize, pairs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(num_nodes);
        for (u, v) in pairs {
            graph.add_edge(NodeId::new(u), NodeId::new(v))?;
        }
        Ok(graph)
    }

    /// Build a graph from a deserialized edge list.
    pub fn from_edge_list(list: &EdgeList) -> Result<Self, GraphError> {
        Self::from_pairs(list.nodes, list.edges.iter().copied())
    }

    /// Add an undirected edge.
    ///
    /// Returns `Ok(false)` if the edge already existed.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool, GraphError> {
        let num_nodes = self.adjacency.len();
        for node in [a, b] {
            if node.index() >= num_nodes {
                return Err(GraphError::NodeOutOfRange { node, num_nodes });
            }
        }
        let edge = Edge::new(a, b).ok_or(GraphError::SelfLoop(a))?;

        let Err(pos) = self.edges.binary_search(&edge) else {
            return Ok(false);
        };
        self.edges.insert(pos, edge);
        insert_sorted(&mut self.adjacency[a.index()], b);
        insert_sorted(&mut self.adjacency[b.index()], a);
        Ok(true)
    }

    /// All edges in canonical order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Export as an edge list.
    pub fn to_edge_list(&self) -> EdgeList {
        EdgeList {
            nodes: self.adjacency.len(),
            edges: self.edges.iter().map(|e| (e.u.index(), e.v.index())).collect(),
        }
    }
}

fn insert_sorted(list: &mut Vec<NodeId>, node: NodeId) {
    if let Err(pos) = list.binary_search(&node) {
        list.insert(pos, node);
    }
}

impl Topology for AdjacencyGraph {
    fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }
}
