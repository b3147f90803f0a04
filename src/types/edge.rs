//! Undirected edge type.

use serde::{Deserialize, Serialize};
use super::node::NodeId;

/// Undirected edge between two nodes.
///
/// Always stored in canonical form (`u < v`), so two edges connecting the
/// same pair compare equal regardless of the order they were given in.
/// Implements `Ord` for deterministic ordering: (u, v).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint.
    pub u: NodeId,
    /// Higher endpoint.
    pub v: NodeId,
}

impl Edge {
    /// Create a new edge in canonical form.
    ///
    /// Returns `None` for self loops.
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { u: a, v: b }),
            std::cmp::Ordering::Greater => Some(Self { u: b, v: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Get the endpoint opposite to `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.u {
            Some(self.v)
        } else if node == self.v {
            Some(self.u)
        } else {
            None
        }
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.u.cmp(&other.u).then_with(|| self.v.cmp(&other.v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn test_edge_is_canonical() {
        assert_eq!(Edge::new(n(3), n(1)), Edge::new(n(1), n(3)));
        assert_eq!(Edge::new(n(3), n(1)).unwrap().u, n(1));
    }

    #[test]
    fn test_self_loop_rejected() {
        assert!(Edge::new(n(2), n(2)).is_none());
    }

    #[test]
    fn test_edge_ordering() {
        let e1 = Edge::new(n(1), n(2)).unwrap();
        let e2 = Edge::new(n(1), n(3)).unwrap();
        let e3 = Edge::new(n(2), n(3)).unwrap();

        assert!(e1 < e2);
        assert!(e1 < e3);
        assert!(e2 < e3);
    }

    #[test]
    fn test_other_endpoint() {
        let e = Edge::new(n(4), n(9)).unwrap();
        assert_eq!(e.other(n(4)), Some(n(9)));
        assert_eq!(e.other(n(9)), Some(n(4)));
        assert_eq!(e.other(n(5)), None);
    }
}
