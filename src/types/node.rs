//! Node identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in a network.
///
/// Node ids form a dense range `0..N` so they double as indices into
/// per-run state arenas. Implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a new NodeId from a dense index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the dense index of this node.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
