//! Core types for the contagion kernel.

pub mod node;
pub mod edge;
pub mod state;

pub use node::NodeId;
pub use edge::Edge;
pub use state::{NodeState, StateCounts, StateStore};
