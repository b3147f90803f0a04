//! Per-node simulation state.
//!
//! Topology lives in [`crate::graph`]; everything that changes during a
//! diffusion run lives here, in an arena indexed by [`NodeId`] and owned by
//! exactly one [`crate::DiffusionEngine`].
//!
//! ## Invariants
//!
//! - `infected ⇒ active` at every observable point
//! - `infected` never reverts to `false`
//! - `pending_infected` is only set between propagation and commit of a
//!   single stage; it is `false` whenever the store is observable from
//!   outside the engine
//!
//! Mutators are crate-private so these hold by construction.

use serde::{Deserialize, Serialize};
use super::node::NodeId;

/// Simulation attributes of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    id: NodeId,
    activation_probability: f64,
    infection_probability: f64,
    active: bool,
    infected: bool,
    #[serde(skip)]
    pending_infected: bool,
}

impl NodeState {
    /// Create a fresh, active, uninfected node state.
    pub(crate) fn new(id: NodeId, activation_probability: f64, infection_probability: f64) -> Self {
        Self {
            id,
            activation_probability,
            infection_probability,
            active: true,
            infected: false,
            pending_infected: false,
        }
    }

    /// Node this state belongs to.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Probability assigned at construction that drives activation decisions.
    pub fn activation_probability(&self) -> f64 {
        self.activation_probability
    }

    /// Probability assigned at construction that drives infection decisions.
    pub fn infection_probability(&self) -> f64 {
        self.infection_probability
    }

    /// Whether the node is currently able to receive infection.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the node is infected.
    pub fn is_infected(&self) -> bool {
        self.infected
    }

    /// Whether an infection was decided this stage but not yet committed.
    pub fn is_pending(&self) -> bool {
        self.pending_infected
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        if !self.infected {
            self.active = active;
        }
    }

    pub(crate) fn infect(&mut self) {
        self.infected = true;
        self.active = true;
    }

    pub(crate) fn mark_pending(&mut self) {
        self.pending_infected = true;
    }

    /// Commit a pending infection and clear the buffer.
    ///
    /// Returns `true` if this call newly infected the node.
    pub(crate) fn commit(&mut self) -> bool {
        let newly = !self.infected && self.pending_infected;
        if newly {
            self.infect();
        }
        self.pending_infected = false;
        newly
    }
}

/// Aggregate counts over a [`StateStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Number of infected nodes.
    pub infected: usize,
    /// Number of active nodes (infected nodes included).
    pub active: usize,
    /// Total number of nodes.
    pub total: usize,
}

impl StateCounts {
    /// Fraction of nodes infected. An empty store reports `0.0`.
    pub fn infected_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.infected as f64 / self.total as f64
        }
    }
}

/// Arena of [`NodeState`] indexed by node id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateStore {
    nodes: Vec<NodeState>,
}

impl StateStore {
    pub(crate) fn from_states(nodes: Vec<NodeState>) -> Self {
        Self { nodes }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the state of a node.
    pub fn get(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeState> {
        self.nodes.get_mut(id.index())
    }

    /// Iterate over all node states in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeState> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut NodeState> {
        self.nodes.iter_mut()
    }

    /// Count infected and active nodes.
    pub fn counts(&self) -> StateCounts {
        self.nodes.iter().fold(
            StateCounts { total: self.nodes.len(), ..StateCounts::default() },
            |mut acc, n| {
                acc.infected += n.infected as usize;
                acc.active += n.active as usize;
                acc
            },
        )
    }

    /// Fraction of nodes infected.
    pub fn infected_fraction(&self) -> f64 {
        self.counts().infected_fraction()
    }

    /// Ids of all infected nodes, ascending.
    pub fn infected_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|n| n.infected).map(|n| n.id).collect()
    }
}

/// Clamp a caller-supplied probability into `[0, 1]`.
///
/// Returns the clamped value and whether the input was out of range.
/// NaN maps to `0.0`.
pub(crate) fn clamp_probability(value: f64) -> (f64, bool) {
    if value.is_nan() {
        (0.0, true)
    } else if (0.0..=1.0).contains(&value) {
        (value, false)
    } else {
        (value.clamp(0.0, 1.0), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(n: usize) -> StateStore {
        StateStore::from_states((0..n).map(|i| NodeState::new(NodeId::new(i), 0.5, 0.5)).collect())
    }

    #[test]
    fn test_fresh_state_is_active_and_clean() {
        let s = NodeState::new(NodeId::new(0), 0.2, 0.8);
        assert!(s.is_active());
        assert!(!s.is_infected());
        assert!(!s.is_pending());
    }

    #[test]
    fn test_infected_node_ignores_deactivation() {
        let mut s = NodeState::new(NodeId::new(0), 0.2, 0.8);
        s.infect();
        s.set_active(false);
        assert!(s.is_active());
    }

    #[test]
    fn test_commit_clears_pending() {
        let mut s = NodeState::new(NodeId::new(0), 0.2, 0.8);
        s.mark_pending();
        assert!(s.commit());
        assert!(s.is_infected());
        assert!(!s.is_pending());

        // Second commit with pending on an infected node is a no-op
        s.mark_pending();
        assert!(!s.commit());
        assert!(!s.is_pending());
        assert!(s.is_infected());
    }

    #[test]
    fn test_counts() {
        let mut st = store(4);
        st.get_mut(NodeId::new(1)).unwrap().infect();
        st.get_mut(NodeId::new(2)).unwrap().set_active(false);

        let counts = st.counts();
        assert_eq!(counts.total, 4);
        assert_eq!(counts.infected, 1);
        assert_eq!(counts.active, 3);
        assert!((st.infected_fraction() - 0.25).abs() < 1e-12);
        assert_eq!(st.infected_nodes(), vec![NodeId::new(1)]);
    }

    #[test]
    fn test_empty_fraction_is_zero() {
        assert_eq!(StateStore::default().infected_fraction(), 0.0);
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(0.3), (0.3, false));
        assert_eq!(clamp_probability(1.7), (1.0, true));
        assert_eq!(clamp_probability(-0.1), (0.0, true));
        assert_eq!(clamp_probability(f64::NAN), (0.0, true));
    }
}
