//! Per-node probability assignments.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::types::NodeId;
use super::ProbabilityAssignment;

/// Same probability for every node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constant(pub f64);

impl ProbabilityAssignment for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn assign(&self, _node: NodeId, _rng: &mut dyn RngCore) -> f64 {
        self.0
    }
}

/// Independent uniform draw in `[low, high)` per node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl UniformRange {
    /// Create a range; bounds are clamped into `[0, 1]` and swapped if reversed.
    pub fn new(low: f64, high: f64) -> Self {
        let (a, b) = (low.clamp(0.0, 1.0), high.clamp(0.0, 1.0));
        Self { low: a.min(b), high: a.max(b) }
    }
}

impl ProbabilityAssignment for UniformRange {
    fn name(&self) -> &'static str {
        "uniform_range"
    }

    fn assign(&self, _node: NodeId, rng: &mut dyn RngCore) -> f64 {
        if self.high <= self.low {
            return self.low;
        }
        rng.gen_range(self.low..self.high)
    }
}
