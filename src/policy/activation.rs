//! Activation decisions.

use rand::RngCore;

use crate::types::NodeState;
use super::{bernoulli, ActivationPolicy};

/// Every node is always active.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl ActivationPolicy for AlwaysActive {
    fn name(&self) -> &'static str {
        "always_active"
    }

    fn decide(&self, _node: &NodeState, _rng: &mut dyn RngCore) -> bool {
        true
    }
}

/// Non-infected nodes are never active, so nothing beyond the seeds spreads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverActive;

impl ActivationPolicy for NeverActive {
    fn name(&self) -> &'static str {
        "never_active"
    }

    fn decide(&self, _node: &NodeState, _rng: &mut dyn RngCore) -> bool {
        false
    }
}

/// Fair coin per node per stage; ignores the assigned probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinFlip;

impl ActivationPolicy for CoinFlip {
    fn name(&self) -> &'static str {
        "coin_flip"
    }

    fn decide(&self, _node: &NodeState, rng: &mut dyn RngCore) -> bool {
        bernoulli(0.5, rng)
    }
}

/// Active when a uniform draw falls below the node's activation probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdActivation;

impl ActivationPolicy for ThresholdActivation {
    fn name(&self) -> &'static str {
        "threshold_activation"
    }

    fn decide(&self, node: &NodeState, rng: &mut dyn RngCore) -> bool {
        bernoulli(node.activation_probability(), rng)
    }
}
