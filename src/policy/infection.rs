//! Infection decisions.

use rand::RngCore;

use crate::types::NodeState;
use super::{bernoulli, InfectionPolicy};

/// Every eligible contact infects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysInfect;

impl InfectionPolicy for AlwaysInfect {
    fn name(&self) -> &'static str {
        "always_infect"
    }

    fn decide(&self, _parent: &NodeState, _child: &NodeState, _rng: &mut dyn RngCore) -> bool {
        true
    }
}

/// No contact ever infects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInfect;

impl InfectionPolicy for NeverInfect {
    fn name(&self) -> &'static str {
        "never_infect"
    }

    fn decide(&self, _parent: &NodeState, _child: &NodeState, _rng: &mut dyn RngCore) -> bool {
        false
    }
}

/// Infects when a uniform draw falls below the child's infection probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdInfection;

impl InfectionPolicy for ThresholdInfection {
    fn name(&self) -> &'static str {
        "threshold_infection"
    }

    fn decide(&self, _parent: &NodeState, child: &NodeState, rng: &mut dyn RngCore) -> bool {
        bernoulli(child.infection_probability(), rng)
    }
}
