//! Diffusion behavior policies.
//!
//! The engine itself is deterministic; every stochastic choice is delegated
//! to one of the traits below, which receive the run's random source
//! explicitly.
//!
//! ## Capabilities
//!
//! | Trait | Called | Contract |
//! |-------|--------|----------|
//! | [`ProbabilityAssignment`] | once per node at construction | returns a value in `[0, 1]` |
//! | [`ActivationPolicy`] | once per non-infected node per stage | decides `active` |
//! | [`InfectionPolicy`] | once per eligible BFS tree edge per stage | decides infection |
//!
//! Seed selection is the fourth capability and lives in [`crate::seeding`].

pub mod assignment;
pub mod activation;
pub mod infection;

use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::types::{NodeId, NodeState};

pub use assignment::{Constant, UniformRange};
pub use activation::{AlwaysActive, CoinFlip, NeverActive, ThresholdActivation};
pub use infection::{AlwaysInfect, NeverInfect, ThresholdInfection};

/// Assigns a per-node probability once, at engine construction.
///
/// Values outside `[0, 1]` are clamped by the engine.
pub trait ProbabilityAssignment: Send + Sync {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Probability for `node`.
    fn assign(&self, node: NodeId, rng: &mut dyn RngCore) -> f64;
}

/// Decides whether a non-infected node is active for the current stage.
pub trait ActivationPolicy: Send + Sync {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Activation decision for `node`.
    fn decide(&self, node: &NodeState, rng: &mut dyn RngCore) -> bool;
}

/// Decides whether an infected `parent` infects an active `child`.
pub trait InfectionPolicy: Send + Sync {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Infection decision for the edge `(parent, child)`.
    fn decide(&self, parent: &NodeState, child: &NodeState, rng: &mut dyn RngCore) -> bool;
}

/// The full set of behavior policies for one diffusion process.
///
/// Cheap to clone; the evaluator hands a clone to every trial.
#[derive(Clone)]
pub struct DiffusionModel {
    /// Activation probability assignment.
    pub activation_probability: Arc<dyn ProbabilityAssignment>,
    /// Infection probability assignment.
    pub infection_probability: Arc<dyn ProbabilityAssignment>,
    /// Activation decision.
    pub activation: Arc<dyn ActivationPolicy>,
    /// Infection decision.
    pub infection: Arc<dyn InfectionPolicy>,
}

impl DiffusionModel {
    /// Create a model from its four policies.
    pub fn new(
        activation_probability: impl ProbabilityAssignment + 'static,
        infection_probability: impl ProbabilityAssignment + 'static,
        activation: impl ActivationPolicy + 'static,
        infection: impl InfectionPolicy + 'static,
    ) -> Self {
        Self {
            activation_probability: Arc::new(activation_probability),
            infection_probability: Arc::new(infection_probability),
            activation: Arc::new(activation),
            infection: Arc::new(infection),
        }
    }

    /// Every node always active, every contact always infects.
    ///
    /// Infection then advances exactly one BFS layer per stage.
    pub fn deterministic() -> Self {
        Self::new(Constant(1.0), Constant(1.0), AlwaysActive, AlwaysInfect)
    }

    /// Constant per-node probabilities interpreted as thresholds on a
    /// uniform draw.
    pub fn threshold(activation_probability: f64, infection_probability: f64) -> Self {
        Self::new(
            Constant(activation_probability),
            Constant(infection_probability),
            ThresholdActivation,
            ThresholdInfection,
        )
    }
}

impl fmt::Debug for DiffusionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffusionModel")
            .field("activation_probability", &self.activation_probability.name())
            .field("infection_probability", &self.infection_probability.name())
            .field("activation", &self.activation.name())
            .field("infection", &self.infection.name())
            .finish()
    }
}

/// Draw a uniform sample in `[0, 1)` and compare against `probability`.
pub(crate) fn bernoulli(probability: f64, rng: &mut dyn RngCore) -> bool {
    use rand::Rng;
    rng.gen::<f64>() < probability
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_debug_names_policies() {
        let model = DiffusionModel::threshold(0.5, 0.5);
        let dbg = format!("{:?}", model);
        assert!(dbg.contains("threshold_activation"));
        assert!(dbg.contains("threshold_infection"));
        assert!(dbg.contains("constant"));
    }
}
