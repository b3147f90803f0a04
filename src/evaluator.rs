//! Multi-trial performance evaluation.
//!
//! Runs many independent diffusion trials and reports how many stages the
//! process needs to reach a goal coverage, and how often it fails to.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, quantize};
use crate::engine::{DiffusionEngine, EngineConfig, EngineError};
use crate::graph::Topology;
use crate::policy::DiffusionModel;
use crate::seeding::{SeedError, SeedSelection, SeedSelectionPolicy};

/// Golden-ratio increment used to spread trial seeds.
const TRIAL_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Error type for evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// `attempts` was zero.
    #[error("Evaluation requires at least one attempt")]
    ZeroAttempts,
    /// `goal` outside `[0, 1]`.
    #[error("Goal fraction {0} outside [0, 1]")]
    GoalOutOfRange(f64),
    /// Seed selection failed.
    #[error("Seed selection error: {0}")]
    Seed(#[from] SeedError),
    /// Engine construction failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Evaluation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Target infected fraction.
    pub goal: f64,
    /// Number of trials.
    pub attempts: usize,
    /// Stage budget per trial.
    pub max_stages: usize,
    /// Consecutive non-increasing stages tolerated before a trial aborts.
    pub plateau_tolerance: usize,
    /// Base seed; trial `t` derives its own random source from it.
    pub rng_seed: u64,
    /// Re-run randomized seed selection for every trial instead of once.
    pub reselect_seeds: bool,
    /// Engine settings for every trial.
    pub engine: EngineConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            goal: 0.9,
            attempts: 100,
            max_stages: 100,
            plateau_tolerance: 5,
            rng_seed: 0,
            reselect_seeds: false,
            engine: EngineConfig::default(),
        }
    }
}

/// Quantized evaluation parameters for deterministic hashing.
#[derive(Serialize)]
struct QuantizedEvaluationConfig<'a> {
    goal: i64,
    attempts: usize,
    max_stages: usize,
    plateau_tolerance: usize,
    rng_seed: u64,
    reselect_seeds: bool,
    engine: &'a EngineConfig,
}

impl EvaluationConfig {
    /// Check the configuration before any trial runs.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if self.attempts == 0 {
            return Err(EvaluationError::ZeroAttempts);
        }
        if !(0.0..=1.0).contains(&self.goal) {
            return Err(EvaluationError::GoalOutOfRange(self.goal));
        }
        Ok(())
    }

    /// Hash of the parameters, stable across float formatting.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&QuantizedEvaluationConfig {
            goal: quantize(self.goal),
            attempts: self.attempts,
            max_stages: self.max_stages,
            plateau_tolerance: self.plateau_tolerance,
            rng_seed: self.rng_seed,
            reselect_seeds: self.reselect_seeds,
            engine: &self.engine,
        })
    }

    /// Random source for trial `trial`.
    pub fn trial_rng(&self, trial: usize) -> ChaCha8Rng {
        let seed = self
            .rng_seed
            .wrapping_add((trial as u64).wrapping_add(1).wrapping_mul(TRIAL_SEED_STRIDE));
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Random source for a seed selection shared by all trials.
    fn selection_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.rng_seed)
    }
}

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrialOutcome {
    /// Goal coverage reached at `stage`.
    Reached {
        /// Stage index at which the goal was met.
        stage: usize,
    },
    /// Aborted at `stage` after coverage stopped growing.
    Plateaued {
        /// Stage index at which the plateau tolerance was exceeded.
        stage: usize,
    },
    /// Stage budget used up.
    Exhausted,
}

impl TrialOutcome {
    /// Whether the goal was reached.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }
}

/// Result of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Trial index.
    pub trial: usize,
    /// How the trial ended.
    pub outcome: TrialOutcome,
    /// Infected fraction when the trial stopped.
    pub final_fraction: f64,
    /// Stages run.
    pub stages_run: usize,
    /// Number of seeds.
    pub seed_count: usize,
    /// Whether seed selection reached the requested count.
    pub seeds_satisfied: bool,
}

/// Aggregated results of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Seed policy label.
    pub seeding: String,
    /// Number of trials.
    pub attempts: usize,
    /// Trials that reached the goal.
    pub successes: usize,
    /// Trials that plateaued or ran out of stages.
    pub failures: usize,
    /// Mean goal stage over successful trials; `None` if none succeeded.
    pub average_stages_to_goal: Option<f64>,
    /// `failures / attempts`.
    pub failure_rate: f64,
    /// Per-trial results in trial order.
    pub trials: Vec<TrialRecord>,
    /// [`EvaluationConfig::params_hash`] of the configuration used.
    pub config_hash: String,
}

impl EvaluationReport {
    /// Aggregate trial records.
    pub fn from_trials(seeding: String, trials: Vec<TrialRecord>, config_hash: String) -> Self {
        let attempts = trials.len();
        let goal_stages: Vec<usize> = trials
            .iter()
            .filter_map(|t| match t.outcome {
                TrialOutcome::Reached { stage } => Some(stage),
                _ => None,
            })
            .collect();
        let successes = goal_stages.len();
        let failures = attempts - successes;

        let average_stages_to_goal = if goal_stages.is_empty() {
            None
        } else {
            Some(goal_stages.iter().sum::<usize>() as f64 / successes as f64)
        };
        let failure_rate = if attempts == 0 { 0.0 } else { failures as f64 / attempts as f64 };

        Self {
            seeding,
            attempts,
            successes,
            failures,
            average_stages_to_goal,
            failure_rate,
            trials,
            config_hash,
        }
    }

    /// Count trials that ended with a plateau abort.
    pub fn plateaued(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| matches!(t.outcome, TrialOutcome::Plateaued { .. }))
            .count()
    }
}

/// Drives independent diffusion trials over one topology.
pub struct PerformanceEvaluator<G: Topology> {
    graph: Arc<G>,
    model: DiffusionModel,
    config: EvaluationConfig,
}

impl<G: Topology> PerformanceEvaluator<G> {
    /// Create an evaluator. Fails fast on invalid configuration.
    pub fn new(graph: Arc<G>, model: DiffusionModel, config: EvaluationConfig) -> Result<Self, EvaluationError> {
        config.validate()?;
        Ok(Self { graph, model, config })
    }

    /// The configuration.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Run all trials with seeds from `seeding`.
    ///
    /// Deterministic seed policies are evaluated once and shared by every
    /// trial; randomized ones are re-drawn per trial when
    /// [`EvaluationConfig::reselect_seeds`] is set.
    pub fn evaluate(&self, seeding: &dyn SeedSelectionPolicy) -> Result<EvaluationReport, EvaluationError> {
        let reselect = self.config.reselect_seeds && seeding.is_randomized();
        let shared = if reselect {
            None
        } else {
            Some(seeding.select(self.graph.as_ref(), &mut self.config.selection_rng())?)
        };

        let mut trials = Vec::with_capacity(self.config.attempts);
        for trial in 0..self.config.attempts {
            let mut rng = self.config.trial_rng(trial);
            let selection = match &shared {
                Some(selection) => selection.clone(),
                None => seeding.select(self.graph.as_ref(), &mut rng)?,
            };
            trials.push(self.run_trial(trial, &selection, rng)?);
        }

        let report = EvaluationReport::from_trials(seeding.label(), trials, self.config.params_hash());

        tracing::info!(
            seeding = %report.seeding,
            attempts = report.attempts,
            successes = report.successes,
            plateaued = report.plateaued(),
            failure_rate = report.failure_rate,
            average_stages_to_goal = ?report.average_stages_to_goal,
            "Evaluation complete"
        );

        Ok(report)
    }

    /// Evaluate several seed policies under the same configuration.
    ///
    /// Reports are returned in input order.
    pub fn compare_strategies(
        &self,
        policies: &[&dyn SeedSelectionPolicy],
    ) -> Result<Vec<EvaluationReport>, EvaluationError> {
        policies.iter().map(|p| self.evaluate(*p)).collect()
    }

    /// Run a single trial on a fresh engine.
    pub fn run_trial(
        &self,
        trial: usize,
        selection: &SeedSelection,
        rng: ChaCha8Rng,
    ) -> Result<TrialRecord, EvaluationError> {
        let mut engine = DiffusionEngine::new(
            Arc::clone(&self.graph),
            self.model.clone(),
            &selection.nodes,
            self.config.engine,
            rng,
        )?;

        let mut previous = engine.infected_fraction();
        let mut plateau = 0usize;
        let mut outcome = TrialOutcome::Exhausted;

        for stage in 0..self.config.max_stages {
            let fraction = engine.diffuse_stage(stage).counts.infected_fraction();

            if fraction > previous {
                plateau = 0;
            } else {
                plateau += 1;
            }
            previous = fraction;

            if fraction >= self.config.goal {
                outcome = TrialOutcome::Reached { stage };
                break;
            }
            if plateau > self.config.plateau_tolerance {
                outcome = TrialOutcome::Plateaued { stage };
                break;
            }
        }

        tracing::debug!(
            trial = trial,
            outcome = ?outcome,
            fraction = previous,
            stages = engine.stages_run(),
            "Trial finished"
        );

        Ok(TrialRecord {
            trial,
            outcome,
            final_fraction: previous,
            stages_run: engine.stages_run(),
            seed_count: selection.len(),
            seeds_satisfied: selection.satisfied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;
    use crate::policy::{AlwaysInfect, Constant, NeverActive};
    use crate::seeding::{FixedSeeds, SeedStrategy, StrategySeeds};
    use crate::types::NodeId;

    fn path(len: usize) -> Arc<AdjacencyGraph> {
        Arc::new(AdjacencyGraph::from_pairs(len, (1..len).map(|i| (i - 1, i))).unwrap())
    }

    fn config(goal: f64, attempts: usize) -> EvaluationConfig {
        EvaluationConfig { goal, attempts, max_stages: 20, plateau_tolerance: 3, ..Default::default() }
    }

    #[test]
    fn test_config_validation() {
        let model = DiffusionModel::deterministic();
        let err = PerformanceEvaluator::new(path(3), model.clone(), config(0.5, 0)).err();
        assert_eq!(err, Some(EvaluationError::ZeroAttempts));

        let err = PerformanceEvaluator::new(path(3), model, config(1.5, 1)).err();
        assert_eq!(err, Some(EvaluationError::GoalOutOfRange(1.5)));
    }

    #[test]
    fn test_deterministic_path_reaches_goal() {
        let ev = PerformanceEvaluator::new(path(5), DiffusionModel::deterministic(), config(1.0, 4)).unwrap();
        let report = ev.evaluate(&FixedSeeds::single(NodeId::new(0))).unwrap();

        assert_eq!(report.successes, 4);
        assert_eq!(report.failure_rate, 0.0);
        // Stage indices are zero-based: the fourth stage is index 3
        assert_eq!(report.average_stages_to_goal, Some(3.0));
        assert!(report.trials.iter().all(|t| t.final_fraction == 1.0));
    }

    #[test]
    fn test_plateau_aborts_trial() {
        let model = DiffusionModel::new(Constant(1.0), Constant(1.0), NeverActive, AlwaysInfect);
        let ev = PerformanceEvaluator::new(path(5), model, config(0.9, 2)).unwrap();
        let report = ev.evaluate(&FixedSeeds::single(NodeId::new(0))).unwrap();

        assert_eq!(report.failures, 2);
        assert_eq!(report.failure_rate, 1.0);
        assert_eq!(report.average_stages_to_goal, None);
        assert_eq!(report.plateaued(), 2);
        assert_eq!(report.trials[0].outcome, TrialOutcome::Plateaued { stage: 3 });
        assert_eq!(report.trials[0].stages_run, 4);
    }

    #[test]
    fn test_zero_goal_succeeds_immediately() {
        let model = DiffusionModel::new(Constant(1.0), Constant(1.0), NeverActive, AlwaysInfect);
        let ev = PerformanceEvaluator::new(path(5), model, config(0.0, 3)).unwrap();
        let report = ev.evaluate(&FixedSeeds::single(NodeId::new(0))).unwrap();

        assert_eq!(report.successes, 3);
        assert!(report.trials.iter().all(|t| t.outcome == TrialOutcome::Reached { stage: 0 }));
    }

    #[test]
    fn test_exhausted_budget() {
        let mut cfg = config(1.0, 1);
        cfg.max_stages = 2;
        let ev = PerformanceEvaluator::new(path(10), DiffusionModel::deterministic(), cfg).unwrap();
        let report = ev.evaluate(&FixedSeeds::single(NodeId::new(0))).unwrap();
        assert_eq!(report.trials[0].outcome, TrialOutcome::Exhausted);
        assert_eq!(report.failures, 1);
    }

    #[test]
    fn test_seed_errors_fail_fast() {
        let ev = PerformanceEvaluator::new(path(3), DiffusionModel::deterministic(), config(0.5, 5)).unwrap();
        let err = ev.evaluate(&StrategySeeds::new(SeedStrategy::Degree, 4, 0)).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Seed(SeedError::CountExceedsNodes { requested: 4, available: 3 })
        );
    }

    #[test]
    fn test_params_hash_tracks_config() {
        let a = EvaluationConfig::default();
        let mut b = EvaluationConfig::default();
        assert_eq!(a.params_hash(), b.params_hash());
        b.plateau_tolerance += 1;
        assert_ne!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_trial_rngs_differ() {
        use rand::RngCore;
        let cfg = EvaluationConfig::default();
        assert_ne!(cfg.trial_rng(0).next_u64(), cfg.trial_rng(1).next_u64());
        assert_eq!(cfg.trial_rng(7).next_u64(), cfg.trial_rng(7).next_u64());
    }

    #[test]
    fn test_compare_strategies_in_order() {
        let g = Arc::new(
            AdjacencyGraph::from_pairs(12, (1..12).map(|i| (i - 1, i)).chain([(0, 6), (3, 9)])).unwrap(),
        );
        let mut cfg = config(0.8, 3);
        cfg.reselect_seeds = true;
        let ev = PerformanceEvaluator::new(g, DiffusionModel::threshold(0.8, 0.9), cfg).unwrap();

        let random = StrategySeeds::new(SeedStrategy::Random, 2, 0);
        let degree = StrategySeeds::new(SeedStrategy::Degree, 2, 2);
        let reports = ev.compare_strategies(&[&random, &degree]).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].seeding, "random(n=2, d=0)");
        assert_eq!(reports[1].seeding, "degree(n=2, d=2)");
        for r in &reports {
            assert_eq!(r.attempts, 3);
            assert_eq!(r.successes + r.failures, 3);
            assert_eq!(r.config_hash, ev.config().params_hash());
        }
    }
}
