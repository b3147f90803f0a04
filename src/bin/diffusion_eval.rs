//! Diffusion Evaluation Binary
//!
//! Runs the performance evaluator over a network read from an edge-list
//! file and prints one JSON report per seeding strategy.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `GRAPH_PATH`: Edge-list JSON file (or pass it as the first argument)
//! - `GOAL`: Target infected fraction (default: 0.9)
//! - `ATTEMPTS`: Trials per strategy (default: 100)
//! - `MAX_STAGES`: Stage budget per trial (default: 100)
//! - `PLATEAU_TOLERANCE`: Non-growing stages tolerated (default: 5)
//! - `RNG_SEED`: Base random seed (default: 0)
//! - `RESELECT_SEEDS`: Redraw random seeds every trial (default: false)
//! - `STRATEGY`: random, degree, betweenness, closeness or all (default: all)
//! - `SEED_COUNT`: Number of seed nodes (default: 1)
//! - `MIN_DISTANCE`: Minimum pairwise seed distance (default: 0)
//! - `ACTIVATION`: threshold or coin_flip (default: threshold)
//! - `ACTIVATION_PROBABILITY`: Per-node activation probability (default: 0.95)
//! - `INFECTION_PROBABILITY`: Per-node infection probability (default: 1.0)
//! - `PROPAGATION`: "multi" or "root:<id>" (default: multi)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! STRATEGY=degree SEED_COUNT=3 MIN_DISTANCE=2 cargo run --bin diffusion_eval -- graph.json
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use contagion_kernel::{
    AdjacencyGraph, CoinFlip, Constant, DiffusionModel, EdgeList, EngineConfig, EvaluationConfig,
    EvaluationReport, NodeId, PerformanceEvaluator, SeedSelectionPolicy, SeedStrategy,
    StrategySeeds, ThresholdActivation, ThresholdInfection, Topology, REPORT_SCHEMA_VERSION,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "diffusion_eval=info,contagion_kernel=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true)
            )
            .init();
    }
}

/// Read an environment variable, falling back to `default` when unset or
/// unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, "Unparsable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_propagation(raw: &str) -> Result<EngineConfig, String> {
    match raw.trim() {
        "multi" | "" => Ok(EngineConfig::multi_source()),
        other => other
            .strip_prefix("root:")
            .and_then(|id| id.parse::<usize>().ok())
            .map(|id| EngineConfig::fixed_root(NodeId::new(id)))
            .ok_or_else(|| format!("invalid PROPAGATION value: {}", other)),
    }
}

fn build_model() -> Result<DiffusionModel, String> {
    let ap = env_or("ACTIVATION_PROBABILITY", 0.95);
    let ip = env_or("INFECTION_PROBABILITY", 1.0);
    match std::env::var("ACTIVATION").unwrap_or_else(|_| "threshold".to_string()).as_str() {
        "threshold" => Ok(DiffusionModel::new(Constant(ap), Constant(ip), ThresholdActivation, ThresholdInfection)),
        "coin_flip" => Ok(DiffusionModel::new(Constant(ap), Constant(ip), CoinFlip, ThresholdInfection)),
        other => Err(format!("invalid ACTIVATION value: {}", other)),
    }
}

#[derive(Serialize)]
struct Output<'a> {
    schema_version: &'a str,
    nodes: usize,
    edges: usize,
    config: &'a EvaluationConfig,
    reports: &'a [EvaluationReport],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting diffusion evaluation");

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GRAPH_PATH").ok())
        .ok_or("graph path required: pass it as an argument or set GRAPH_PATH")?;

    let load_start = Instant::now();
    let list: EdgeList = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let graph = Arc::new(AdjacencyGraph::from_edge_list(&list)?);
    info!(
        path = %path,
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        latency_ms = load_start.elapsed().as_millis() as u64,
        "Graph loaded"
    );

    let engine = parse_propagation(&std::env::var("PROPAGATION").unwrap_or_default())?;
    let defaults = EvaluationConfig::default();
    let config = EvaluationConfig {
        goal: env_or("GOAL", defaults.goal),
        attempts: env_or("ATTEMPTS", defaults.attempts),
        max_stages: env_or("MAX_STAGES", defaults.max_stages),
        plateau_tolerance: env_or("PLATEAU_TOLERANCE", defaults.plateau_tolerance),
        rng_seed: env_or("RNG_SEED", defaults.rng_seed),
        reselect_seeds: env_or("RESELECT_SEEDS", defaults.reselect_seeds),
        engine,
    };
    let model = build_model()?;
    info!(config_hash = %config.params_hash(), model = ?model, "Configuration loaded");

    let count = env_or("SEED_COUNT", 1usize);
    let min_distance = env_or("MIN_DISTANCE", 0usize);
    let strategies: Vec<SeedStrategy> = match std::env::var("STRATEGY").as_deref() {
        Err(_) | Ok("all") => SeedStrategy::ALL.to_vec(),
        Ok(name) => vec![name.parse()?],
    };
    let policies: Vec<StrategySeeds> = strategies
        .into_iter()
        .map(|s| StrategySeeds::new(s, count, min_distance))
        .collect();
    let policy_refs: Vec<&dyn SeedSelectionPolicy> =
        policies.iter().map(|p| p as &dyn SeedSelectionPolicy).collect();

    let run_start = Instant::now();
    let evaluator = PerformanceEvaluator::new(Arc::clone(&graph), model, config.clone())?;
    let reports = evaluator.compare_strategies(&policy_refs)?;
    info!(
        strategies = reports.len(),
        latency_ms = run_start.elapsed().as_millis() as u64,
        "Evaluation finished"
    );

    let output = Output {
        schema_version: REPORT_SCHEMA_VERSION,
        nodes: graph.num_nodes(),
        edges: graph.num_edges(),
        config: &config,
        reports: &reports,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
