//! Performance benchmarks for diffusion and seed selection.
//!
//! Run with: `cargo bench --bench diffusion`
//!
//! ## Workloads
//!
//! | Benchmark | What it measures |
//! |-----------|------------------|
//! | `diffuse_stage` | One full stage (activation, propagation, commit) |
//! | `seed_selection` | Ranking plus diversity-constrained greedy pick |
//! | `evaluate` | Complete multi-trial evaluation |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use contagion_kernel::{
    select_seeds, AdjacencyGraph, DiffusionEngine, DiffusionModel, EngineConfig,
    EvaluationConfig, NodeId, PerformanceEvaluator, SeedStrategy, StrategySeeds, Topology,
};

/// Random geometric graph in the unit square.
fn geometric_graph(n: usize, radius: f64, seed: u64) -> AdjacencyGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();
    let r2 = radius * radius;

    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
            if dx * dx + dy * dy <= r2 {
                pairs.push((i, j));
            }
        }
    }
    AdjacencyGraph::from_pairs(n, pairs).expect("valid geometric graph")
}

/// Benchmark a single stage on graphs of increasing size.
fn bench_diffuse_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("diffuse_stage");

    for size in [300, 1_000, 3_000] {
        let graph = Arc::new(geometric_graph(size, 0.125 * (300.0 / size as f64).sqrt(), 7));
        group.throughput(Throughput::Elements(graph.num_nodes() as u64));
        group.bench_with_input(BenchmarkId::new("nodes", size), &graph, |b, graph| {
            let mut engine = DiffusionEngine::new(
                Arc::clone(graph),
                DiffusionModel::threshold(0.95, 0.5),
                &[NodeId::new(0)],
                EngineConfig::default(),
                ChaCha8Rng::seed_from_u64(1),
            )
            .expect("engine");
            let mut stage = 0;
            b.iter(|| {
                stage += 1;
                black_box(engine.diffuse_stage(stage))
            })
        });
    }

    group.finish();
}

/// Benchmark seed selection per strategy.
fn bench_seed_selection(c: &mut Criterion) {
    let graph = geometric_graph(300, 0.125, 11);
    let mut group = c.benchmark_group("seed_selection");

    for strategy in [SeedStrategy::Degree, SeedStrategy::Betweenness, SeedStrategy::Closeness] {
        group.bench_with_input(BenchmarkId::new("strategy", strategy), &strategy, |b, &strategy| {
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            b.iter(|| black_box(select_seeds(&graph, strategy, 5, 3, &mut rng).expect("selection")))
        });
    }

    group.finish();
}

/// Benchmark a full evaluation.
fn bench_evaluate(c: &mut Criterion) {
    let graph = Arc::new(geometric_graph(300, 0.125, 13));
    let config = EvaluationConfig { goal: 0.9, attempts: 20, max_stages: 60, ..Default::default() };
    let evaluator = PerformanceEvaluator::new(graph, DiffusionModel::threshold(0.95, 1.0), config).expect("evaluator");
    let seeding = StrategySeeds::new(SeedStrategy::Degree, 3, 2);

    c.bench_function("evaluate/degree_20_trials", |b| {
        b.iter(|| black_box(evaluator.evaluate(&seeding).expect("evaluation")))
    });
}

criterion_group!(benches, bench_diffuse_stage, bench_seed_selection, bench_evaluate);
criterion_main!(benches);
