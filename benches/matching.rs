//! Benchmarks for the stable matching engine.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- headless_round
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{
    black_box, criterion_group, criterion_main,
    BatchSize, BenchmarkId, Criterion, Throughput,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

use stable_match_lab::engine::{verify, Engine};
use stable_match_lab::lab::{LabConfig, LabRunner};
use stable_match_lab::preferences::{generate, PreferenceTable};

// ============================================================================
// HELPER FUNCTIONS - Deterministic preference generation
// ============================================================================

/// Seeded preference table for benchmarking
fn make_table(n: usize, seed: u64) -> PreferenceTable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate(n, 0.5, 0.5, &mut rng).expect("valid population")
}

// ============================================================================
// BENCHMARK: Preference Generation
// ============================================================================

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.measurement_time(Duration::from_secs(5));

    for n in [20usize, 100, 200] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("population", n), &n, |b, &n| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| black_box(generate(n, 0.5, 0.5, &mut rng)))
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Headless Round
// ============================================================================

fn bench_headless_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("headless_round");
    group.measurement_time(Duration::from_secs(10));

    for n in [20usize, 100, 200] {
        let table = make_table(n, 7);
        for (label, bias) in [("side_a", 1.0), ("mixed", 0.5)] {
            group.bench_with_input(BenchmarkId::new(label, n), &table, |b, table| {
                let mut rng = ChaCha8Rng::seed_from_u64(1);
                b.iter_batched(
                    || Engine::new(table.clone(), bias),
                    |mut engine| black_box(engine.run_to_completion(&mut rng)),
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Stability Verification
// ============================================================================

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    group.measurement_time(Duration::from_secs(5));

    for n in [20usize, 100, 200] {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut engine = Engine::new(make_table(n, 3), 0.5);
        engine
            .run_to_completion(&mut rng)
            .expect("round terminates");

        group.bench_with_input(BenchmarkId::new("population", n), &engine, |b, engine| {
            b.iter(|| black_box(verify(engine.state(), engine.preferences())))
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Lab Sweep
// ============================================================================

fn bench_lab(c: &mut Criterion) {
    let mut group = c.benchmark_group("lab");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(20);

    group.bench_function("grid_11x11_n20", |b| {
        b.iter_batched(
            || {
                let config = LabConfig::new(20, 0.5, 11);
                LabRunner::new(config, ChaCha8Rng::seed_from_u64(12345)).expect("valid config")
            },
            |mut runner| black_box(runner.run(|_| {}).map(|cells| cells.len())),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_generate,
    bench_headless_round,
    bench_verify,
    bench_lab
);

criterion_main!(benches);
