//! Cluster Simulation Benchmarks
//!
//! - Full-year hourly run, with and without degradation
//! - Characteristic curve fit (engine construction)
//! - Rainflow counting of one fatigue window

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pem_cluster_sim::domain::ClusterConfig;
use pem_cluster_sim::simulation::{rainflow, ClusterSimulationEngine};

/// One year of hourly power with daily and seasonal swings (kW)
fn annual_profile(rating_kw: f64) -> Vec<f64> {
    (0..8760)
        .map(|h| {
            let t = h as f64;
            let daily = (t * std::f64::consts::TAU / 24.0).sin();
            let seasonal = (t * std::f64::consts::TAU / 8760.0).cos();
            rating_kw * (0.5 + 0.35 * daily + 0.25 * seasonal)
        })
        .collect()
}

fn bench_annual_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("annual_run");
    group.sample_size(20);

    for (label, config) in [
        ("degradation", ClusterConfig::with_stacks(10)),
        ("no_degradation", ClusterConfig::with_stacks(10).without_degradation()),
    ] {
        let engine = ClusterSimulationEngine::new(config).expect("valid cluster");
        let power = annual_profile(engine.config().cluster_rating_kw());
        group.bench_with_input(BenchmarkId::from_parameter(label), &power, |b, power| {
            b.iter(|| engine.run(black_box(power)).expect("run"))
        });
    }
    group.finish();
}

fn bench_engine_construction(c: &mut Criterion) {
    c.bench_function("curve_fit", |b| {
        b.iter(|| ClusterSimulationEngine::new(black_box(ClusterConfig::default())).expect("fit"))
    });
}

fn bench_rainflow_window(c: &mut Criterion) {
    let window: Vec<f64> = (0..168)
        .map(|t| 1.8 + 0.2 * (t as f64 * 0.7).sin() + 0.05 * (t as f64 * 2.3).cos())
        .collect();
    c.bench_function("rainflow_week", |b| {
        b.iter(|| rainflow::weighted_range_sum(black_box(&window), 10))
    });
}

criterion_group!(
    benches,
    bench_annual_run,
    bench_engine_construction,
    bench_rainflow_window
);
criterion_main!(benches);
