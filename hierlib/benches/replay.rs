use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hierlib::config::{HierarchyConfig, InclusionPolicyConfig, LevelConfig, ReplacementPolicyConfig};
use hierlib::hierarchy::Hierarchy;
use hierlib::trace::{AccessKind, TraceEntry};

const TRACE_LEN: usize = 100_000;

/// A synthetic trace with some locality: mostly revisits of a small working
/// set, occasionally a jump elsewhere
fn synthetic_trace() -> Vec<TraceEntry> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut base: u32 = 0;
    (0..TRACE_LEN)
        .map(|_| {
            if rng.random_range(0..8) == 0 {
                base = rng.random_range(0..0x10_0000) & !0x3f;
            }
            TraceEntry {
                kind: if rng.random_range(0..4) == 0 {
                    AccessKind::Write
                } else {
                    AccessKind::Read
                },
                address: base + rng.random_range(0..0x400),
            }
        })
        .collect()
}

fn two_level_config(policy: ReplacementPolicyConfig) -> HierarchyConfig {
    HierarchyConfig {
        block_size: 32,
        levels: vec![
            LevelConfig { size: 1024, assoc: 2, name: Some("L1".into()) },
            LevelConfig { size: 8192, assoc: 4, name: Some("L2".into()) },
        ],
        replacement_policy: policy,
        inclusion: InclusionPolicyConfig::NonInclusive,
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Replay");
    let trace = synthetic_trace();
    let policies = [
        ("lru", ReplacementPolicyConfig::Lru),
        ("fifo", ReplacementPolicyConfig::Fifo),
        ("optimal", ReplacementPolicyConfig::Optimal),
    ];
    for (name, policy) in policies {
        let config = two_level_config(policy);
        group.bench_with_input(BenchmarkId::new("two_level", name), &trace, |bench, trace| {
            bench.iter(|| {
                let mut hierarchy = Hierarchy::new(&config, trace).unwrap();
                hierarchy.run(trace);
                hierarchy.report()
            });
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
