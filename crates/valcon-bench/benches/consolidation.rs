//! End-to-end consolidation benchmarks across size tiers.
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use valcon_bench::{SizeTier, generate_request};
use valcon_core::{MetadataMode, Mode, OperationResult};

fn bench_consolidation(c: &mut Criterion) {
    let mut group = c.benchmark_group("consolidation");

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        let request = generate_request(&tier.config(42));
        group.throughput(Throughput::Elements(request.triple.len() as u64));

        group.bench_with_input(BenchmarkId::new("triples", name), &request, |b, request| {
            b.iter(|| {
                let mut root = OperationResult::new("bench");
                request.execute(&mut root).expect("consolidates")
            });
        });

        let mut no_metadata = request.clone();
        no_metadata.metadata = MetadataMode::None;
        group.bench_with_input(
            BenchmarkId::new("no_metadata", name),
            &no_metadata,
            |b, request| {
                b.iter(|| {
                    let mut root = OperationResult::new("bench");
                    request.execute(&mut root).expect("consolidates")
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("traced", name), &request, |b, request| {
            b.iter(|| {
                let mut root = OperationResult::new("bench").traced();
                request.execute(&mut root).expect("consolidates")
            });
        });

        let mut apriori = request.clone();
        let mut seed_root = OperationResult::new("seed");
        apriori.apriori_delta = Some(request.execute(&mut seed_root).expect("consolidates"));
        apriori.mode = Mode::Apriori;
        group.bench_with_input(BenchmarkId::new("apriori", name), &apriori, |b, request| {
            b.iter(|| {
                let mut root = OperationResult::new("bench");
                request.execute(&mut root).expect("consolidates")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_consolidation);
criterion_main!(benches);
