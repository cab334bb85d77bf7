//! Equivalence partitioning benchmarks: structural vs case-insensitive matching.
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use valcon_bench::{SizeTier, generate_request};
use valcon_core::{
    CaseIgnoreMatcher, EquivalenceNotion, Partition, PartitionInputs, StrengthSelector,
};

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        let request = generate_request(&tier.config(42));
        let existing = request.existing.clone().unwrap_or_default();
        let elements = (request.triple.len() + existing.len()) as u64;
        group.throughput(Throughput::Elements(elements));

        let inputs = PartitionInputs {
            triple: &request.triple,
            existing: Some(&existing),
            apriori: None,
            selector: StrengthSelector::ALL,
        };

        group.bench_with_input(BenchmarkId::new("structural", name), &inputs, |b, inputs| {
            let notion = EquivalenceNotion::structural();
            b.iter(|| Partition::build(*inputs, &notion).expect("partitions").len());
        });

        group.bench_with_input(BenchmarkId::new("case_ignore", name), &inputs, |b, inputs| {
            let notion = EquivalenceNotion::new(Some(&CaseIgnoreMatcher), None);
            b.iter(|| Partition::build(*inputs, &notion).expect("partitions").len());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
