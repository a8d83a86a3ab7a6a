//! Benchmarks for integration catalog handling
//!
//! This benchmark measures:
//! - Payload parsing into a snapshot
//! - Flattening to model choices
//! - Config-name lookups against a cached snapshot

use ai_provider_hub::CatalogSnapshot;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

fn payload(integrations: usize, models: usize) -> Value {
    Value::Array(
        (0..integrations)
            .map(|i| {
                json!({
                    "uid": format!("uid-{i}"),
                    "name": format!("Integration {i}"),
                    "config": {"name": format!("config-{i}")},
                    "settings": {
                        "models": (0..models)
                            .map(|m| json!({"name": format!("model-{i}-{m}")}))
                            .collect::<Vec<_>>()
                    }
                })
            })
            .collect(),
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_parse");
    for size in [4usize, 32, 256] {
        let payload = payload(size, 8);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, p| {
            b.iter(|| CatalogSnapshot::from_payload(1, black_box(p)).unwrap())
        });
    }
    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_flatten");
    for size in [4usize, 32, 256] {
        let snapshot = CatalogSnapshot::from_payload(1, &payload(size, 8)).unwrap();
        group.throughput(Throughput::Elements((size * 8) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, s| {
            b.iter(|| black_box(s).model_choices())
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let snapshot = CatalogSnapshot::from_payload(1, &payload(256, 8)).unwrap();
    c.bench_function("catalog_uids_for", |b| {
        b.iter(|| snapshot.uids_for(black_box("config-200")))
    });
}

criterion_group!(benches, bench_parse, bench_flatten, bench_lookup);
criterion_main!(benches);
