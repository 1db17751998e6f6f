//! Partition throughput benchmarks: plain writes, cached reads, and
//! versioned appends against a temp-directory registry.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use tempfile::TempDir;
use varve::Database;

fn bench_plain_set(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path());
    let partition = db.get_partition("bench", &[], None).unwrap();

    let mut i = 0u64;
    c.bench_function("plain_set", |b| {
        b.iter(|| {
            i += 1;
            let key = format!("key-{}", i % 1000);
            black_box(partition.set(&key, json!({"seq": i, "payload": "x".repeat(64)})));
        })
    });
}

fn bench_plain_get_cached(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path());
    let partition = db.get_partition("bench", &[], None).unwrap();
    partition.set("hot", json!({"payload": "x".repeat(64)}));
    partition.get("hot");

    c.bench_function("plain_get_cached", |b| {
        b.iter(|| black_box(partition.get("hot")))
    });
}

fn bench_plain_get_uncached(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path());
    let partition = db.get_partition("bench", &[], Some(0)).unwrap();
    partition.set("cold", json!({"payload": "x".repeat(64)}));

    c.bench_function("plain_get_uncached", |b| {
        b.iter(|| black_box(partition.get("cold")))
    });
}

fn bench_versioned_set(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path());
    let partition = db.get_versioned_partition("bench", &[], None).unwrap();

    let mut i = 0u64;
    c.bench_function("versioned_set", |b| {
        b.iter(|| {
            i += 1;
            black_box(partition.set("timeline", json!({"seq": i})));
        })
    });
}

criterion_group!(
    benches,
    bench_plain_set,
    bench_plain_get_cached,
    bench_plain_get_uncached,
    bench_versioned_set
);
criterion_main!(benches);
