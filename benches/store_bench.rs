//! Benchmarks for the reading store and daily aggregation
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glucose_log::stats::{aggregate_by_day, summarize};
use glucose_log::storage::*;
use std::cell::Cell;
use tempfile::tempdir;

/// Store holding `count` readings spaced two hours apart
fn create_test_store<S: KeyValueStore>(backend: S, count: usize) -> ReadingStore<S> {
    let origin = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let tick = Cell::new(0i64);
    let mut store = ReadingStore::open(backend).with_clock(move || {
        let n = tick.get();
        tick.set(n + 1);
        origin + Duration::hours(2 * n)
    });

    let contexts = MealContext::all();
    for i in 0..count {
        store
            .add(70.0 + (i % 120) as f64, contexts[i % contexts.len()], None)
            .unwrap();
    }
    store
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for size in [100, 1000, 10000] {
        let store = create_test_store(MemoryStore::new(), size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("aggregate_by_day_{}", size), |b| {
            b.iter(|| aggregate_by_day(black_box(store.list())))
        });

        group.bench_function(format!("summarize_{}", size), |b| {
            b.iter(|| summarize(black_box(store.list())))
        });
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    group.bench_function("add_memory_1000", |b| {
        let mut store = create_test_store(MemoryStore::new(), 1000);
        b.iter(|| {
            store
                .add(black_box(110.0), MealContext::Fasting, None)
                .unwrap()
                .len()
        });
    });

    group.bench_function("add_file_1000", |b| {
        let dir = tempdir().unwrap();
        let mut store = create_test_store(FileStore::open(dir.path()).unwrap(), 1000);
        b.iter(|| {
            store
                .add(black_box(110.0), MealContext::Fasting, None)
                .unwrap()
                .len()
        });
    });

    group.bench_function("load_file_1000", |b| {
        let dir = tempdir().unwrap();
        let store = create_test_store(FileStore::open(dir.path()).unwrap(), 1000);
        b.iter(|| store.load().len());
    });

    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_store);
criterion_main!(benches);
