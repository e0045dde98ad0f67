//! Benchmarks for docstore operations
//!
//! Every mutation flushes the full image, so insert cost with a writer
//! grows with table size.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use docstore::{DocumentStore, MemorySink, StoreConfig};
use serde_json::json;

fn seeded_store(rows: usize, sink: Option<MemorySink>) -> DocumentStore {
    let mut builder = StoreConfig::builder().name("bench");
    if let Some(sink) = sink {
        builder = builder.writer(sink);
    }
    let store = DocumentStore::open(builder.build().unwrap()).unwrap();
    for i in 0..rows {
        store
            .insert(&json!({ "id": format!("seed-{}", i), "n": i, "tags": ["a", "b"] }))
            .unwrap();
    }
    store
}

fn storage_benchmarks(c: &mut Criterion) {
    c.bench_function("insert_no_writer", |b| {
        let store = seeded_store(0, None);
        b.iter(|| store.insert(&json!({ "name": "ada", "n": 1 })).unwrap())
    });

    for rows in [100, 1_000] {
        c.bench_function(&format!("insert_with_writer_{}_rows", rows), |b| {
            b.iter_batched(
                || seeded_store(rows, Some(MemorySink::new())),
                |store| store.insert(&json!({ "name": "ada" })).unwrap(),
                BatchSize::LargeInput,
            )
        });
    }

    c.bench_function("get_by_id_1000_rows", |b| {
        let store = seeded_store(1_000, None);
        b.iter(|| store.get_by_id("seed-500").unwrap())
    });

    c.bench_function("get_all_1000_rows", |b| {
        let store = seeded_store(1_000, None);
        b.iter(|| store.all().unwrap())
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
