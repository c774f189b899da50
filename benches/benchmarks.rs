use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use serde_json::{json, Value};

use repersist::{ActionResult, MemoryStorage, State, StoreConfig, StoreDef};

fn counter_def() -> StoreDef {
    StoreDef::new()
        .entry("counter", 0)
        .action("increment", |_setter, _args| {
            Ok(ActionResult::update(|state| {
                let counter = state.get("counter").and_then(Value::as_i64).unwrap_or(0);
                let mut patch = State::new();
                patch.insert("counter".into(), json!(counter + 1));
                patch
            }))
        })
}

fn store_build_benchmark(c: &mut Criterion) {
    c.bench_function("store_build", |b| {
        b.iter(|| {
            let store = StoreConfig::new()
                .def(counter_def())
                .storage(MemoryStorage::new())
                .build()
                .unwrap();
            black_box(store)
        });
    });
}

fn dispatch_benchmark(c: &mut Criterion) {
    let store = StoreConfig::new()
        .def(counter_def())
        .storage(MemoryStorage::new())
        .build()
        .unwrap();

    c.bench_function("dispatch", |b| {
        b.iter(|| {
            store.dispatch(black_box("increment"), &[]).unwrap();
        });
    });
}

fn dispatch_without_persistence_benchmark(c: &mut Criterion) {
    let store = StoreConfig::new()
        .def(counter_def())
        .no_storage()
        .build()
        .unwrap();

    c.bench_function("dispatch_in_memory", |b| {
        b.iter(|| {
            store.dispatch(black_box("increment"), &[]).unwrap();
        });
    });
}

fn notify_benchmark(c: &mut Criterion) {
    let store = StoreConfig::new()
        .def(counter_def())
        .no_storage()
        .build()
        .unwrap();

    let _guards: Vec<_> = (0..8)
        .map(|_| {
            store.subscribe(|state| {
                black_box(state.len());
            })
        })
        .collect();

    c.bench_function("dispatch_with_subscribers", |b| {
        b.iter(|| {
            store.dispatch(black_box("increment"), &[]).unwrap();
        });
    });
}

criterion_group!(
    benches,
    store_build_benchmark,
    dispatch_benchmark,
    dispatch_without_persistence_benchmark,
    notify_benchmark
);
criterion_main!(benches);
