//! Registry operation benchmarks
//!
//! Measures the per-operation cost of the five registry transactions on
//! an in-memory registry and on a directory-backed one with each
//! durability mode.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench registry_ops
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use population::{DurabilityMode, Person, Population, PopulationConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn person(id: &str, status: &str) -> Person {
    Person::from_fields(&["1 Main St", "Springfield", id, "Ann", status, "Lee", "555-0100"])
        .unwrap()
}

fn populated(count: usize) -> Population {
    let db = Population::cache().unwrap();
    for i in 0..count {
        db.add_person(person(&format!("id_{:05}", i), "active")).unwrap();
    }
    db
}

// =============================================================================
// Reads
// =============================================================================

fn read_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_read");
    group.throughput(Throughput::Elements(1));

    let db = populated(10_000);

    group.bench_function("get_person", |b| {
        b.iter(|| black_box(db.get_person("id_05000").unwrap()));
    });

    group.bench_function("person_exists_missing", |b| {
        b.iter(|| black_box(db.person_exists("absent").unwrap()));
    });

    for depth in [1usize, 10, 100] {
        let id = format!("deep_{}", depth);
        db.add_person(person(&id, "s0")).unwrap();
        for i in 1..depth {
            db.change_person_data(person(&id, &format!("s{}", i))).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("get_person_history", depth), &id, |b, id| {
            b.iter(|| black_box(db.get_person_history(id).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Writes
// =============================================================================

fn write_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_write");
    group.throughput(Throughput::Elements(1));

    let db = Population::cache().unwrap();
    let counter = AtomicU64::new(0);
    group.bench_function("add_person/cache", |b| {
        b.iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            db.add_person(person(&format!("new_{}", i), "active")).unwrap();
        });
    });

    db.add_person(person("hot", "s")).unwrap();
    group.bench_function("change_person_data/cache", |b| {
        b.iter(|| db.change_person_data(person("hot", "s")).unwrap());
    });

    for mode in [DurabilityMode::None, DurabilityMode::Buffered, DurabilityMode::Strict] {
        let temp_dir = TempDir::new().unwrap();
        let db = Population::open_with_config(
            temp_dir.path(),
            PopulationConfig {
                durability: mode,
                ..Default::default()
            },
        )
        .unwrap();
        db.add_person(person("hot", "s")).unwrap();

        group.bench_with_input(
            BenchmarkId::new("change_person_data", format!("{:?}", mode)),
            &db,
            |b, db| b.iter(|| db.change_person_data(person("hot", "s")).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, read_benchmarks, write_benchmarks);
criterion_main!(benches);
