//! Interner benchmarks.
//!
//! Run with: `cargo bench --bench intern_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use opalc_util::Interner;

/// Benchmark interning hits and misses
fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern");
    group.throughput(Throughput::Elements(1));

    group.bench_function("intern_new_string", |b| {
        let mut interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            interner.intern(&format!("new_string_{}", counter))
        })
    });

    group.bench_function("intern_existing_string", |b| {
        let mut interner = Interner::new();
        let _ = interner.intern("existing_string");
        b.iter(|| black_box(interner.intern("existing_string")))
    });

    group.bench_function("intern_keyword_set", |b| {
        let mut interner = Interner::new();
        for kw in ["if", "while", "for", "return", "proc", "data", "entity", "array"] {
            let _ = interner.intern(kw);
        }
        b.iter(|| black_box(interner.intern("return")))
    });

    group.finish();
}

/// Benchmark retrieval and id comparison against string comparison
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(1));

    let mut interner = Interner::new();
    let a = interner.intern("some_identifier");
    let b2 = interner.intern("another_identifier");

    group.bench_function("id_eq_id", |b| {
        b.iter(|| {
            black_box(a == a);
            black_box(a == b2);
        })
    });

    group.bench_function("get", |b| b.iter(|| black_box(interner.get(a))));

    group.bench_function("str_eq_str_baseline", |b| {
        let s1 = "some_identifier";
        let s2 = "another_identifier";
        b.iter(|| {
            black_box(s1 == "some_identifier");
            black_box(s1 == s2);
        })
    });

    group.finish();
}

/// Benchmark with varying string sizes
fn bench_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("varying_sizes");

    for &size in &[1usize, 10, 100, 1000] {
        let string = "a".repeat(size);
        group.bench_with_input(BenchmarkId::new("intern", size), &string, |b, s| {
            let mut interner = Interner::new();
            b.iter(|| black_box(interner.intern(s)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_intern, bench_lookup, bench_varying_sizes);
criterion_main!(benches);
