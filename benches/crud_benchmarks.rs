use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;

use osrb_tree::OSRBTreeMap;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for a deterministic pseudo-random sequence.
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Insertion ──────────────────────────────────────────────────────────────

fn bench_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("OSRBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = OSRBTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, Some(i));
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, Some(i));
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_reverse");

    group.bench_function(BenchmarkId::new("OSRBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = OSRBTreeMap::new();
            for i in (0..N as i64).rev() {
                map.insert(i, Some(i));
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in (0..N as i64).rev() {
                map.insert(i, Some(i));
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("OSRBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = OSRBTreeMap::new();
            for &k in &keys {
                map.insert(k, Some(k));
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, Some(k));
            }
            map
        });
    });

    group.finish();
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let os_map: OSRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, Some(k))).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("OSRBTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for k in &keys {
                if let Some(Some(&v)) = os_map.get(k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for k in &keys {
                if let Some(&v) = bt_map.get(k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

// ─── Removal ────────────────────────────────────────────────────────────────

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("OSRBTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, Some(k))).collect::<OSRBTreeMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Order statistics ───────────────────────────────────────────────────────

fn bench_rank_queries(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let os_map: OSRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, Some(k))).collect();

    let mut group = c.benchmark_group("map_rank_queries");

    group.bench_function(BenchmarkId::new("get_by_rank", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for rank in 0..os_map.len() {
                if let Some((&k, _)) = os_map.get_by_rank(rank) {
                    sum = sum.wrapping_add(k);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("rank_of", N), |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for k in &keys {
                if let Some(rank) = os_map.rank_of(k) {
                    sum = sum.wrapping_add(rank);
                }
            }
            sum
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_ordered,
    bench_insert_reverse,
    bench_insert_random,
    bench_get_random,
    bench_remove_random,
    bench_rank_queries,
);
criterion_main!(benches);
