use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scapegoat_tree::ScapegoatTree;
use std::collections::BTreeSet;
use std::hint::black_box;

const N: usize = 10_000;

/// Balance factors worth comparing: strict, default and loose.
const BETAS: [u16; 3] = [0, 500, 900];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_sets() -> [(&'static str, Vec<i64>); 3] {
    let ordered = ordered_keys(N);
    let reverse = ordered.iter().rev().copied().collect();
    [("ordered", ordered), ("reverse", reverse), ("random", random_keys(N))]
}

// ─── Insertion ──────────────────────────────────────────────────────────────

fn bench_add(c: &mut Criterion) {
    for (order, keys) in key_sets() {
        let mut group = c.benchmark_group(format!("add_{order}"));

        for beta in BETAS {
            group.bench_with_input(BenchmarkId::new("ScapegoatTree", beta), &keys, |b, keys| {
                b.iter(|| {
                    let mut tree = ScapegoatTree::with_balance(beta);
                    for &key in keys {
                        tree.add(key);
                    }
                    tree
                });
            });
        }

        group.bench_with_input(BenchmarkId::new("BTreeSet", N), &keys, |b, keys| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &key in keys {
                    set.insert(key);
                }
                set
            });
        });

        group.finish();
    }
}

fn bench_bulk_build(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("bulk_build_random");

    group.bench_function(BenchmarkId::new("ScapegoatTree", N), |b| {
        b.iter(|| keys.iter().copied().collect::<ScapegoatTree<i64>>());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| keys.iter().copied().collect::<BTreeSet<i64>>());
    });

    group.finish();
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

fn bench_get(c: &mut Criterion) {
    for (order, keys) in key_sets() {
        let mut group = c.benchmark_group(format!("get_{order}"));

        for beta in BETAS {
            let mut tree: ScapegoatTree<i64> = ScapegoatTree::with_balance(beta);
            tree.extend(&keys);
            group.bench_with_input(BenchmarkId::new("ScapegoatTree", beta), &keys, |b, keys| {
                b.iter(|| {
                    for key in keys {
                        black_box(tree.get(key));
                    }
                });
            });
        }

        let set: BTreeSet<i64> = keys.iter().copied().collect();
        group.bench_with_input(BenchmarkId::new("BTreeSet", N), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(set.get(key));
                }
            });
        });

        group.finish();
    }
}

// ─── Removal ────────────────────────────────────────────────────────────────

fn bench_remove(c: &mut Criterion) {
    for (order, keys) in key_sets() {
        let mut group = c.benchmark_group(format!("remove_{order}"));

        for beta in BETAS {
            let mut tree: ScapegoatTree<i64> = ScapegoatTree::with_balance(beta);
            tree.extend(&keys);
            group.bench_with_input(BenchmarkId::new("ScapegoatTree", beta), &keys, |b, keys| {
                b.iter_batched(
                    || tree.clone(),
                    |mut tree| {
                        for key in keys {
                            tree.remove(key);
                        }
                        tree
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }

        let set: BTreeSet<i64> = keys.iter().copied().collect();
        group.bench_with_input(BenchmarkId::new("BTreeSet", N), &keys, |b, keys| {
            b.iter_batched(
                || set.clone(),
                |mut set| {
                    for key in keys {
                        set.remove(key);
                    }
                    set
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

// ─── Traversal ──────────────────────────────────────────────────────────────

fn bench_iter(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: ScapegoatTree<i64> = keys.iter().copied().collect();
    let set: BTreeSet<i64> = keys.iter().copied().collect();
    let mut group = c.benchmark_group("iter_random");

    group.bench_function(BenchmarkId::new("ScapegoatTree::iter", N), |b| {
        b.iter(|| tree.iter().copied().sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("ScapegoatTree::inorder", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            tree.inorder(|key| {
                sum = sum.wrapping_add(*key);
                true
            });
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| set.iter().copied().sum::<i64>());
    });

    group.finish();
}

criterion_group!(insert_benches, bench_add, bench_bulk_build);

criterion_group!(lookup_benches, bench_get, bench_iter);

criterion_group!(remove_benches, bench_remove);

criterion_main!(insert_benches, lookup_benches, remove_benches);
