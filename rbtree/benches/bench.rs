use core::hint::black_box;
use core::time::Duration;
use std::collections::BTreeMap;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rbtree::RedBlackTree;

const MIN_POW: u32 = 5;
const MAX_POW: u32 = 15;

fn sizes() -> impl Iterator<Item = usize> {
    (MIN_POW..=MAX_POW).step_by(2).map(|pow| 1 << pow)
}

pub fn gen_unique_keys_int(count: usize, key_max: i32) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(123);
    let keys = rand::seq::index::sample(&mut rng, key_max as usize, count);
    keys.into_iter().map(|a| a as i32).collect()
}

fn shuffled(keys: &[i32], seed: u64) -> Vec<i32> {
    let mut keys = keys.to_vec();
    keys.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    keys
}

fn filled_tree(keys: &[i32]) -> RedBlackTree<i32, i32> {
    let mut tree = RedBlackTree::new();
    for &k in keys {
        tree.insert(k, k);
    }
    tree
}

fn filled_btree(keys: &[i32]) -> BTreeMap<i32, i32> {
    keys.iter().map(|&k| (k, k)).collect()
}

fn insert(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert");
    for count in sizes() {
        let keys = gen_unique_keys_int(count, i32::MAX / 2);

        g.bench_with_input(BenchmarkId::new("rbtree", count), &keys, |b, keys| {
            b.iter(|| filled_tree(keys))
        });
        g.bench_with_input(BenchmarkId::new("std_btree", count), &keys, |b, keys| {
            b.iter(|| filled_btree(keys))
        });
    }
}

fn search(c: &mut Criterion) {
    let mut g = c.benchmark_group("search");
    for count in sizes() {
        let keys = gen_unique_keys_int(count, i32::MAX / 2);
        let access = shuffled(&keys, 321);

        let tree = filled_tree(&keys);
        g.bench_with_input(BenchmarkId::new("rbtree", count), &access, |b, access| {
            b.iter(|| {
                for k in access {
                    black_box(tree.get(black_box(k)));
                }
            })
        });

        let btree = filled_btree(&keys);
        g.bench_with_input(BenchmarkId::new("std_btree", count), &access, |b, access| {
            b.iter(|| {
                for k in access {
                    black_box(btree.get(black_box(k)));
                }
            })
        });
    }
}

fn remove(c: &mut Criterion) {
    let mut g = c.benchmark_group("remove");
    for count in sizes() {
        let keys = gen_unique_keys_int(count, i32::MAX / 2);
        let order = shuffled(&keys, 456);

        g.bench_with_input(BenchmarkId::new("rbtree", count), &order, |b, order| {
            b.iter_batched(
                || filled_tree(&keys),
                |mut tree| {
                    for k in order {
                        black_box(tree.remove(k));
                    }
                    tree
                },
                BatchSize::LargeInput,
            )
        });
        g.bench_with_input(BenchmarkId::new("std_btree", count), &order, |b, order| {
            b.iter_batched(
                || filled_btree(&keys),
                |mut btree| {
                    for k in order {
                        black_box(btree.remove(k));
                    }
                    btree
                },
                BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_millis(1000))
        ;
    targets = insert, search, remove
);
criterion_main!(benches);
