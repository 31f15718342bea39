use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avltree::{AvlTree, Queue};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &values {
                tree.insert(*value);
            }
            tree
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }

    c.bench_function("tree_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.get(value));
            }
        })
    });

    c.bench_function("tree_inorder", |b| {
        b.iter(|| {
            tree.traverse_inorder(|key| {
                black_box(key);
            });
        })
    });

    c.bench_function("tree_level_order", |b| {
        b.iter(|| {
            tree.traverse_level_order(|entry| {
                black_box(entry);
            });
        })
    });

    c.bench_function("queue_push_pop", |b| {
        b.iter(|| {
            let mut queue = Queue::new();
            for value in &values {
                queue.push_back(*value);
            }
            while let Some(value) = queue.pop_front() {
                black_box(value);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
