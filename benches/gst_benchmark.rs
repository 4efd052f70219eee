use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gen_suffix_tree::GeneralizedSuffixTree;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn build_tree(key_count: usize, key_len: usize) -> (GeneralizedSuffixTree<usize>, Vec<String>) {
    let mut tree = GeneralizedSuffixTree::new();
    let keys: Vec<String> = (0..key_count).map(|_| random_string(key_len)).collect();
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key, i);
    }
    (tree, keys)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for &key_count in &[10usize, 100, 1_000] {
        group.bench_function(format!("keys_{}", key_count), |b| {
            b.iter(|| {
                let mut tree = GeneralizedSuffixTree::new();
                for i in 0..key_count {
                    tree.insert(black_box(&random_string(32)), black_box(i));
                }
                tree
            })
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let (small_tree, small_keys) = build_tree(100, 32);
    group.bench_function("small_hit", |b| {
        let query = &small_keys[0][4..12];
        b.iter(|| small_tree.search(black_box(query)))
    });
    group.bench_function("small_miss", |b| {
        b.iter(|| small_tree.search(black_box("zzzzzzzzzzzzzzzz")))
    });

    let (large_tree, large_keys) = build_tree(10_000, 32);
    group.bench_function("large_hit", |b| {
        let query = &large_keys[0][4..12];
        b.iter(|| large_tree.search(black_box(query)))
    });

    group.finish();
}

fn bench_enumerate_common(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_common");

    let (tree, _keys) = build_tree(200, 24);
    group.bench_function("min_len_3_min_keys_2", |b| {
        b.iter(|| {
            let mut count = 0usize;
            tree.enumerate_common(black_box(3), black_box(2), |_label, _values| {
                count += 1;
            })
            .unwrap();
            count
        })
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_enumerate_common);
criterion_main!(benches);
