use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use custdedup_core::dedup::{DedupConfig, Deduplicator};
use custdedup_core::identity::KeyNormalization;
use custdedup_core::replicate::{replicate, ReplicationPlan};
use custdedup_core::Table;
use serde_json::json;

fn customers(n: usize, distinct: usize) -> Table {
    let rows = (0..n)
        .map(|i| {
            let email = if i % 2 == 0 {
                format!("user_{}@example.com", i % distinct)
            } else {
                format!("  USER_{}@EXAMPLE.COM ", i % distinct)
            };
            vec![json!(i), json!(email), json!(i % 17), json!(i as f64 * 1.5)]
        })
        .collect();
    Table::new(["customer_id", "email", "total_orders", "total_spent"], rows).unwrap()
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup");
    group.throughput(Throughput::Elements(10_000));

    let unique = customers(10_000, 10_000);
    group.bench_function("10k_unique", |b| {
        let dedup = Deduplicator::default();
        b.iter(|| black_box(dedup.deduplicate(&unique).unwrap()));
    });

    let half = customers(10_000, 5_000);
    group.bench_function("10k_50pct_dup", |b| {
        let dedup = Deduplicator::default();
        b.iter(|| black_box(dedup.deduplicate(&half).unwrap()));
    });

    group.bench_function("10k_exact_keys", |b| {
        let dedup = Deduplicator::new(DedupConfig {
            normalization: KeyNormalization::Exact,
            ..Default::default()
        });
        b.iter(|| black_box(dedup.deduplicate(&half).unwrap()));
    });

    group.finish();
}

fn bench_replicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicate");
    let base = customers(10_000, 10_000);
    group.throughput(Throughput::Elements(500_000));

    group.bench_function("10k_x50", |b| {
        let plan = ReplicationPlan::customers(50);
        b.iter(|| black_box(replicate(&base, &plan).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_dedup, bench_replicate);
criterion_main!(benches);
