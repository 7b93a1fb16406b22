//! Benchmarks for submit throughput and pool lifecycle cost.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use elastic_pool::{Pool, PoolConfig};

fn submit_config() -> PoolConfig {
    PoolConfig::new()
        .with_default_batch(2)
        .with_min_workers(4)
        .with_max_workers(8)
        .with_queue_capacity(4096)
        .with_admin_interval_ms(50)
}

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit");
    group.throughput(Throughput::Elements(1));
    group.bench_function("noop_task", |b| {
        let pool = Pool::<u64>::create(submit_config()).unwrap();
        b.iter(|| {
            pool.submit(
                |n: &mut u64| {
                    black_box(*n);
                },
                black_box(1),
            )
            .unwrap();
        });
        pool.destroy(true);
    });
    group.finish();
}

fn bench_create_destroy(c: &mut Criterion) {
    c.bench_function("create_destroy", |b| {
        b.iter(|| {
            let pool = Pool::<()>::create(
                PoolConfig::new()
                    .with_default_batch(1)
                    .with_min_workers(2)
                    .with_max_workers(4)
                    .with_queue_capacity(64)
                    .with_admin_interval_ms(5),
            )
            .unwrap();
            pool.destroy(false);
        });
    });
}

criterion_group!(benches, bench_submit, bench_create_destroy);
criterion_main!(benches);
