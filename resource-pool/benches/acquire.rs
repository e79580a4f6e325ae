use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use futures_lite::future::block_on;

use resource_pool::{Pool, PoolConfig, Resource};

struct Plain(usize);

impl Resource for Plain {}

fn plain_pool(max: usize) -> Pool<Plain, ()> {
    PoolConfig::<Plain, ()>::new(|| async { Ok(Plain(0)) })
        .max_count(max)
        .build()
        .unwrap()
}

fn acquire_release(count: usize, pool: &Pool<Plain, ()>) {
    block_on(async {
        let mut held = Vec::with_capacity(count);
        for _ in 0..count {
            held.push(pool.acquire().await.unwrap());
        }
        for res in held.iter_mut() {
            res.0 += 1;
        }
    })
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire-release");
    for count in [1usize, 4, 16].iter() {
        let pool = plain_pool(*count);
        // warm the idle queue so only reuse is measured
        acquire_release(*count, &pool);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| acquire_release(count, &pool))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
