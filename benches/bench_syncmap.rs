use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use syncmap::*;

fn criterion_benchmark(c: &mut Criterion) {
    let count = 1 << 20;
    c.bench_with_input(
        BenchmarkId::new("insert_into_syncmap", count),
        &count,
        |b, &count| {
            b.iter(|| {
                let map = SyncMap::with_capacity_and_shard_count(1 << 15, 256);
                for i in 0..count {
                    map.set(i as u64, i);
                }
            })
        },
    );

    let threads = 8;
    c.bench_with_input(
        BenchmarkId::new("parallel_insert_into_syncmap", threads),
        &threads,
        |b, &threads| {
            b.iter(|| {
                let map = Arc::new(SyncMap::<u64, u64>::with_shard_count(64));
                let handles = (0..threads)
                    .map(|t| {
                        let map = map.clone();
                        std::thread::spawn(move || {
                            for i in 0..(count / threads) as u64 {
                                map.set(t as u64 * count as u64 + i, i);
                            }
                        })
                    })
                    .collect::<Vec<_>>();
                handles.into_iter().for_each(|h| h.join().unwrap());
            })
        },
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
