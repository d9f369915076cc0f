use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth_broadphase::{glam::Vec2, Circle, SweepAndPrune, ThreadPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};

fn random_circles(count: usize) -> Vec<Circle> {
    let mut rng = StdRng::seed_from_u64(0xb0a7);
    let extent = (count as f32).sqrt() * 10.0;
    (0..count)
        .map(|_| {
            Circle::new(
                Vec2::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)),
                rng.gen_range(1.0..5.0),
            )
        })
        .collect()
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");
    for &count in &[1_000usize, 10_000, 100_000] {
        let circles = random_circles(count);
        let mut sap = SweepAndPrune::with_capacity(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &circles, |b, circles| {
            b.iter(|| sap.populate(black_box(circles)))
        });
    }
    group.finish();
}

fn bench_pairs(c: &mut Criterion) {
    let pool = ThreadPool::new(8);
    let circles = random_circles(50_000);
    let mut sap = SweepAndPrune::with_capacity(circles.len());
    sap.populate(&circles);

    let mut group = c.benchmark_group("for_each_unique_index_pair");
    for &n_workers in &[1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n_workers), &n_workers, |b, &n| {
            b.iter(|| {
                let count = AtomicUsize::new(0);
                sap.for_each_unique_index_pair(n, &pool, |_, _| {
                    count.fetch_add(1, Ordering::Relaxed);
                });
                black_box(count.into_inner())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_populate, bench_pairs);
criterion_main!(benches);
