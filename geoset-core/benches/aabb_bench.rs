use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geoset_core::math::AABB;
use nalgebra::{Point3, Vector3};
use rand::{thread_rng, Rng};

fn gen_random_positions(count: usize) -> Vec<Vector3<f32>> {
    let mut rng = thread_rng();
    (0..count)
        .map(|_| Vector3::new(rng.gen(), rng.gen(), rng.gen()))
        .collect()
}

fn aabb_by_extending(positions: &[Vector3<f32>]) {
    let mut bounds = AABB::from_point(Point3::from(positions[0]));
    for position in positions.iter().copied().skip(1) {
        bounds = AABB::extend_with_point(&bounds, &position.into());
    }
    black_box(bounds);
}

fn aabb_in_parallel(positions: &[Vector3<f32>]) {
    black_box(AABB::from_positions(positions));
}

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb");
    for count in [4096, 1 << 20] {
        let random_positions = gen_random_positions(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("by_extending", count),
            &random_positions,
            |b, positions| b.iter(|| aabb_by_extending(positions)),
        );
        group.bench_with_input(
            BenchmarkId::new("in_parallel", count),
            &random_positions,
            |b, positions| b.iter(|| aabb_in_parallel(positions)),
        );
    }
    group.finish();
}

criterion_group! {
    name = aabb;
    config = Criterion::default().sample_size(40);
    targets = bench
}
criterion_main!(aabb);
