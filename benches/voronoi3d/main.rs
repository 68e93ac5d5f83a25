use std::time::Duration;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use voronoi3d::Point3d;
use voronoi3d::Voronoi3D;

pub fn voronoi_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("voronoi3d");
    group
        .noise_threshold(0.05)
        .measurement_time(Duration::from_secs(20))
        .sample_size(10);
    for num_generators in [100, 1000] {
        group.throughput(Throughput::Elements(num_generators as u64));
        group.bench_function(BenchmarkId::from_parameter(num_generators), |b| {
            b.iter_batched(
                || setup_generators(num_generators),
                construct_voronoi,
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, voronoi_benchmark);
criterion_main!(benches);

fn construct_voronoi(points: Vec<Point3d>) {
    let mut tessellation = Voronoi3D::new(Point3d::ZERO, Point3d::splat(1.0e5));
    tessellation.build(&points).unwrap();
}

fn setup_generators(num_generators: usize) -> Vec<Point3d> {
    let mut rng = StdRng::seed_from_u64(1338);
    (0..num_generators)
        .map(|_| {
            let x = rng.gen_range(0.0..1.0e5);
            let y = rng.gen_range(0.0..1.0e5);
            let z = rng.gen_range(0.0..1.0e5);
            Point3d::new(x, y, z)
        })
        .collect()
}
