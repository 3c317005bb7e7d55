use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use voxmorph_morphology::{iterative_dilate, iterative_erode, NullMonitor};
use voxmorph_volume::{LabelVolume, VolumeSize, VoxelVolume};

fn create_test_volume(n: usize, density: f64) -> LabelVolume {
    let mut rng = StdRng::seed_from_u64(42);
    let size = VolumeSize {
        nx: n,
        ny: n,
        nz: n,
    };
    let data: Vec<u8> = (0..size.len())
        .map(|_| u8::from(rng.random_bool(density)))
        .collect();
    VoxelVolume::new(size, data).unwrap()
}

fn bench_iterative(c: &mut Criterion) {
    let mut group = c.benchmark_group("IterativeMorphology");

    let n = 64;
    let sparse = create_test_volume(n, 0.05);
    let dense = create_test_volume(n, 0.4);

    for radius in [1u8, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("dilate", format!("{}x{}x{}/r{}", n, n, n, radius)),
            &sparse,
            |b, src| {
                b.iter(|| {
                    // the filter works in place, so give it a fresh copy
                    let mut volume = src.clone();
                    iterative_dilate(&mut volume, radius, None, None, &mut NullMonitor).unwrap();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("erode", format!("{}x{}x{}/r{}", n, n, n, radius)),
            &dense,
            |b, src| {
                b.iter(|| {
                    let mut volume = src.clone();
                    iterative_erode(&mut volume, radius, None, None, &mut NullMonitor).unwrap();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_iterative);
criterion_main!(benches);
