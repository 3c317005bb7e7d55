use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use voxmorph_morphology::{smooth_dilate, smooth_erode, NullMonitor};
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

fn bench_smooth(c: &mut Criterion) {
    let mut group = c.benchmark_group("SmoothMorphology");

    let n = 64;
    let src = create_test_volume(n, 0.05);

    for radius in [1u8, 3, 5] {
        group.bench_with_input(
            BenchmarkId::new("dilate", format!("{}x{}x{}/r{}", n, n, n, radius)),
            &src,
            |b, src| {
                b.iter(|| {
                    // the filter works in place, so give it a fresh copy
                    let mut volume = src.clone();
                    smooth_dilate(&mut volume, radius, None, None, &mut NullMonitor).unwrap();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("erode", format!("{}x{}x{}/r{}", n, n, n, radius)),
            &src,
            |b, src| {
                b.iter(|| {
                    let mut volume = src.clone();
                    smooth_erode(&mut volume, radius, None, None, &mut NullMonitor).unwrap();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_smooth);
criterion_main!(benches);
