use argh::FromArgs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use voxmorph::morphology::{
    iterative_dilate_erode, smooth_dilate_erode, DilateErodeParams, FilterMonitor, SlicePlane,
};
use voxmorph::volume::{BitMaskVolume, LabelVolume, VolumeSize};

#[derive(FromArgs)]
/// Close speckle noise in a synthetic voxel mask and report the result
struct Args {
    /// cubic volume extent in voxels
    #[argh(option, short = 'n', default = "64")]
    extent: usize,

    /// dilation radius
    #[argh(option, short = 'd', default = "2")]
    dilate: u8,

    /// erosion radius
    #[argh(option, short = 'e', default = "2")]
    erode: u8,

    /// keep the filter inside axial slices
    #[argh(switch)]
    only2d: bool,

    /// run the stepwise filter instead of the spherical one
    #[argh(switch)]
    stepwise: bool,

    /// seed for the speckle noise
    #[argh(option, default = "42")]
    seed: u64,

    /// print the middle axial slice before and after
    #[argh(switch)]
    show: bool,
}

/// Forward filter progress to the log facade.
struct ConsoleProgress;

impl FilterMonitor for ConsoleProgress {
    fn update_progress(&mut self, fraction: f32) {
        log::info!("progress {:3.0}%", fraction * 100.0);
    }

    fn should_stop(&self) -> bool {
        false
    }
}

fn speckle(size: VolumeSize, seed: u64) -> Result<BitMaskVolume, Box<dyn std::error::Error>> {
    let mut mask = BitMaskVolume::from_size(size, 0)?;
    let mut rng = StdRng::seed_from_u64(seed);
    for z in 0..size.nz {
        for y in 0..size.ny {
            for x in 0..size.nx {
                if rng.random_bool(0.005) {
                    mask.set_bit(x, y, z, true);
                }
            }
        }
    }
    Ok(mask)
}

fn foreground(volume: &LabelVolume) -> usize {
    volume.as_slice().iter().filter(|&&v| v == 1).count()
}

fn print_middle_slice(volume: &LabelVolume) {
    let size = volume.size();
    let z = size.nz / 2;
    for y in 0..size.ny {
        let row: String = (0..size.nx)
            .map(|x| {
                if volume.get(x, y, z) == Some(&1) {
                    '#'
                } else {
                    '.'
                }
            })
            .collect();
        println!("{}", row);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // speckle a mask plane with isolated foreground voxels, then unpack it
    // into labels the filters can chew on
    let size = VolumeSize {
        nx: args.extent,
        ny: args.extent,
        nz: args.extent,
    };
    let mut mask = speckle(size, args.seed)?;
    let mut volume: LabelVolume = mask.unpack()?;
    let before = foreground(&volume);

    if args.show {
        print_middle_slice(&volume);
    }

    let params = DilateErodeParams {
        dilate_radius: args.dilate,
        erode_radius: args.erode,
        only2d: args.only2d,
        slice: SlicePlane::Axial,
    };

    // growing merges nearby speckles, shrinking drops the isolated ones
    let start = Instant::now();
    let outcome = if args.stepwise {
        iterative_dilate_erode(&mut volume, &params, None, &mut ConsoleProgress)?
    } else {
        smooth_dilate_erode(&mut volume, &params, None, &mut ConsoleProgress)?
    };
    let elapsed = start.elapsed();

    if args.show {
        println!();
        print_middle_slice(&volume);
    }

    // pack the result back into the bit plane it came from
    mask.pack_label(&volume, 1)?;
    let after = (0..size.len()).filter(|&i| mask.bit_at_index(i)).count();

    println!(
        "{:?} in {:.2?}: {} -> {} foreground voxels",
        outcome, elapsed, before, after
    );

    Ok(())
}
