use voxmorph_volume::LabelVolume;

use crate::error::MorphologyError;
use crate::labels::{BACKGROUND, FOREGROUND, MASKED};
use crate::mask::{check_constraint, inscribe, restore, MaskConstraint};
use crate::monitor::{stage_span, FilterMonitor, FilterOutcome, ProgressTracker};
use crate::neighborhood::{with_x_bits, with_y_bits, with_z_bits, NeighborTable, SlicePlane};
use crate::params::{DilateErodeParams, MAX_RADIUS};

/// Run `passes` dilation steps over the table's neighborhood.
///
/// Pass `i` spreads from voxels labelled `1 + i` into background neighbors,
/// which receive `2 + i`. Only the newest shell spreads, so each pass costs
/// one sweep no matter how much has grown already.
fn dilate_passes(
    volume: &mut LabelVolume,
    table: &NeighborTable,
    passes: u8,
    tracker: &mut ProgressTracker,
    monitor: &mut dyn FilterMonitor,
) -> FilterOutcome {
    let size = volume.size();
    let (nx, ny, nz) = (size.nx, size.ny, size.nz);
    let data = volume.as_slice_mut();
    let total = passes as usize * nz;

    for i in 0..passes {
        let previous_label = 1 + i;
        let current_label = 2 + i;
        let mut border = 0u8;
        let mut idx = 0usize;
        for z in 0..nz {
            if monitor.should_stop() {
                return FilterOutcome::Aborted;
            }
            border = with_z_bits(border, z, nz);
            for y in 0..ny {
                border = with_y_bits(border, y, ny);
                for x in 0..nx {
                    if data[idx] == previous_label {
                        let code = with_x_bits(border, x, nx);
                        for &offset in table.offsets(code) {
                            let neighbor = (idx as isize + offset) as usize;
                            if data[neighbor] == BACKGROUND {
                                data[neighbor] = current_label;
                            }
                        }
                    }
                    idx += 1;
                }
            }
            tracker.advance(monitor, (i as usize * nz + z + 1) as f32 / total as f32);
        }
    }

    FilterOutcome::Completed
}

/// Run `passes` erosion steps over the table's neighborhood.
///
/// A foreground voxel joins shell `2 + i` when some neighbor is neither
/// protected, foreground, nor part of the same shell. Shells from earlier
/// passes count as removed, which moves the boundary inward one step per
/// pass.
fn erode_passes(
    volume: &mut LabelVolume,
    table: &NeighborTable,
    passes: u8,
    tracker: &mut ProgressTracker,
    monitor: &mut dyn FilterMonitor,
) -> FilterOutcome {
    let size = volume.size();
    let (nx, ny, nz) = (size.nx, size.ny, size.nz);
    let data = volume.as_slice_mut();
    let total = passes as usize * nz;

    for i in 0..passes {
        let current_label = 2 + i;
        let mut border = 0u8;
        let mut idx = 0usize;
        for z in 0..nz {
            if monitor.should_stop() {
                return FilterOutcome::Aborted;
            }
            border = with_z_bits(border, z, nz);
            for y in 0..ny {
                border = with_y_bits(border, y, ny);
                for x in 0..nx {
                    if data[idx] == FOREGROUND {
                        let code = with_x_bits(border, x, nx);
                        for &offset in table.offsets(code) {
                            let neighbor = (idx as isize + offset) as usize;
                            let value = data[neighbor];
                            if value != MASKED && value != FOREGROUND && value != current_label {
                                data[idx] = current_label;
                                break;
                            }
                        }
                    }
                    idx += 1;
                }
            }
            tracker.advance(monitor, (i as usize * nz + z + 1) as f32 / total as f32);
        }
    }

    FilterOutcome::Completed
}

/// Fold any label the dilation passes produced back into foreground.
fn relabel_grown(volume: &mut LabelVolume) {
    for voxel in volume.as_slice_mut() {
        if *voxel != BACKGROUND {
            *voxel = FOREGROUND;
        }
    }
}

/// Fold any label the erosion passes produced back into background.
fn relabel_carved(volume: &mut LabelVolume) {
    for voxel in volume.as_slice_mut() {
        if *voxel != FOREGROUND {
            *voxel = BACKGROUND;
        }
    }
}

fn check_passes(radius: u8) -> Result<(), MorphologyError> {
    if radius < 1 {
        return Err(MorphologyError::ZeroRadius);
    }
    if radius > MAX_RADIUS {
        return Err(MorphologyError::RadiusTooLarge(radius));
    }
    Ok(())
}

/// Grow the foreground of a binary volume by `radius` neighborhood steps.
///
/// Each step spreads foreground into the six face neighbors and the twelve
/// in-plane diagonal neighbors of every boundary voxel, so a single step
/// grows a voxel into its 18-neighborhood. `restrict` keeps a step inside
/// slices of the given plane and `constraint` keeps growth inside a region
/// of interest. The volume must hold only 0 and 1 on entry and does so
/// again on completion; on [`FilterOutcome::Aborted`] it is left with
/// scratch labels and must be discarded.
///
/// # Errors
///
/// Returns an error if the radius is zero or exceeds [`MAX_RADIUS`], or if
/// the constraint extent does not match.
///
/// # Examples
///
/// ```
/// use voxmorph_morphology::{iterative_dilate, NullMonitor};
/// use voxmorph_volume::{VolumeSize, VoxelVolume};
///
/// let size = VolumeSize { nx: 5, ny: 5, nz: 5 };
/// let mut volume = VoxelVolume::from_size_val(size, 0u8).unwrap();
/// volume.set(2, 2, 2, 1);
///
/// iterative_dilate(&mut volume, 1, None, None, &mut NullMonitor).unwrap();
///
/// // one step reaches the full 18-neighborhood
/// let foreground = volume.as_slice().iter().filter(|&&v| v == 1).count();
/// assert_eq!(foreground, 19);
/// ```
pub fn iterative_dilate(
    volume: &mut LabelVolume,
    radius: u8,
    restrict: Option<SlicePlane>,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    check_passes(radius)?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!(
        "iterative dilate: radius={}, extent={}",
        radius,
        volume.size()
    );

    let table = NeighborTable::steps(volume.size(), restrict);
    let mut tracker = ProgressTracker::new(0.0, 1.0);

    if let Some(constraint) = &constraint {
        inscribe(volume, constraint, BACKGROUND);
    }
    if dilate_passes(volume, &table, radius, &mut tracker, monitor).is_aborted() {
        return Ok(FilterOutcome::Aborted);
    }
    if constraint.is_some() {
        restore(volume, BACKGROUND);
    }
    relabel_grown(volume);

    tracker.finish(monitor);
    Ok(FilterOutcome::Completed)
}

/// Shrink the foreground of a binary volume by `radius` neighborhood steps.
///
/// Each step removes the foreground voxels with a face neighbor outside the
/// foreground. Unlike [`iterative_dilate`] the steps never look at diagonal
/// neighbors, so corners erode more slowly than they grow. The entry/exit
/// and abort contract of [`iterative_dilate`] applies.
///
/// # Errors
///
/// Returns an error if the radius is zero or exceeds [`MAX_RADIUS`], or if
/// the constraint extent does not match.
pub fn iterative_erode(
    volume: &mut LabelVolume,
    radius: u8,
    restrict: Option<SlicePlane>,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    check_passes(radius)?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!(
        "iterative erode: radius={}, extent={}",
        radius,
        volume.size()
    );

    let table = NeighborTable::faces(volume.size(), restrict);
    let mut tracker = ProgressTracker::new(0.0, 1.0);

    if let Some(constraint) = &constraint {
        inscribe(volume, constraint, FOREGROUND);
    }
    if erode_passes(volume, &table, radius, &mut tracker, monitor).is_aborted() {
        return Ok(FilterOutcome::Aborted);
    }
    if constraint.is_some() {
        restore(volume, FOREGROUND);
    }
    relabel_carved(volume);

    tracker.finish(monitor);
    Ok(FilterOutcome::Completed)
}

/// Grow then shrink a binary volume by neighborhood steps in one
/// invocation.
///
/// Both phases step over face neighbors only. A zero radius skips its
/// phase, and progress is split between the phases in proportion to their
/// radii.
///
/// # Errors
///
/// Returns an error if a radius exceeds [`MAX_RADIUS`] or the constraint
/// extent does not match.
pub fn iterative_dilate_erode(
    volume: &mut LabelVolume,
    params: &DilateErodeParams,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    params.validate()?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!(
        "iterative dilate-erode: dilate={}, erode={}, extent={}",
        params.dilate_radius,
        params.erode_radius,
        volume.size()
    );

    let restrict = params.restriction();
    let table = NeighborTable::faces(volume.size(), restrict);
    let dilate_span = stage_span(params.dilate_radius, params.erode_radius);

    let mut dilate_tracker = ProgressTracker::new(0.0, dilate_span);
    if let Some(constraint) = &constraint {
        inscribe(volume, constraint, BACKGROUND);
    }
    if dilate_passes(
        volume,
        &table,
        params.dilate_radius,
        &mut dilate_tracker,
        monitor,
    )
    .is_aborted()
    {
        return Ok(FilterOutcome::Aborted);
    }
    if constraint.is_some() {
        restore(volume, BACKGROUND);
    }
    relabel_grown(volume);
    dilate_tracker.finish(monitor);

    let mut erode_tracker = ProgressTracker::new(dilate_span, 1.0 - dilate_span);
    if let Some(constraint) = &constraint {
        inscribe(volume, constraint, FOREGROUND);
    }
    if erode_passes(
        volume,
        &table,
        params.erode_radius,
        &mut erode_tracker,
        monitor,
    )
    .is_aborted()
    {
        return Ok(FilterOutcome::Aborted);
    }
    if constraint.is_some() {
        restore(volume, FOREGROUND);
    }
    relabel_carved(volume);
    erode_tracker.finish(monitor);

    Ok(FilterOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NullMonitor;
    use voxmorph_volume::{VolumeSize, VoxelVolume};

    fn single_voxel(n: usize) -> LabelVolume {
        let size = VolumeSize {
            nx: n,
            ny: n,
            nz: n,
        };
        let mut volume = VoxelVolume::from_size_val(size, 0u8).unwrap();
        let c = n / 2;
        volume.set(c, c, c, FOREGROUND);
        volume
    }

    #[test]
    fn one_step_reaches_the_planar_diagonals_in_2d() {
        let mut volume = single_voxel(5);
        iterative_dilate(
            &mut volume,
            1,
            Some(SlicePlane::Axial),
            None,
            &mut NullMonitor,
        )
        .unwrap();

        // 3x3 block in the center slice, nothing above or below
        let count = volume.as_slice().iter().filter(|&&v| v == 1).count();
        assert_eq!(count, 9);
        for z in [1, 3] {
            for y in 0..5 {
                for x in 0..5 {
                    assert_eq!(volume.get(x, y, z), Some(&0));
                }
            }
        }
    }

    #[test]
    fn two_steps_compose() {
        let mut stepped = single_voxel(9);
        iterative_dilate(&mut stepped, 2, None, None, &mut NullMonitor).unwrap();

        let mut twice = single_voxel(9);
        iterative_dilate(&mut twice, 1, None, None, &mut NullMonitor).unwrap();
        iterative_dilate(&mut twice, 1, None, None, &mut NullMonitor).unwrap();

        assert_eq!(stepped.as_slice(), twice.as_slice());
    }

    #[test]
    fn erode_step_keeps_the_cube_center() {
        let size = VolumeSize {
            nx: 5,
            ny: 5,
            nz: 5,
        };
        let mut volume = VoxelVolume::from_size_val(size, 0u8).unwrap();
        for z in 1..4 {
            for y in 1..4 {
                for x in 1..4 {
                    volume.set(x, y, z, FOREGROUND);
                }
            }
        }

        iterative_erode(&mut volume, 1, None, None, &mut NullMonitor).unwrap();

        let count = volume.as_slice().iter().filter(|&&v| v == 1).count();
        assert_eq!(count, 1);
        assert_eq!(volume.get(2, 2, 2), Some(&1));
    }

    #[test]
    fn erode_ignores_diagonal_contact() {
        let size = VolumeSize {
            nx: 3,
            ny: 3,
            nz: 1,
        };
        // plus shape; the center touches background only diagonally
        let mut volume = VoxelVolume::from_size_val(size, 0u8).unwrap();
        for (x, y) in [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)] {
            volume.set(x, y, 0, FOREGROUND);
        }

        iterative_erode(&mut volume, 1, None, None, &mut NullMonitor).unwrap();

        let count = volume.as_slice().iter().filter(|&&v| v == 1).count();
        assert_eq!(count, 1);
        assert_eq!(volume.get(1, 1, 0), Some(&1));
    }

    #[test]
    fn erode_treats_the_volume_boundary_as_solid() {
        let size = VolumeSize {
            nx: 4,
            ny: 4,
            nz: 1,
        };
        // a full slab has no background neighbor inside the volume
        let mut volume = VoxelVolume::from_size_val(size, FOREGROUND).unwrap();
        iterative_erode(&mut volume, 3, None, None, &mut NullMonitor).unwrap();
        assert!(volume.as_slice().iter().all(|&v| v == FOREGROUND));
    }

    #[test]
    fn zero_passes_are_rejected() {
        let mut volume = single_voxel(3);
        let res = iterative_dilate(&mut volume, 0, None, None, &mut NullMonitor);
        assert_eq!(res, Err(MorphologyError::ZeroRadius));
        let res = iterative_erode(&mut volume, 0, None, None, &mut NullMonitor);
        assert_eq!(res, Err(MorphologyError::ZeroRadius));
    }

    #[test]
    fn combined_round_trip_keeps_an_isolated_voxel() {
        let mut volume = single_voxel(7);
        let params = DilateErodeParams {
            dilate_radius: 1,
            erode_radius: 1,
            ..Default::default()
        };
        iterative_dilate_erode(&mut volume, &params, None, &mut NullMonitor).unwrap();

        let count = volume.as_slice().iter().filter(|&&v| v == 1).count();
        assert_eq!(count, 1);
        assert_eq!(volume.get(3, 3, 3), Some(&1));
    }

    #[test]
    fn combined_with_zero_radii_is_identity() {
        let mut volume = single_voxel(5);
        let before = volume.clone();
        let params = DilateErodeParams {
            dilate_radius: 0,
            erode_radius: 0,
            ..Default::default()
        };
        let outcome =
            iterative_dilate_erode(&mut volume, &params, None, &mut NullMonitor).unwrap();
        assert_eq!(outcome, FilterOutcome::Completed);
        assert_eq!(volume.as_slice(), before.as_slice());
    }

    #[test]
    fn aborted_run_reports_aborted() {
        use crate::monitor::AbortHandle;

        let mut volume = single_voxel(5);
        let mut handle = AbortHandle::new();
        handle.abort();
        let outcome = iterative_dilate(&mut volume, 3, None, None, &mut handle).unwrap();
        assert!(outcome.is_aborted());
    }
}
