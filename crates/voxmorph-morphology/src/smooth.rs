use voxmorph_volume::LabelVolume;

use crate::error::MorphologyError;
use crate::labels::{BACKGROUND, EDGE, FOREGROUND, MASKED};
use crate::mask::{check_constraint, inscribe, restore, MaskConstraint};
use crate::monitor::{stage_span, FilterMonitor, FilterOutcome, ProgressTracker};
use crate::neighborhood::{with_x_bits, with_y_bits, with_z_bits, NeighborTable, SlicePlane};
use crate::params::{DilateErodeParams, MAX_RADIUS};
use crate::structuring::BallPattern;

/// Direction of one morphological stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Dilate,
    Erode,
}

impl Stage {
    /// Whether the edge sweep examines a voxel holding this label.
    #[inline]
    fn sweeps(self, label: u8) -> bool {
        match self {
            Stage::Dilate => label != BACKGROUND && label != MASKED,
            // inscribed voxels must never seed an erosion, so only solid
            // foreground is considered
            Stage::Erode => label == FOREGROUND,
        }
    }

    /// Whether a neighbor holding this label turns the swept voxel into an
    /// edge.
    #[inline]
    fn triggers(self, label: u8) -> bool {
        match self {
            Stage::Dilate => label == BACKGROUND || label == MASKED,
            Stage::Erode => label == BACKGROUND,
        }
    }

    /// The label a fill target must currently hold to be written.
    #[inline]
    fn idle(self) -> u8 {
        match self {
            Stage::Dilate => BACKGROUND,
            Stage::Erode => FOREGROUND,
        }
    }

    /// The label written over idle targets within reach of an edge.
    #[inline]
    fn fill(self) -> u8 {
        match self {
            Stage::Dilate => FOREGROUND,
            Stage::Erode => BACKGROUND,
        }
    }
}

/// Mark every voxel the stage can grow or shrink from with the edge label.
///
/// One forward raster pass over z, y, x. The boundary code is maintained
/// incrementally: z and y bits once per slice and row, x bits per voxel.
fn mark_edges(
    volume: &mut LabelVolume,
    table: &NeighborTable,
    stage: Stage,
    tracker: &mut ProgressTracker,
    monitor: &mut dyn FilterMonitor,
) -> FilterOutcome {
    let size = volume.size();
    let (nx, ny, nz) = (size.nx, size.ny, size.nz);
    let data = volume.as_slice_mut();

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
                if stage.sweeps(data[idx]) {
                    let code = with_x_bits(border, x, nx);
                    for &offset in table.offsets(code) {
                        let neighbor = (idx as isize + offset) as usize;
                        if stage.triggers(data[neighbor]) {
                            data[idx] = EDGE;
                            break;
                        }
                    }
                }
                idx += 1;
            }
        }
        tracker.advance(monitor, (z + 1) as f32 / nz as f32);
    }

    FilterOutcome::Completed
}

/// Stamp the pattern at every edge voxel, writing the stage's fill label
/// over targets still holding the idle label.
///
/// The stamp target is `center - offset`; out-of-range targets are dropped
/// per axis. The idle guard makes overlapping stamps idempotent, so the
/// order in which edges are visited cannot change the result.
fn fill(
    volume: &mut LabelVolume,
    pattern: &BallPattern,
    stage: Stage,
    tracker: &mut ProgressTracker,
    monitor: &mut dyn FilterMonitor,
) -> FilterOutcome {
    let size = volume.size();
    let (nx, ny, nz) = (size.nx as isize, size.ny as isize, size.nz as isize);
    let nxy = nx * ny;
    let data = volume.as_slice_mut();

    let (rx, ry, rz) = pattern.radii();
    let (sx, sy, sz) = pattern.sides();
    let idle = stage.idle();
    let fill_label = stage.fill();

    let mut idx = 0usize;
    for z in 0..nz {
        if monitor.should_stop() {
            return FilterOutcome::Aborted;
        }
        for y in 0..ny {
            for x in 0..nx {
                if data[idx] == EDGE {
                    for iz in 0..sz {
                        let tz = z - (iz as isize - rz as isize);
                        if tz < 0 || tz >= nz {
                            continue;
                        }
                        for iy in 0..sy {
                            let ty = y - (iy as isize - ry as isize);
                            if ty < 0 || ty >= ny {
                                continue;
                            }
                            for ix in 0..sx {
                                if !pattern.is_set(ix, iy, iz) {
                                    continue;
                                }
                                let tx = x - (ix as isize - rx as isize);
                                if tx < 0 || tx >= nx {
                                    continue;
                                }
                                let target = (tx + ty * nx + tz * nxy) as usize;
                                if data[target] == idle {
                                    data[target] = fill_label;
                                }
                            }
                        }
                    }
                }
                idx += 1;
            }
        }
        tracker.advance(monitor, (z + 1) as f32 / nz as f32);
    }

    FilterOutcome::Completed
}

/// Run one full stage: rasterize, inscribe, sweep, fill, fold, restore.
fn run_stage(
    volume: &mut LabelVolume,
    stage: Stage,
    radius: u8,
    restrict: Option<SlicePlane>,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
    start: f32,
    span: f32,
) -> Result<FilterOutcome, MorphologyError> {
    // Allocate before touching the volume so an error never leaves
    // scratch labels behind.
    let pattern = BallPattern::rasterize(radius, restrict)?;
    let table = NeighborTable::faces(volume.size(), restrict);
    let mut sweep_tracker = ProgressTracker::new(start, span * 0.5);
    let mut fill_tracker = ProgressTracker::new(start + span * 0.5, span * 0.5);

    if let Some(constraint) = &constraint {
        inscribe(volume, constraint, stage.idle());
    }

    if mark_edges(volume, &table, stage, &mut sweep_tracker, monitor).is_aborted() {
        return Ok(FilterOutcome::Aborted);
    }

    if fill(volume, &pattern, stage, &mut fill_tracker, monitor).is_aborted() {
        return Ok(FilterOutcome::Aborted);
    }

    // A zero-radius ball reaches nothing, so edge voxels keep their
    // foreground value; any larger ball covers the edge voxel itself.
    let fold = if radius == 0 { FOREGROUND } else { stage.fill() };
    for voxel in volume.as_slice_mut() {
        if *voxel == EDGE {
            *voxel = fold;
        }
    }

    if constraint.is_some() {
        restore(volume, stage.idle());
    }

    fill_tracker.finish(monitor);
    Ok(FilterOutcome::Completed)
}

fn check_radius(radius: u8) -> Result<(), MorphologyError> {
    if radius > MAX_RADIUS {
        return Err(MorphologyError::RadiusTooLarge(radius));
    }
    Ok(())
}

/// Dilate the foreground of a binary volume under a spherical structuring
/// element.
///
/// The volume must hold only background (0) and foreground (1) labels on
/// entry and does so again on completion. `restrict` confines growth to
/// slices of the given plane; `constraint` keeps growth inside a region of
/// interest. On [`FilterOutcome::Aborted`] the volume still contains
/// scratch labels and must be discarded.
///
/// # Errors
///
/// Returns an error if the radius exceeds [`MAX_RADIUS`], the constraint
/// extent does not match, or the pattern cannot be allocated.
///
/// # Examples
///
/// ```
/// use voxmorph_morphology::{smooth_dilate, NullMonitor};
/// use voxmorph_volume::{VolumeSize, VoxelVolume};
///
/// let size = VolumeSize { nx: 5, ny: 5, nz: 5 };
/// let mut volume = VoxelVolume::from_size_val(size, 0u8).unwrap();
/// volume.set(2, 2, 2, 1);
///
/// smooth_dilate(&mut volume, 1, None, None, &mut NullMonitor).unwrap();
///
/// // radius 1 grows the voxel into its six face neighbors
/// let foreground = volume.as_slice().iter().filter(|&&v| v == 1).count();
/// assert_eq!(foreground, 7);
/// ```
pub fn smooth_dilate(
    volume: &mut LabelVolume,
    radius: u8,
    restrict: Option<SlicePlane>,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    check_radius(radius)?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!("smooth dilate: radius={}, extent={}", radius, volume.size());

    run_stage(
        volume,
        Stage::Dilate,
        radius,
        restrict,
        constraint,
        monitor,
        0.0,
        1.0,
    )
}

/// Erode the foreground of a binary volume under a spherical structuring
/// element.
///
/// Every foreground voxel touching background is carved away together with
/// all foreground within `radius` of it. The same entry/exit and abort
/// contract as [`smooth_dilate`] applies.
///
/// # Errors
///
/// Returns an error if the radius exceeds [`MAX_RADIUS`], the constraint
/// extent does not match, or the pattern cannot be allocated.
pub fn smooth_erode(
    volume: &mut LabelVolume,
    radius: u8,
    restrict: Option<SlicePlane>,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    check_radius(radius)?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!("smooth erode: radius={}, extent={}", radius, volume.size());

    run_stage(
        volume,
        Stage::Erode,
        radius,
        restrict,
        constraint,
        monitor,
        0.0,
        1.0,
    )
}

/// Dilate then erode a binary volume in one invocation.
///
/// Progress is split between the stages in proportion to their radii and
/// stays monotone across the stage boundary. A zero radius leaves its
/// stage as the identity.
///
/// # Errors
///
/// Returns an error if a radius exceeds [`MAX_RADIUS`], the constraint
/// extent does not match, or a pattern cannot be allocated.
pub fn smooth_dilate_erode(
    volume: &mut LabelVolume,
    params: &DilateErodeParams,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    params.validate()?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!(
        "smooth dilate-erode: dilate={}, erode={}, extent={}",
        params.dilate_radius,
        params.erode_radius,
        volume.size()
    );

    let restrict = params.restriction();
    let dilate_span = stage_span(params.dilate_radius, params.erode_radius);

    let outcome = run_stage(
        volume,
        Stage::Dilate,
        params.dilate_radius,
        restrict,
        constraint,
        monitor,
        0.0,
        dilate_span,
    )?;
    if outcome.is_aborted() {
        return Ok(outcome);
    }

    run_stage(
        volume,
        Stage::Erode,
        params.erode_radius,
        restrict,
        constraint,
        monitor,
        dilate_span,
        1.0 - dilate_span,
    )
}

/// Erode then dilate a binary volume in one invocation.
///
/// The symmetric counterpart of [`smooth_dilate_erode`], with the stage
/// order swapped.
///
/// # Errors
///
/// Returns an error if a radius exceeds [`MAX_RADIUS`], the constraint
/// extent does not match, or a pattern cannot be allocated.
pub fn smooth_erode_dilate(
    volume: &mut LabelVolume,
    params: &DilateErodeParams,
    constraint: Option<MaskConstraint<'_>>,
    monitor: &mut dyn FilterMonitor,
) -> Result<FilterOutcome, MorphologyError> {
    params.validate()?;
    check_constraint(volume, constraint.as_ref())?;
    log::debug!(
        "smooth erode-dilate: erode={}, dilate={}, extent={}",
        params.erode_radius,
        params.dilate_radius,
        volume.size()
    );

    let restrict = params.restriction();
    let erode_span = stage_span(params.erode_radius, params.dilate_radius);

    let outcome = run_stage(
        volume,
        Stage::Erode,
        params.erode_radius,
        restrict,
        constraint,
        monitor,
        0.0,
        erode_span,
    )?;
    if outcome.is_aborted() {
        return Ok(outcome);
    }

    run_stage(
        volume,
        Stage::Dilate,
        params.dilate_radius,
        restrict,
        constraint,
        monitor,
        erode_span,
        1.0 - erode_span,
    )
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
    fn fill_guard_is_idempotent() {
        let mut volume = single_voxel(7);
        let table = NeighborTable::faces(volume.size(), None);
        let pattern = BallPattern::rasterize(2, None).unwrap();

        let mut tracker = ProgressTracker::new(0.0, 1.0);
        let outcome = mark_edges(
            &mut volume,
            &table,
            Stage::Dilate,
            &mut tracker,
            &mut NullMonitor,
        );
        assert_eq!(outcome, FilterOutcome::Completed);

        let mut tracker = ProgressTracker::new(0.0, 1.0);
        let _ = fill(
            &mut volume,
            &pattern,
            Stage::Dilate,
            &mut tracker,
            &mut NullMonitor,
        );
        let once = volume.clone();

        let mut tracker = ProgressTracker::new(0.0, 1.0);
        let _ = fill(
            &mut volume,
            &pattern,
            Stage::Dilate,
            &mut tracker,
            &mut NullMonitor,
        );
        assert_eq!(volume.as_slice(), once.as_slice());
    }

    #[test]
    fn zero_radius_dilate_is_identity() {
        let mut volume = single_voxel(5);
        let before = volume.clone();
        let outcome = smooth_dilate(&mut volume, 0, None, None, &mut NullMonitor).unwrap();
        assert_eq!(outcome, FilterOutcome::Completed);
        assert_eq!(volume.as_slice(), before.as_slice());
    }

    #[test]
    fn zero_radius_erode_is_identity() {
        let mut volume = single_voxel(5);
        let before = volume.clone();
        let outcome = smooth_erode(&mut volume, 0, None, None, &mut NullMonitor).unwrap();
        assert_eq!(outcome, FilterOutcome::Completed);
        assert_eq!(volume.as_slice(), before.as_slice());
    }

    #[test]
    fn erode_removes_an_isolated_voxel() {
        let mut volume = single_voxel(5);
        smooth_erode(&mut volume, 1, None, None, &mut NullMonitor).unwrap();
        assert!(volume.as_slice().iter().all(|&v| v == BACKGROUND));
    }

    #[test]
    fn oversized_radius_is_rejected() {
        let mut volume = single_voxel(3);
        let res = smooth_dilate(&mut volume, 255, None, None, &mut NullMonitor);
        assert_eq!(res, Err(MorphologyError::RadiusTooLarge(255)));
    }

    #[test]
    fn no_scratch_labels_survive() {
        let mut volume = single_voxel(7);
        let params = DilateErodeParams {
            dilate_radius: 2,
            erode_radius: 1,
            ..Default::default()
        };
        smooth_dilate_erode(&mut volume, &params, None, &mut NullMonitor).unwrap();
        assert!(volume
            .as_slice()
            .iter()
            .all(|&v| v == BACKGROUND || v == FOREGROUND));
    }
}
