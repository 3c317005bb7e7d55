use voxmorph_volume::{BitMaskVolume, LabelVolume};

use crate::error::MorphologyError;
use crate::labels::MASKED;

/// Read-only region constraint applied around a filter stage.
///
/// The constraint is consulted only while inscribing and never mutated; in
/// between, the fill phases see the protected voxels as [`MASKED`] scratch
/// labels and leave them alone without knowing a mask exists.
#[derive(Clone, Copy)]
pub struct MaskConstraint<'a> {
    mask: &'a BitMaskVolume,
    invert: bool,
}

impl<'a> MaskConstraint<'a> {
    /// Constrain filtering to voxels where the mask bit is set, or to the
    /// complement when `invert` is true.
    pub fn new(mask: &'a BitMaskVolume, invert: bool) -> Self {
        Self { mask, invert }
    }

    /// The underlying packed mask.
    pub fn mask(&self) -> &BitMaskVolume {
        self.mask
    }

    /// Whether the constraint sense is inverted.
    pub fn invert(&self) -> bool {
        self.invert
    }

    /// Whether the voxel at flat index `idx` may be modified.
    #[inline]
    pub fn is_inside(&self, idx: usize) -> bool {
        self.mask.bit_at_index(idx) != self.invert
    }
}

/// Overwrite out-of-region voxels currently holding `from` with the scratch
/// mask label.
///
/// Dilation inscribes background so growth cannot enter protected
/// territory; erosion inscribes foreground so the protected exterior reads
/// as still solid and is never eroded through.
pub(crate) fn inscribe(volume: &mut LabelVolume, constraint: &MaskConstraint<'_>, from: u8) {
    for (idx, voxel) in volume.as_slice_mut().iter_mut().enumerate() {
        if *voxel == from && !constraint.is_inside(idx) {
            *voxel = MASKED;
        }
    }
}

/// Restore inscribed voxels to `to`.
pub(crate) fn restore(volume: &mut LabelVolume, to: u8) {
    for voxel in volume.as_slice_mut() {
        if *voxel == MASKED {
            *voxel = to;
        }
    }
}

/// Check that a constraint mask, if supplied, covers the same extent as the
/// volume.
pub(crate) fn check_constraint(
    volume: &LabelVolume,
    constraint: Option<&MaskConstraint<'_>>,
) -> Result<(), MorphologyError> {
    if let Some(constraint) = constraint {
        let mask_size = constraint.mask().size();
        if mask_size != volume.size() {
            return Err(MorphologyError::MaskSizeMismatch(
                mask_size.to_string(),
                volume.size().to_string(),
            ));
        }
    }
    Ok(())
}
