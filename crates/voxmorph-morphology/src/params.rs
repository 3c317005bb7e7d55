use crate::error::MorphologyError;
use crate::neighborhood::SlicePlane;

/// Largest radius the filters accept.
pub const MAX_RADIUS: u8 = 254;

/// Parameters of a combined dilate/erode invocation.
///
/// # Example
///
/// ```rust
/// use voxmorph_morphology::{DilateErodeParams, SlicePlane};
///
/// let params = DilateErodeParams {
///     dilate_radius: 2,
///     erode_radius: 1,
///     only2d: true,
///     slice: SlicePlane::Axial,
/// };
/// assert!(params.validate().is_ok());
/// assert_eq!(params.restriction(), Some(SlicePlane::Axial));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DilateErodeParams {
    /// Radius of the dilation stage; zero leaves the volume unchanged.
    pub dilate_radius: u8,
    /// Radius of the erosion stage; zero leaves the volume unchanged.
    pub erode_radius: u8,
    /// Filter each slice independently instead of the full volume.
    pub only2d: bool,
    /// The slice plane used when `only2d` is set; ignored otherwise.
    pub slice: SlicePlane,
}

impl Default for DilateErodeParams {
    fn default() -> Self {
        Self {
            dilate_radius: 1,
            erode_radius: 1,
            only2d: false,
            slice: SlicePlane::Axial,
        }
    }
}

impl DilateErodeParams {
    /// Check that both radii are within the supported range.
    pub fn validate(&self) -> Result<(), MorphologyError> {
        if self.dilate_radius > MAX_RADIUS {
            return Err(MorphologyError::RadiusTooLarge(self.dilate_radius));
        }
        if self.erode_radius > MAX_RADIUS {
            return Err(MorphologyError::RadiusTooLarge(self.erode_radius));
        }
        Ok(())
    }

    /// The neighborhood restriction encoded by `only2d` and `slice`.
    ///
    /// The slice plane deliberately has no effect unless `only2d` is set;
    /// callers rely on being able to leave a stale plane in the struct.
    pub fn restriction(&self) -> Option<SlicePlane> {
        self.only2d.then_some(self.slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_the_full_range() {
        let mut params = DilateErodeParams::default();
        params.dilate_radius = 0;
        params.erode_radius = MAX_RADIUS;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_radius() {
        let mut params = DilateErodeParams::default();
        params.erode_radius = 255;
        assert_eq!(
            params.validate(),
            Err(MorphologyError::RadiusTooLarge(255))
        );
    }

    #[test]
    fn slice_plane_is_inert_without_only2d() {
        let params = DilateErodeParams {
            only2d: false,
            slice: SlicePlane::Sagittal,
            ..Default::default()
        };
        assert_eq!(params.restriction(), None);

        let params = DilateErodeParams {
            only2d: true,
            ..params
        };
        assert_eq!(params.restriction(), Some(SlicePlane::Sagittal));
    }
}
