use crate::error::MorphologyError;
use crate::neighborhood::SlicePlane;

/// A rasterized spherical structuring element.
///
/// The pattern is a dense cube of side `2 * radius + 1` per axis, marking
/// which relative offsets lie within Euclidean distance `radius` of the
/// center. Restricting to a slice plane forces the radius along the plane's
/// normal to zero, collapsing the ball to a disk. The pattern is rebuilt
/// per fill pass and discarded afterwards.
///
/// # Example
///
/// ```rust
/// use voxmorph_morphology::BallPattern;
///
/// let ball = BallPattern::rasterize(1, None).unwrap();
/// assert_eq!(ball.sides(), (3, 3, 3));
/// // radius 1 keeps the center and its six face neighbors
/// assert_eq!(ball.active_cells(), 7);
/// ```
pub struct BallPattern {
    data: Vec<u8>,
    rx: usize,
    ry: usize,
    rz: usize,
}

impl BallPattern {
    /// Rasterize the ball for a radius.
    ///
    /// Membership uses the integer test `dx*dx + dy*dy + dz*dz <= r*r`,
    /// which is exact for every supported radius.
    ///
    /// # Arguments
    ///
    /// * `radius` - The ball radius in voxels.
    /// * `restrict` - Optional slice plane collapsing the ball to a disk.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::OutOfMemory`] if the pattern cube cannot
    /// be allocated.
    pub fn rasterize(radius: u8, restrict: Option<SlicePlane>) -> Result<Self, MorphologyError> {
        let r = radius as usize;
        let (rx, ry, rz) = match restrict {
            None => (r, r, r),
            Some(SlicePlane::Axial) => (r, r, 0),
            Some(SlicePlane::Coronal) => (r, 0, r),
            Some(SlicePlane::Sagittal) => (0, r, r),
        };

        let len = (2 * rx + 1) * (2 * ry + 1) * (2 * rz + 1);
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MorphologyError::OutOfMemory(len))?;

        let rr = (radius as i64) * (radius as i64);
        for dz in -(rz as i64)..=(rz as i64) {
            for dy in -(ry as i64)..=(ry as i64) {
                for dx in -(rx as i64)..=(rx as i64) {
                    let inside = dx * dx + dy * dy + dz * dz <= rr;
                    data.push(inside as u8);
                }
            }
        }

        let pattern = Self { data, rx, ry, rz };
        log::debug!(
            "rasterized ball pattern: radius={}, {} of {} cells set",
            radius,
            pattern.active_cells(),
            len
        );

        Ok(pattern)
    }

    /// The per-axis radii `(rx, ry, rz)`.
    pub fn radii(&self) -> (usize, usize, usize) {
        (self.rx, self.ry, self.rz)
    }

    /// The cube extent per axis, `2 * radius + 1`.
    pub fn sides(&self) -> (usize, usize, usize) {
        (2 * self.rx + 1, 2 * self.ry + 1, 2 * self.rz + 1)
    }

    /// The raw pattern cells, x fastest.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the cell at cube coordinates `(ix, iy, iz)` is inside the
    /// ball.
    #[inline]
    pub fn is_set(&self, ix: usize, iy: usize, iz: usize) -> bool {
        let sx = 2 * self.rx + 1;
        let sy = 2 * self.ry + 1;
        self.data[ix + iy * sx + iz * sx * sy] != 0
    }

    /// Number of cells inside the ball.
    pub fn active_cells(&self) -> usize {
        self.data.iter().filter(|&&cell| cell != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_a_single_center_cell() -> Result<(), MorphologyError> {
        let ball = BallPattern::rasterize(0, None)?;
        assert_eq!(ball.sides(), (1, 1, 1));
        assert_eq!(ball.active_cells(), 1);
        assert!(ball.is_set(0, 0, 0));
        Ok(())
    }

    #[test]
    fn radius_one_is_the_face_neighborhood() -> Result<(), MorphologyError> {
        let ball = BallPattern::rasterize(1, None)?;
        assert_eq!(ball.active_cells(), 7);
        assert!(ball.is_set(1, 1, 1));
        assert!(ball.is_set(0, 1, 1) && ball.is_set(2, 1, 1));
        // cube corners are at distance sqrt(3) > 1
        assert!(!ball.is_set(0, 0, 0));
        assert!(!ball.is_set(2, 2, 2));
        Ok(())
    }

    #[test]
    fn radius_two_matches_hand_count() -> Result<(), MorphologyError> {
        let ball = BallPattern::rasterize(2, None)?;
        assert_eq!(ball.sides(), (5, 5, 5));
        assert_eq!(ball.active_cells(), 33);
        // (1, 1, 1) has squared distance 3 <= 4
        assert!(ball.is_set(3, 3, 3));
        // (2, 1, 1) has squared distance 6 > 4
        assert!(!ball.is_set(4, 3, 3));
        Ok(())
    }

    #[test]
    fn restriction_collapses_the_normal_axis() -> Result<(), MorphologyError> {
        let disk = BallPattern::rasterize(1, Some(SlicePlane::Axial))?;
        assert_eq!(disk.sides(), (3, 3, 1));
        assert_eq!(disk.active_cells(), 5);

        let disk = BallPattern::rasterize(1, Some(SlicePlane::Coronal))?;
        assert_eq!(disk.sides(), (3, 1, 3));

        let disk = BallPattern::rasterize(1, Some(SlicePlane::Sagittal))?;
        assert_eq!(disk.sides(), (1, 3, 3));
        assert_eq!(disk.radii(), (0, 1, 1));
        Ok(())
    }

    #[test]
    fn membership_is_symmetric() -> Result<(), MorphologyError> {
        let ball = BallPattern::rasterize(3, None)?;
        let (sx, sy, sz) = ball.sides();
        for iz in 0..sz {
            for iy in 0..sy {
                for ix in 0..sx {
                    assert_eq!(
                        ball.is_set(ix, iy, iz),
                        ball.is_set(sx - 1 - ix, sy - 1 - iy, sz - 1 - iz)
                    );
                }
            }
        }
        Ok(())
    }
}
