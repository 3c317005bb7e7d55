use voxmorph_volume::VolumeSize;

/// Anatomical plane selecting the active slices for 2D filtering.
///
/// The plane names follow medical imaging convention: an axial slice is
/// normal to the z axis, a coronal slice to the y axis and a sagittal slice
/// to the x axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlicePlane {
    /// Slices normal to the z axis.
    Axial,
    /// Slices normal to the y axis.
    Coronal,
    /// Slices normal to the x axis.
    Sagittal,
}

/// Boundary-code bit set when the voxel sits at x = 0.
pub const AT_X_MIN: u8 = 0x01;
/// Boundary-code bit set when the voxel sits at x = nx - 1.
pub const AT_X_MAX: u8 = 0x02;
/// Boundary-code bit set when the voxel sits at y = 0.
pub const AT_Y_MIN: u8 = 0x04;
/// Boundary-code bit set when the voxel sits at y = ny - 1.
pub const AT_Y_MAX: u8 = 0x08;
/// Boundary-code bit set when the voxel sits at z = 0.
pub const AT_Z_MIN: u8 = 0x10;
/// Boundary-code bit set when the voxel sits at z = nz - 1.
pub const AT_Z_MAX: u8 = 0x20;

/// Recompute the x bits of a boundary code for position `x` of `nx`.
///
/// The sweep loops keep one code per row and only refresh the bits of the
/// axis that moved, so the full code is never derived from scratch per
/// voxel. An axis of extent one sets both of its bits.
#[inline]
pub fn with_x_bits(code: u8, x: usize, nx: usize) -> u8 {
    let mut code = code & !(AT_X_MIN | AT_X_MAX);
    if x == 0 {
        code |= AT_X_MIN;
    }
    if x + 1 == nx {
        code |= AT_X_MAX;
    }
    code
}

/// Recompute the y bits of a boundary code for position `y` of `ny`.
#[inline]
pub fn with_y_bits(code: u8, y: usize, ny: usize) -> u8 {
    let mut code = code & !(AT_Y_MIN | AT_Y_MAX);
    if y == 0 {
        code |= AT_Y_MIN;
    }
    if y + 1 == ny {
        code |= AT_Y_MAX;
    }
    code
}

/// Recompute the z bits of a boundary code for position `z` of `nz`.
#[inline]
pub fn with_z_bits(code: u8, z: usize, nz: usize) -> u8 {
    let mut code = code & !(AT_Z_MIN | AT_Z_MAX);
    if z == 0 {
        code |= AT_Z_MIN;
    }
    if z + 1 == nz {
        code |= AT_Z_MAX;
    }
    code
}

/// Precomputed neighbor offsets for each of the 64 boundary codes.
///
/// Indexing the table with a voxel's boundary code yields exactly the
/// linear offsets that stay inside the volume at that position, so the
/// sweep loops need no per-neighbor bounds checks. The table is built once
/// per invocation and read-only afterwards.
pub struct NeighborTable {
    offsets: [Vec<isize>; 64],
}

impl NeighborTable {
    /// Build the table of the six face offsets, used by the edge sweeps.
    ///
    /// `restrict` drops the offsets along the plane's normal axis so a 2D
    /// sweep never crosses slices. Passing `None` keeps all three axes.
    pub fn faces(size: VolumeSize, restrict: Option<SlicePlane>) -> Self {
        let nx = size.nx as isize;
        let nxy = (size.nx * size.ny) as isize;
        let mut offsets: [Vec<isize>; 64] = std::array::from_fn(|_| Vec::new());

        for (code, entry) in offsets.iter_mut().enumerate() {
            let code = code as u8;

            if restrict != Some(SlicePlane::Sagittal) {
                if code & AT_X_MIN == 0 {
                    entry.push(-1);
                }
                if code & AT_X_MAX == 0 {
                    entry.push(1);
                }
            }

            if restrict != Some(SlicePlane::Coronal) {
                if code & AT_Y_MIN == 0 {
                    entry.push(-nx);
                }
                if code & AT_Y_MAX == 0 {
                    entry.push(nx);
                }
            }

            if restrict != Some(SlicePlane::Axial) {
                if code & AT_Z_MIN == 0 {
                    entry.push(-nxy);
                }
                if code & AT_Z_MAX == 0 {
                    entry.push(nxy);
                }
            }
        }

        Self { offsets }
    }

    /// Build the table of faces plus the twelve planar diagonals, used by
    /// the stepwise dilation.
    ///
    /// In 2D mode only the diagonals lying inside the active plane are
    /// kept; in 3D mode all twelve are present.
    pub fn steps(size: VolumeSize, restrict: Option<SlicePlane>) -> Self {
        let nx = size.nx as isize;
        let nxy = (size.nx * size.ny) as isize;
        let mut table = Self::faces(size, restrict);

        for (code, entry) in table.offsets.iter_mut().enumerate() {
            let code = code as u8;

            // diagonals spanning x and y
            if restrict.is_none() || restrict == Some(SlicePlane::Axial) {
                if code & (AT_X_MIN | AT_Y_MIN) == 0 {
                    entry.push(-1 - nx);
                }
                if code & (AT_X_MAX | AT_Y_MIN) == 0 {
                    entry.push(1 - nx);
                }
                if code & (AT_X_MIN | AT_Y_MAX) == 0 {
                    entry.push(-1 + nx);
                }
                if code & (AT_X_MAX | AT_Y_MAX) == 0 {
                    entry.push(1 + nx);
                }
            }

            // diagonals spanning x and z
            if restrict.is_none() || restrict == Some(SlicePlane::Coronal) {
                if code & (AT_X_MIN | AT_Z_MIN) == 0 {
                    entry.push(-1 - nxy);
                }
                if code & (AT_X_MAX | AT_Z_MIN) == 0 {
                    entry.push(1 - nxy);
                }
                if code & (AT_X_MIN | AT_Z_MAX) == 0 {
                    entry.push(-1 + nxy);
                }
                if code & (AT_X_MAX | AT_Z_MAX) == 0 {
                    entry.push(1 + nxy);
                }
            }

            // diagonals spanning y and z
            if restrict.is_none() || restrict == Some(SlicePlane::Sagittal) {
                if code & (AT_Y_MIN | AT_Z_MIN) == 0 {
                    entry.push(-nx - nxy);
                }
                if code & (AT_Y_MAX | AT_Z_MIN) == 0 {
                    entry.push(nx - nxy);
                }
                if code & (AT_Y_MIN | AT_Z_MAX) == 0 {
                    entry.push(-nx + nxy);
                }
                if code & (AT_Y_MAX | AT_Z_MAX) == 0 {
                    entry.push(nx + nxy);
                }
            }
        }

        table
    }

    /// The valid neighbor offsets for a boundary code.
    ///
    /// # Panics
    ///
    /// Panics if `code` is not a 6-bit boundary code.
    #[inline]
    pub fn offsets(&self, code: u8) -> &[isize] {
        &self.offsets[code as usize]
    }
}
