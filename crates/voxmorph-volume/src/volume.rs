use crate::error::VolumeError;

/// Volume extent in voxels
///
/// A struct to represent the extent of a voxel grid along each axis.
///
/// # Examples
///
/// ```
/// use voxmorph_volume::VolumeSize;
///
/// let size = VolumeSize {
///   nx: 64,
///   ny: 64,
///   nz: 32,
/// };
///
/// assert_eq!(size.len(), 64 * 64 * 32);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeSize {
    /// Number of voxels along the x axis (fastest varying).
    pub nx: usize,
    /// Number of voxels along the y axis.
    pub ny: usize,
    /// Number of voxels along the z axis (slowest varying).
    pub nz: usize,
}

impl VolumeSize {
    /// Total number of voxels in the volume.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Returns true if any axis has zero extent.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of voxels in one z-slice (`nx * ny`).
    pub fn slab(&self) -> usize {
        self.nx * self.ny
    }

    /// Linear index of the voxel at `(x, y, z)`, x fastest.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.nx + z * self.nx * self.ny
    }
}

impl std::fmt::Display for VolumeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "VolumeSize {{ nx: {}, ny: {}, nz: {} }}",
            self.nx, self.ny, self.nz
        )
    }
}

impl From<[usize; 3]> for VolumeSize {
    fn from(size: [usize; 3]) -> Self {
        VolumeSize {
            nx: size[0],
            ny: size[1],
            nz: size[2],
        }
    }
}

/// Represents a dense voxel volume.
///
/// The volume is a flat contiguous buffer in row-major order with x fastest,
/// then y, then z: `index = x + y * nx + z * nx * ny`.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelVolume<T> {
    size: VolumeSize,
    data: Vec<T>,
}

/// Binary label volume used by the morphology filters.
pub type LabelVolume = VoxelVolume<u8>;

impl<T> VoxelVolume<T> {
    /// Create a new volume from voxel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The extent of the volume in voxels.
    /// * `data` - The voxel data, length `nx * ny * nz`.
    ///
    /// # Errors
    ///
    /// If the length of the data does not match the extent, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxmorph_volume::{VolumeSize, VoxelVolume};
    ///
    /// let volume = VoxelVolume::<u8>::new(
    ///     VolumeSize { nx: 4, ny: 3, nz: 2 },
    ///     vec![0u8; 4 * 3 * 2],
    /// ).unwrap();
    ///
    /// assert_eq!(volume.size().nx, 4);
    /// assert_eq!(volume.as_slice().len(), 24);
    /// ```
    pub fn new(size: VolumeSize, data: Vec<T>) -> Result<Self, VolumeError> {
        if data.len() != size.len() {
            return Err(VolumeError::InvalidLength(data.len(), size.len()));
        }

        Ok(Self { size, data })
    }

    /// Create a new volume filled with a single value.
    ///
    /// The backing buffer is reserved fallibly, so an oversized request
    /// surfaces as [`VolumeError::OutOfMemory`] instead of aborting.
    pub fn from_size_val(size: VolumeSize, val: T) -> Result<Self, VolumeError>
    where
        T: Clone,
    {
        let mut data = Vec::new();
        data.try_reserve_exact(size.len())
            .map_err(|_| VolumeError::OutOfMemory(size.len() * std::mem::size_of::<T>()))?;
        data.resize(size.len(), val);

        Ok(Self { size, data })
    }

    /// The extent of the volume in voxels.
    pub fn size(&self) -> VolumeSize {
        self.size
    }

    /// The voxel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The voxel data as a mutable flat slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the volume and return the backing buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the voxel at `(x, y, z)`, or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        if x >= self.size.nx || y >= self.size.ny || z >= self.size.nz {
            return None;
        }
        self.data.get(self.size.index(x, y, z))
    }

    /// Set the voxel at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, val: T) {
        let idx = self.size.index(x, y, z);
        self.data[idx] = val;
    }
}
