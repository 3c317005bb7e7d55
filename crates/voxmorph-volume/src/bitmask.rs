use num_traits::{One, Zero};
use rayon::prelude::*;

use crate::error::VolumeError;
use crate::volume::{VolumeSize, VoxelVolume};

/// Represents one binary mask stored in a shared bit-plane volume.
///
/// Up to eight masks share a single byte-per-voxel plane; each mask owns one
/// bit (`0..8`) of every byte. Converting between this packed form and a
/// dense label volume is how data enters and leaves the morphology filters.
#[derive(Clone, Debug, PartialEq)]
pub struct BitMaskVolume {
    size: VolumeSize,
    data: Vec<u8>,
    bit: u8,
}

impl BitMaskVolume {
    /// Create a mask view over an existing bit-plane buffer.
    ///
    /// # Arguments
    ///
    /// * `size` - The extent of the plane in voxels.
    /// * `data` - The shared plane, one byte per voxel.
    /// * `bit` - Which bit of each byte belongs to this mask, in `0..8`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length does not match the extent or the
    /// bit index is out of range.
    pub fn new(size: VolumeSize, data: Vec<u8>, bit: u8) -> Result<Self, VolumeError> {
        if data.len() != size.len() {
            return Err(VolumeError::InvalidLength(data.len(), size.len()));
        }
        if bit >= 8 {
            return Err(VolumeError::InvalidBit(bit));
        }

        Ok(Self { size, data, bit })
    }

    /// Create a mask over a fresh all-zero plane.
    pub fn from_size(size: VolumeSize, bit: u8) -> Result<Self, VolumeError> {
        if bit >= 8 {
            return Err(VolumeError::InvalidBit(bit));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(size.len())
            .map_err(|_| VolumeError::OutOfMemory(size.len()))?;
        data.resize(size.len(), 0u8);

        Ok(Self { size, data, bit })
    }

    /// The extent of the plane in voxels.
    pub fn size(&self) -> VolumeSize {
        self.size
    }

    /// The bit index this mask occupies.
    pub fn bit(&self) -> u8 {
        self.bit
    }

    /// The byte value with only this mask's bit set.
    #[inline]
    pub fn mask_value(&self) -> u8 {
        1 << self.bit
    }

    /// The shared plane as a flat slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Whether this mask's bit is set at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn bit_at(&self, x: usize, y: usize, z: usize) -> bool {
        self.bit_at_index(self.size.index(x, y, z))
    }

    /// Whether this mask's bit is set at a flat voxel index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn bit_at_index(&self, idx: usize) -> bool {
        self.data[idx] & self.mask_value() != 0
    }

    /// Set or clear this mask's bit at `(x, y, z)`, leaving other bits alone.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn set_bit(&mut self, x: usize, y: usize, z: usize, on: bool) {
        let idx = self.size.index(x, y, z);
        let value = self.mask_value();
        if on {
            self.data[idx] |= value;
        } else {
            self.data[idx] &= !value;
        }
    }

    /// Unpack this mask into a dense volume with one (set) or zero (clear)
    /// per voxel.
    ///
    /// Slabs of the plane are processed in parallel; the output ordering is
    /// the usual x-fastest layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxmorph_volume::{BitMaskVolume, VolumeSize};
    ///
    /// let size = VolumeSize { nx: 2, ny: 1, nz: 1 };
    /// let mask = BitMaskVolume::new(size, vec![0b100, 0b000], 2).unwrap();
    /// let labels = mask.unpack::<u8>().unwrap();
    ///
    /// assert_eq!(labels.as_slice(), &[1, 0]);
    /// ```
    pub fn unpack<T>(&self) -> Result<VoxelVolume<T>, VolumeError>
    where
        T: Zero + One + Copy + Send + Sync,
    {
        let mut out = VoxelVolume::from_size_val(self.size, T::zero())?;
        if self.size.is_empty() {
            return Ok(out);
        }

        let value = self.mask_value();
        let slab = self.size.slab();
        out.as_slice_mut()
            .par_chunks_mut(slab)
            .zip(self.data.par_chunks(slab))
            .for_each(|(dst_slab, src_slab)| {
                dst_slab
                    .iter_mut()
                    .zip(src_slab.iter())
                    .for_each(|(dst, src)| {
                        *dst = if src & value != 0 { T::one() } else { T::zero() };
                    });
            });

        Ok(out)
    }

    /// Pack a label volume into this mask's bit of the shared plane.
    ///
    /// Voxels equal to `label` set the bit, all others clear it; bits owned
    /// by sibling masks are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume extent does not match the plane extent.
    pub fn pack_label<T>(&mut self, volume: &VoxelVolume<T>, label: T) -> Result<(), VolumeError>
    where
        T: PartialEq + Copy + Send + Sync,
    {
        if volume.size() != self.size {
            return Err(VolumeError::SizeMismatch(
                volume.size().to_string(),
                self.size.to_string(),
            ));
        }
        if self.size.is_empty() {
            return Ok(());
        }

        let value = self.mask_value();
        let slab = self.size.slab();
        self.data
            .par_chunks_mut(slab)
            .zip(volume.as_slice().par_chunks(slab))
            .for_each(|(mask_slab, label_slab)| {
                mask_slab
                    .iter_mut()
                    .zip(label_slab.iter())
                    .for_each(|(byte, voxel)| {
                        if *voxel == label {
                            *byte |= value;
                        } else {
                            *byte &= !value;
                        }
                    });
            });

        Ok(())
    }
}
