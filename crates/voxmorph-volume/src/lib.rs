#![deny(missing_docs)]
//! Voxel volume types and mask bit-plane conversion

/// Dense voxel volume representation.
pub mod volume;

/// Packed bit-plane mask representation and converters.
pub mod bitmask;

/// Error types for the volume module.
pub mod error;

pub use crate::bitmask::BitMaskVolume;
pub use crate::error::VolumeError;
pub use crate::volume::{LabelVolume, VolumeSize, VoxelVolume};
