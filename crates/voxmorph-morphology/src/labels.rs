//! Transient label alphabet shared by the filter phases.
//!
//! A volume entering or leaving a filter holds only [`BACKGROUND`] and
//! [`FOREGROUND`]; the other two values are scratch states that exist only
//! between the phases of a single invocation.

/// Label of voxels outside the mask.
pub const BACKGROUND: u8 = 0;

/// Label of confirmed foreground voxels.
pub const FOREGROUND: u8 = 1;

/// Scratch label marking an edge voxel awaiting a fill pass.
pub const EDGE: u8 = 2;

/// Scratch label inscribed over voxels the constraint mask protects.
pub const MASKED: u8 = 255;
