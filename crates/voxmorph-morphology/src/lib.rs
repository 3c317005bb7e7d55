#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the morphology filters.
pub mod error;

/// Stepwise neighborhood dilation and erosion.
pub mod iterative;

/// Label values used on the filter scratch volume.
pub mod labels;

/// Constraint masks restricting where a filter may write.
pub mod mask;

/// Progress reporting and cancellation.
pub mod monitor;

/// Boundary-code neighbor tables and slice planes.
pub mod neighborhood;

/// Filter parameter bundles.
pub mod params;

/// Spherical dilation and erosion.
pub mod smooth;

/// Structuring element rasterization.
pub mod structuring;

pub use crate::error::MorphologyError;
pub use crate::iterative::{iterative_dilate, iterative_dilate_erode, iterative_erode};
pub use crate::mask::MaskConstraint;
pub use crate::monitor::{AbortHandle, FilterMonitor, FilterOutcome, NullMonitor};
pub use crate::neighborhood::{NeighborTable, SlicePlane};
pub use crate::params::{DilateErodeParams, MAX_RADIUS};
pub use crate::smooth::{smooth_dilate, smooth_dilate_erode, smooth_erode, smooth_erode_dilate};
pub use crate::structuring::BallPattern;
