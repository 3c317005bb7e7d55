use voxmorph_volume::VolumeError;

/// An error type for the morphology filters.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// Error when a radius exceeds the supported range.
    #[error("The radius ({0}) is too large, maximum is 254")]
    RadiusTooLarge(u8),

    /// Error when a stepwise filter is asked to run zero passes.
    #[error("The radius needs to be larger than or equal to one")]
    ZeroRadius,

    /// Error when the constraint mask extent does not match the volume.
    #[error("Constraint mask extent ({0}) does not match the volume extent ({1})")]
    MaskSizeMismatch(String, String),

    /// Error when a pattern buffer cannot be allocated.
    #[error("Could not allocate enough memory ({0} bytes requested)")]
    OutOfMemory(usize),

    /// Error bubbled up from the volume crate.
    #[error(transparent)]
    Volume(#[from] VolumeError),
}
