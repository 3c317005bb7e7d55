/// An error type for the volume module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VolumeError {
    /// Error when the data length does not match the volume extent.
    #[error("Data length ({0}) does not match the volume extent ({1})")]
    InvalidLength(usize, usize),

    /// Error when a buffer of the requested size cannot be allocated.
    #[error("Could not allocate enough memory ({0} bytes requested)")]
    OutOfMemory(usize),

    /// Error when two volumes that must share an extent do not.
    #[error("Volume extents do not match ({0} vs {1})")]
    SizeMismatch(String, String),

    /// Error when the mask bit index is outside 0..8.
    #[error("Mask bit index ({0}) must be in 0..8")]
    InvalidBit(u8),
}
