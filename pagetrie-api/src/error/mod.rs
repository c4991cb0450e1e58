//! Error handling module for the page table

use core::fmt;

/// Common error type used throughout the page table crates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The frame allocator has no frames left
    OutOfMemory,
    /// Invalid argument
    InvalidArgument(&'static str),
    /// A frame number outside the range an allocator or memory manages
    FrameOutOfRange(u64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::FrameOutOfRange(ppn) => write!(f, "Frame out of range: {:#x}", ppn),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Creates a new invalid argument error
pub fn invalid_argument(msg: &'static str) -> Error {
    Error::InvalidArgument(msg)
}
