//! Frame stack allocator
//!
//! Serves frames from an explicit free list, last pushed first out. Useful
//! when node frames are scattered or handed over by another allocator.

use alloc::vec::Vec;

use pagetrie_api::{is_valid_ppn, Error, FrameAllocator, Result};

use super::AllocatorStats;

/// Allocator popping frames from a caller-supplied free list
#[derive(Debug, Clone, Default)]
pub struct FrameStackAllocator {
    free: Vec<u64>,
    allocated: u64,
}

impl FrameStackAllocator {
    /// Create an allocator over `frames`; the last one is handed out first.
    ///
    /// The frames must be zeroed and must not be in use elsewhere.
    ///
    /// # Errors
    ///
    /// `FrameOutOfRange` for a frame number wider than a physical page number.
    pub fn new<I: IntoIterator<Item = u64>>(frames: I) -> Result<Self> {
        let mut stack = Self::default();
        for frame in frames {
            stack.push(frame)?;
        }
        Ok(stack)
    }

    /// Adds a zeroed, unused frame to the free list.
    pub fn push(&mut self, frame: u64) -> Result<()> {
        if !is_valid_ppn(frame) {
            return Err(Error::FrameOutOfRange(frame));
        }
        self.free.push(frame);
        Ok(())
    }

    /// Allocation statistics
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            allocated: self.allocated,
            available: self.free.len() as u64,
        }
    }
}

impl FrameAllocator for FrameStackAllocator {
    fn alloc_frame(&mut self) -> Result<u64> {
        let frame = self.free.pop().ok_or(Error::OutOfMemory)?;
        self.allocated += 1;
        Ok(frame)
    }
}
