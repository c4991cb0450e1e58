//! Bump frame allocator
//!
//! Hands out the frames of a contiguous range in ascending order and never
//! takes any back. Frames are never reused, so if the range starts out
//! zeroed every frame it returns is zeroed too.

use pagetrie_api::{Error, FrameAllocator, Result};

use super::AllocatorStats;

/// Allocator over the frame range `start..end`
#[derive(Debug, Clone)]
pub struct BumpFrameAllocator {
    start: u64,
    next: u64,
    end: u64,
}

impl BumpFrameAllocator {
    /// Create an allocator over `start..end`
    ///
    /// An empty or reversed range yields an allocator that is exhausted from
    /// the start.
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, next: start, end }
    }

    /// Frame that the next allocation will return, if any is left
    pub fn peek(&self) -> Option<u64> {
        (self.next < self.end).then_some(self.next)
    }

    /// Allocation statistics
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            allocated: self.next - self.start,
            available: self.end.saturating_sub(self.next),
        }
    }
}

impl FrameAllocator for BumpFrameAllocator {
    fn alloc_frame(&mut self) -> Result<u64> {
        let Some(frame) = self.peek() else {
            pt_warn!("bump allocator exhausted at frame {:#x}", self.end);
            return Err(Error::OutOfMemory);
        };
        self.next += 1;
        Ok(frame)
    }
}
