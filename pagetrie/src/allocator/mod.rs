//! Frame allocator module
//!
//! Reference implementations of [`FrameAllocator`](pagetrie_api::FrameAllocator)
//! for trie nodes. A kernel would plug its own physical allocator in instead.

pub mod bump;
#[cfg(feature = "alloc")]
pub mod stack;

pub use bump::BumpFrameAllocator;
#[cfg(feature = "alloc")]
pub use stack::FrameStackAllocator;

/// Frame allocator statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Frames handed out so far.
    pub allocated: u64,
    /// Frames still available.
    pub available: u64,
}
