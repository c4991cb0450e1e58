//! Pagetrie
//!
//! A five-level radix-trie page table mapping 45-bit virtual page numbers to
//! 52-bit physical page numbers. Interior nodes are allocated on demand and
//! every node is reached through an injected physical-to-virtual translator,
//! so the same code runs against a kernel direct map or simulated memory.
//!
//! ```rust
//! use pagetrie::{query, update, SimPhysMemory, FrameAllocator, NO_MAPPING};
//!
//! let mut mem = SimPhysMemory::new(0x100, 16);
//! let mut frames = mem.frame_allocator();
//! let root = frames.alloc_frame().unwrap();
//!
//! update(&mut mem, &mut frames, root, 0x1A2B3C4D5, 0x77).unwrap();
//! assert_eq!(query(&mem, root, 0x1A2B3C4D5), 0x77);
//! assert_eq!(query(&mem, root, 0x1A2B3C4D6), NO_MAPPING);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Re-export API types
pub use pagetrie_api::*;

#[macro_use]
mod logging;

pub mod allocator;
pub mod page_table;
pub mod physical;
pub mod pte;
pub mod sync;

// Re-export commonly used types and functions
pub use allocator::{AllocatorStats, BumpFrameAllocator};
#[cfg(feature = "alloc")]
pub use allocator::FrameStackAllocator;
pub use page_table::{census, query, update, PageTable, TrieCensus};
pub use physical::DirectMap;
#[cfg(feature = "alloc")]
pub use physical::SimPhysMemory;
pub use pte::{Pte, PteFlags, Slot};
pub use sync::LockedPageTable;
