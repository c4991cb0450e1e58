//! Pagetrie API - Core interfaces and types for the radix-trie page table
//!
//! This crate provides the types and collaborator interfaces shared by the
//! page table implementation and the code that embeds it. The page table
//! itself lives in the `pagetrie` crate and depends only on what is
//! declared here.
//!
//! # Architecture
//!
//! - **Address**: Physical/virtual address newtypes and trie geometry
//! - **Error**: The error taxonomy and `Result` alias
//! - **Memory**: The frame allocator and physical-access translator traits
//!
//! # Usage
//!
//! ```rust
//! use pagetrie_api::{FrameAllocator, Error, Result};
//!
//! struct OneShot(Option<u64>);
//!
//! impl FrameAllocator for OneShot {
//!     fn alloc_frame(&mut self) -> Result<u64> {
//!         self.0.take().ok_or(Error::OutOfMemory)
//!     }
//! }
//!
//! let mut frames = OneShot(Some(7));
//! assert_eq!(frames.alloc_frame().unwrap(), 7);
//! assert!(frames.alloc_frame().is_err());
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod error;
pub mod memory;

// Re-export commonly used types
pub use crate::address::{
    PhysAddr, VirtAddr, PAGE_SIZE, PAGE_SHIFT, VPN_BITS, PPN_BITS, BITS_PER_LEVEL, TRIE_LEVELS,
    ENTRIES_PER_NODE, NO_MAPPING, VPN_MASK, PPN_MASK, is_valid_vpn, is_valid_ppn, vpn_indices,
};
pub use crate::error::{invalid_argument, Error, Result};
pub use crate::memory::interface::{FrameAllocator, PhysToVirt};
