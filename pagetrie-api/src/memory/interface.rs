//! Memory management interface
//!
//! The page table never owns physical memory. It reaches frames through two
//! collaborators supplied by the embedding kernel or runtime: a frame
//! allocator for new trie nodes and a translator that turns a physical
//! address into something the current code can dereference.

use core::ptr::NonNull;

use crate::address::PhysAddr;
use crate::error::Result;

/// Trait for physical frame allocators
///
/// Implementations must hand out frames that are not in use elsewhere and
/// whose contents read as zero. A freshly linked trie node relies on this:
/// every one of its 512 entries has to decode as empty.
#[cfg_attr(test, mockall::automock)]
pub trait FrameAllocator {
    /// Allocates one zeroed frame and returns its physical page number
    fn alloc_frame(&mut self) -> Result<u64>;
}

impl<A: FrameAllocator + ?Sized> FrameAllocator for &mut A {
    fn alloc_frame(&mut self) -> Result<u64> {
        (**self).alloc_frame()
    }
}

/// Trait for physical-to-virtual translation
///
/// # Safety
///
/// For any physical address inside a frame the caller is entitled to access,
/// `phys_to_virt` must return a pointer to that byte which is valid for reads
/// and writes up to the end of its 4 KiB frame, be 8-byte aligned when `pa`
/// is, and stay valid for as long as the translator itself is alive.
/// Distinct frames must never translate to overlapping memory. Addresses the
/// translator cannot serve must panic rather than return a dangling pointer.
///
/// The page table only writes through a translator it holds by `&mut`, so
/// implementations must not hand the same frames to another live translator.
pub unsafe trait PhysToVirt {
    /// Translates a physical address into a dereferenceable pointer
    fn phys_to_virt(&self, pa: PhysAddr) -> NonNull<u8>;
}

unsafe impl<T: PhysToVirt + ?Sized> PhysToVirt for &mut T {
    fn phys_to_virt(&self, pa: PhysAddr) -> NonNull<u8> {
        (**self).phys_to_virt(pa)
    }
}
