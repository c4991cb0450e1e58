//! Physical memory access
//!
//! Two translators live here. [`DirectMap`] is the usual kernel arrangement,
//! where all of physical memory is visible through a linear window at a fixed
//! virtual offset. [`SimPhysMemory`] stands in for RAM itself: a heap buffer
//! of page-aligned frames, so the page table can run and be tested in an
//! ordinary process.

use core::ptr::NonNull;

use static_assertions::assert_not_impl_any;

use pagetrie_api::{PhysAddr, PhysToVirt};

#[cfg(feature = "alloc")]
pub use self::sim::SimPhysMemory;

/// Linear physical-to-virtual window: `virt = phys + offset`.
///
/// Not `Clone`: each value is the one translator allowed to write the frames
/// it was created for. Lend it out as `&mut DirectMap` instead.
#[derive(Debug, PartialEq, Eq)]
pub struct DirectMap {
    offset: usize,
}

assert_not_impl_any!(DirectMap: Clone, Copy);

impl DirectMap {
    /// Creates a translator for a direct map starting at `offset`.
    ///
    /// # Safety
    ///
    /// Every physical frame the page table can reach (the root, every node
    /// frame handed out by its allocator, and every frame number already
    /// stored in those nodes) must be mapped read/write at `phys + offset`,
    /// and that sum must never be zero. No other code may mutate those frames
    /// while the page table is in use through this translator.
    pub const unsafe fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Virtual address of physical address zero.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

unsafe impl PhysToVirt for DirectMap {
    fn phys_to_virt(&self, pa: PhysAddr) -> NonNull<u8> {
        let va = (pa.as_u64() as usize).wrapping_add(self.offset);
        // SAFETY: the contract of `DirectMap::new` rules out a null result.
        unsafe { NonNull::new_unchecked(va as *mut u8) }
    }
}

#[cfg(feature = "alloc")]
mod sim {
    use alloc::boxed::Box;
    use core::ops::Range;
    use core::ptr::{self, NonNull};

    use pagetrie_api::{Error, PhysAddr, PhysToVirt, Result, PAGE_SIZE};

    use crate::allocator::BumpFrameAllocator;

    #[repr(C, align(4096))]
    struct Frame([u8; PAGE_SIZE as usize]);

    impl Frame {
        const ZERO: Self = Self([0; PAGE_SIZE as usize]);
    }

    /// Simulated physical memory covering frames `base_ppn..base_ppn + frames`.
    ///
    /// All frames start zeroed. Translating an address outside the covered
    /// range panics, the simulated counterpart of a bus error.
    pub struct SimPhysMemory {
        base: NonNull<Frame>,
        base_ppn: u64,
        frames: usize,
    }

    // SAFETY: the buffer is owned exclusively by this value. Shared access
    // only reads; the page table writes through it only while holding
    // `&mut SimPhysMemory`.
    unsafe impl Send for SimPhysMemory {}
    unsafe impl Sync for SimPhysMemory {}

    impl SimPhysMemory {
        /// Allocates `frames` zeroed frames numbered from `base_ppn`.
        pub fn new(base_ppn: u64, frames: usize) -> Self {
            let buffer: Box<[Frame]> = (0..frames).map(|_| Frame::ZERO).collect();
            let base = NonNull::from(Box::leak(buffer)).cast::<Frame>();
            Self { base, base_ppn, frames }
        }

        /// First frame number covered.
        pub fn base_ppn(&self) -> u64 {
            self.base_ppn
        }

        /// Number of frames covered.
        pub fn frame_count(&self) -> usize {
            self.frames
        }

        /// Frame numbers covered.
        pub fn ppn_range(&self) -> Range<u64> {
            self.base_ppn..self.base_ppn + self.frames as u64
        }

        /// Whether frame `ppn` is backed by this memory.
        pub fn contains(&self, ppn: u64) -> bool {
            self.ppn_range().contains(&ppn)
        }

        /// A bump allocator handing out every frame of this memory in order.
        pub fn frame_allocator(&self) -> BumpFrameAllocator {
            let range = self.ppn_range();
            BumpFrameAllocator::new(range.start, range.end)
        }

        /// Reads the 64-bit word at `pa`, which must be 8-byte aligned.
        pub fn read_u64(&self, pa: PhysAddr) -> u64 {
            let ptr = self.word(pa);
            // SAFETY: `word` checked range and alignment.
            unsafe { ptr.read() }
        }

        /// Writes the 64-bit word at `pa`, which must be 8-byte aligned.
        pub fn write_u64(&mut self, pa: PhysAddr, value: u64) {
            let ptr = self.word(pa);
            // SAFETY: as in `read_u64`, and `&mut self` excludes other access.
            unsafe { ptr.write(value) }
        }

        /// Clears frame `ppn` so it can be handed out again.
        pub fn zero_frame(&mut self, ppn: u64) -> Result<()> {
            if !self.contains(ppn) {
                return Err(Error::FrameOutOfRange(ppn));
            }
            let frame = self.frame_ptr(ppn);
            // SAFETY: `frame` is in bounds and `&mut self` excludes other access.
            unsafe { frame.write(Frame::ZERO) };
            Ok(())
        }

        fn word(&self, pa: PhysAddr) -> NonNull<u64> {
            assert!(pa.as_u64() % 8 == 0, "unaligned physical word {:#x}", pa.as_u64());
            self.phys_to_virt(pa).cast::<u64>()
        }

        fn frame_ptr(&self, ppn: u64) -> NonNull<Frame> {
            assert!(
                self.contains(ppn),
                "physical frame {:#x} outside simulated memory {:#x}..{:#x}",
                ppn,
                self.base_ppn,
                self.base_ppn + self.frames as u64
            );
            // SAFETY: the frame index is below `self.frames`.
            unsafe { self.base.add((ppn - self.base_ppn) as usize) }
        }
    }

    unsafe impl PhysToVirt for SimPhysMemory {
        fn phys_to_virt(&self, pa: PhysAddr) -> NonNull<u8> {
            let frame = self.frame_ptr(pa.page_number());
            // SAFETY: a page offset stays inside its 4096-byte frame.
            unsafe { frame.cast::<u8>().add(pa.page_offset() as usize) }
        }
    }

    impl Drop for SimPhysMemory {
        fn drop(&mut self) {
            let buffer = ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.frames);
            // SAFETY: `buffer` is exactly the slice leaked in `new`.
            unsafe { drop(Box::from_raw(buffer)) };
        }
    }

    impl core::fmt::Debug for SimPhysMemory {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.debug_struct("SimPhysMemory")
                .field("base_ppn", &self.base_ppn)
                .field("frames", &self.frames)
                .finish()
        }
    }
}
