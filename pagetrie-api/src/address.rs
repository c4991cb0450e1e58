//! Address types and trie geometry

use static_assertions::const_assert_eq;

/// Page size (4KB)
pub const PAGE_SIZE: u64 = 4096;
/// Page shift (log2 of PAGE_SIZE)
pub const PAGE_SHIFT: u32 = 12;

/// Width of a virtual page number (57-bit addresses minus the page offset)
pub const VPN_BITS: u32 = 45;
/// Width of a physical page number (64-bit entries minus the flag bits)
pub const PPN_BITS: u32 = 52;
/// Index bits consumed per trie level
pub const BITS_PER_LEVEL: u32 = 9;
/// Depth of the trie
pub const TRIE_LEVELS: usize = 5;
/// Number of 64-bit entries held by one trie node
pub const ENTRIES_PER_NODE: usize = 1 << BITS_PER_LEVEL;

/// Reserved physical page number meaning "no mapping".
///
/// Passed to an update it requests removal; returned from a query it reports
/// absence. Every bit above `PPN_BITS` is set, so it never collides with a
/// real frame.
pub const NO_MAPPING: u64 = u64::MAX;

const_assert_eq!(VPN_BITS, BITS_PER_LEVEL * TRIE_LEVELS as u32);
const_assert_eq!(ENTRIES_PER_NODE * core::mem::size_of::<u64>(), PAGE_SIZE as usize);
const_assert_eq!(PPN_BITS + PAGE_SHIFT, 64);

/// Mask selecting the valid bits of a virtual page number
pub const VPN_MASK: u64 = (1 << VPN_BITS) - 1;
/// Mask selecting the valid bits of a physical page number
pub const PPN_MASK: u64 = (1 << PPN_BITS) - 1;

/// Whether `vpn` fits in a virtual page number
#[inline]
pub const fn is_valid_vpn(vpn: u64) -> bool {
    vpn & !VPN_MASK == 0
}

/// Whether `ppn` fits in a physical page number
#[inline]
pub const fn is_valid_ppn(ppn: u64) -> bool {
    ppn & !PPN_MASK == 0
}

/// A physical address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysAddr(pub u64);

impl PhysAddr {
    /// Creates a new physical address from a raw value.
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the base address of physical frame `ppn`.
    pub const fn from_ppn(ppn: u64) -> Self {
        Self(ppn << PAGE_SHIFT)
    }

    /// Returns the physical address as a raw value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the offset within the current page.
    pub const fn page_offset(self) -> u64 {
        self.0 & (PAGE_SIZE - 1)
    }

    /// Returns the page number for this physical address.
    pub const fn page_number(self) -> u64 {
        self.0 >> PAGE_SHIFT
    }
}

impl From<u64> for PhysAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl From<PhysAddr> for u64 {
    fn from(addr: PhysAddr) -> Self {
        addr.0
    }
}

/// A virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw value.
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the virtual address as a raw value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the offset within the current page.
    pub const fn page_offset(self) -> u64 {
        self.0 & (PAGE_SIZE - 1)
    }

    /// Returns the page number for this virtual address.
    pub const fn page_number(self) -> u64 {
        self.0 >> PAGE_SHIFT
    }
}

impl From<u64> for VirtAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl From<VirtAddr> for u64 {
    fn from(addr: VirtAddr) -> Self {
        addr.0
    }
}

/// Splits a virtual page number into its per-level node indices.
///
/// Level 1 (the root) consumes the most-significant 9 bits. Bits above
/// `VPN_BITS` are ignored.
#[inline]
pub const fn vpn_indices(vpn: u64) -> [usize; TRIE_LEVELS] {
    let mut indices = [0usize; TRIE_LEVELS];
    let mut level = 0;
    while level < TRIE_LEVELS {
        let shift = VPN_BITS - BITS_PER_LEVEL * (level as u32 + 1);
        indices[level] = ((vpn >> shift) & (ENTRIES_PER_NODE as u64 - 1)) as usize;
        level += 1;
    }
    indices
}
