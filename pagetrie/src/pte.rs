//! Page table entries
//!
//! A trie node is 512 raw 64-bit words. Bit 0 is the valid flag and bits
//! 12..63 hold a physical page number; bits 1..11 are padding. The walk never
//! masks these bits itself: it reads a [`Pte`], decodes it into a [`Slot`] for
//! the level it sits on, and encodes a [`Slot`] back when it writes.

use bitflags::bitflags;
use static_assertions::const_assert_eq;

use pagetrie_api::{ENTRIES_PER_NODE, PAGE_SHIFT, PAGE_SIZE, TRIE_LEVELS};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Flags stored in the low 12 bits of an entry.
    pub struct PteFlags: u64 {
        /// The entry holds a child link or a mapping.
        const VALID = 1 << 0;
    }
}

/// Raw 64-bit page table entry as stored in a trie node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Pte(u64);

// The walk indexes a node frame as a `[Pte; ENTRIES_PER_NODE]`.
const_assert_eq!(core::mem::size_of::<Pte>(), 8);
const_assert_eq!(ENTRIES_PER_NODE * core::mem::size_of::<Pte>(), PAGE_SIZE as usize);

impl Pte {
    /// The all-zero entry: nothing mapped, no child node.
    pub const EMPTY: Self = Self(0);

    /// Wraps a raw word read from a node.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw word to store in a node.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Builds a valid entry pointing at `ppn`.
    pub const fn valid(ppn: u64) -> Self {
        Self((ppn << PAGE_SHIFT) | PteFlags::VALID.bits())
    }

    /// Flag bits of this entry.
    pub const fn flags(self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0)
    }

    /// Whether the valid bit is set.
    pub const fn is_valid(self) -> bool {
        self.flags().contains(PteFlags::VALID)
    }

    /// The physical page number held in bits 12..63.
    pub const fn ppn(self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Interprets this entry as a slot of a node at `level` (1 = root).
    pub const fn decode(self, level: usize) -> Slot {
        if !self.is_valid() {
            Slot::Empty
        } else if level < TRIE_LEVELS {
            Slot::Child(self.ppn())
        } else {
            Slot::Leaf(self.ppn())
        }
    }
}

/// Typed view of one node slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// No mapping and no child node below this slot.
    Empty,
    /// Interior slot linking to the child node stored in this frame.
    Child(u64),
    /// Terminal slot mapping to this physical frame.
    Leaf(u64),
}

impl Slot {
    /// Encodes the slot into the word stored in the node.
    pub const fn encode(self) -> Pte {
        match self {
            Slot::Empty => Pte::EMPTY,
            Slot::Child(ppn) | Slot::Leaf(ppn) => Pte::valid(ppn),
        }
    }

    /// Frame of the child node, if this is an interior link.
    pub const fn child(self) -> Option<u64> {
        match self {
            Slot::Child(ppn) => Some(ppn),
            _ => None,
        }
    }

    /// Mapped frame, if this is a terminal mapping.
    pub const fn leaf(self) -> Option<u64> {
        match self {
            Slot::Leaf(ppn) => Some(ppn),
            _ => None,
        }
    }
}

impl From<Slot> for Pte {
    fn from(slot: Slot) -> Self {
        slot.encode()
    }
}
