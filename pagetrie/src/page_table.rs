//! Five-level radix-trie page table with lazy allocation of interior nodes.
//!
//! The table maps 45-bit virtual page numbers to 52-bit physical page
//! numbers. Each node is one physical frame of 512 entries indexed by 9 bits
//! of the VPN, most-significant field at the root. Nodes are named by frame
//! number and are only ever touched through a [`PhysToVirt`] translator.
//!
//! [`update`] and [`query`] are the raw entry points and speak the
//! [`NO_MAPPING`] sentinel. [`PageTable`] bundles a root with its
//! collaborators and offers a checked, `Option`-based surface on top.

use core::marker::PhantomData;
use core::ptr::NonNull;

use pagetrie_api::{
    invalid_argument, is_valid_ppn, is_valid_vpn, vpn_indices, FrameAllocator, PhysAddr,
    PhysToVirt, Result, VirtAddr, ENTRIES_PER_NODE, NO_MAPPING, PAGE_SHIFT, TRIE_LEVELS,
};

use crate::pte::{Pte, Slot};

/// Level of the terminal nodes holding leaf mappings
const LEAF_LEVEL: usize = TRIE_LEVELS;

/// One trie node reached through the translator.
struct Node<'a> {
    entries: NonNull<Pte>,
    _translator: PhantomData<&'a ()>,
}

impl<'a> Node<'a> {
    fn at<P: PhysToVirt + ?Sized>(phys: &'a P, ppn: u64) -> Self {
        Self {
            entries: phys.phys_to_virt(PhysAddr::from_ppn(ppn)).cast::<Pte>(),
            _translator: PhantomData,
        }
    }

    fn slot(&self, level: usize, index: usize) -> Slot {
        debug_assert!(index < ENTRIES_PER_NODE);
        // SAFETY: `PhysToVirt` guarantees the frame base is valid for reads
        // of the whole frame, and `index` selects one of its 512 words.
        unsafe { self.entries.add(index).read() }.decode(level)
    }

    fn set_slot(&self, index: usize, slot: Slot) {
        debug_assert!(index < ENTRIES_PER_NODE);
        // SAFETY: as in `slot`; callers hold exclusive access to the
        // translator, so no other reference observes this write.
        unsafe { self.entries.add(index).write(slot.encode()) }
    }
}

/// Walks the interior levels of the trie for `vpn`.
///
/// `on_empty` is called for every interior slot found empty. It returns the
/// frame to link there, or `None` to abandon the walk. On success the leaf
/// node and the index of the terminal slot are returned.
fn walk<'a, P, F>(
    phys: &'a P,
    root_ppn: u64,
    vpn: u64,
    mut on_empty: F,
) -> Result<Option<(Node<'a>, usize)>>
where
    P: PhysToVirt + ?Sized,
    F: FnMut(usize, usize) -> Result<Option<u64>>,
{
    let indices = vpn_indices(vpn);
    let mut node = Node::at(phys, root_ppn);
    for (depth, &index) in indices[..LEAF_LEVEL - 1].iter().enumerate() {
        let level = depth + 1;
        let child = match node.slot(level, index).child() {
            Some(child) => child,
            None => match on_empty(level, index)? {
                Some(child) => {
                    node.set_slot(index, Slot::Child(child));
                    child
                }
                None => return Ok(None),
            },
        };
        pt_trace!("vpn {:#x}: level {} slot {:#x} -> frame {:#x}", vpn, level, index, child);
        node = Node::at(phys, child);
    }
    Ok(Some((node, indices[LEAF_LEVEL - 1])))
}

/// Installs, overwrites or removes the mapping for `vpn`.
///
/// With `ppn == NO_MAPPING` the terminal entry is cleared. Removal never
/// allocates: if an interior node on the path is missing the mapping is
/// already absent and the call returns at once. Otherwise every missing
/// interior node is allocated from `frames` and linked, up to four per call.
/// Nodes are never freed.
///
/// `root_ppn` must name an allocated node frame (all zero before first use)
/// and frames from `frames` must be zeroed. Bits of `vpn` above 45 and of
/// `ppn` above 52 are not checked here; see [`PageTable::map`].
///
/// # Errors
///
/// Propagates the allocator's error. Nodes linked before the failure stay
/// linked and the previous mapping for `vpn`, if any, is unchanged.
pub fn update<P, A>(phys: &mut P, frames: &mut A, root_ppn: u64, vpn: u64, ppn: u64) -> Result<()>
where
    P: PhysToVirt + ?Sized,
    A: FrameAllocator + ?Sized,
{
    debug_assert!(is_valid_vpn(vpn), "vpn {:#x} wider than 45 bits", vpn);
    debug_assert!(ppn == NO_MAPPING || is_valid_ppn(ppn), "ppn {:#x} wider than 52 bits", ppn);

    let removing = ppn == NO_MAPPING;
    let leaf = walk(&*phys, root_ppn, vpn, |level, index| {
        if removing {
            return Ok(None);
        }
        let frame = frames.alloc_frame().map_err(|err| {
            pt_warn!("vpn {:#x}: no frame for level {} node: {}", vpn, level + 1, err);
            err
        })?;
        pt_debug!(
            "vpn {:#x}: level {} slot {:#x} linked to new node {:#x}",
            vpn,
            level,
            index,
            frame
        );
        Ok(Some(frame))
    })?;

    if let Some((node, index)) = leaf {
        let slot = if removing { Slot::Empty } else { Slot::Leaf(ppn) };
        node.set_slot(index, slot);
    }
    Ok(())
}

/// Resolves `vpn` to its physical page number, or [`NO_MAPPING`].
///
/// Read-only: never writes a node and never allocates.
pub fn query<P>(phys: &P, root_ppn: u64, vpn: u64) -> u64
where
    P: PhysToVirt + ?Sized,
{
    match walk(phys, root_ppn, vpn, |_, _| Ok(None)) {
        Ok(Some((node, index))) => node.slot(LEAF_LEVEL, index).leaf().unwrap_or(NO_MAPPING),
        _ => NO_MAPPING,
    }
}

/// Node and mapping counts of a trie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieCensus {
    /// Interior and terminal nodes below the root
    pub nodes: usize,
    /// Valid leaf entries
    pub mappings: usize,
}

/// Counts the nodes reachable from `root_ppn` and the live mappings they hold.
///
/// Nodes left childless by removals are still counted, since the table never
/// reclaims them.
pub fn census<P>(phys: &P, root_ppn: u64) -> TrieCensus
where
    P: PhysToVirt + ?Sized,
{
    fn visit<P: PhysToVirt + ?Sized>(phys: &P, ppn: u64, level: usize, census: &mut TrieCensus) {
        let node = Node::at(phys, ppn);
        for index in 0..ENTRIES_PER_NODE {
            match node.slot(level, index) {
                Slot::Empty => {}
                Slot::Child(child) => {
                    census.nodes += 1;
                    visit(phys, child, level + 1, census);
                }
                Slot::Leaf(_) => census.mappings += 1,
            }
        }
    }

    let mut census = TrieCensus::default();
    visit(phys, root_ppn, 1, &mut census);
    census
}

/// A page table root together with the collaborators it is walked with.
pub struct PageTable<P, A> {
    phys: P,
    frames: A,
    root_ppn: u64,
}

impl<P: PhysToVirt, A: FrameAllocator> PageTable<P, A> {
    /// Creates an empty table, taking the root node from `frames`.
    pub fn new(phys: P, mut frames: A) -> Result<Self> {
        let root_ppn = frames.alloc_frame()?;
        pt_debug!("new page table at root frame {:#x}", root_ppn);
        Ok(Self { phys, frames, root_ppn })
    }

    /// Adopts an existing table rooted at `root_ppn`.
    pub fn with_root(phys: P, frames: A, root_ppn: u64) -> Self {
        Self { phys, frames, root_ppn }
    }

    /// Frame number of the root node.
    pub fn root_ppn(&self) -> u64 {
        self.root_ppn
    }

    /// The translator used to reach nodes.
    pub fn phys(&self) -> &P {
        &self.phys
    }

    /// The allocator used for new nodes.
    pub fn frames(&self) -> &A {
        &self.frames
    }

    /// Maps `vpn` to `ppn`, replacing any existing mapping.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `vpn` does not fit in 45 bits or `ppn` does not
    /// fit in 52 bits, otherwise whatever the allocator reports.
    pub fn map(&mut self, vpn: u64, ppn: u64) -> Result<()> {
        check_vpn(vpn)?;
        if !is_valid_ppn(ppn) {
            return Err(invalid_argument("ppn wider than 52 bits"));
        }
        update(&mut self.phys, &mut self.frames, self.root_ppn, vpn, ppn)
    }

    /// Removes the mapping for `vpn`, if there is one.
    pub fn unmap(&mut self, vpn: u64) -> Result<()> {
        check_vpn(vpn)?;
        update(&mut self.phys, &mut self.frames, self.root_ppn, vpn, NO_MAPPING)
    }

    /// Physical page number mapped at `vpn`.
    pub fn lookup(&self, vpn: u64) -> Option<u64> {
        if !is_valid_vpn(vpn) {
            return None;
        }
        match query(&self.phys, self.root_ppn, vpn) {
            NO_MAPPING => None,
            ppn => Some(ppn),
        }
    }

    /// Translates a full virtual address, keeping its page offset.
    pub fn translate(&self, va: VirtAddr) -> Option<PhysAddr> {
        let ppn = self.lookup(va.page_number())?;
        Some(PhysAddr::new((ppn << PAGE_SHIFT) | va.page_offset()))
    }

    /// Node and mapping counts of this table.
    pub fn census(&self) -> TrieCensus {
        census(&self.phys, self.root_ppn)
    }

    /// Splits the table into its translator, allocator and root frame.
    pub fn into_parts(self) -> (P, A, u64) {
        (self.phys, self.frames, self.root_ppn)
    }
}

fn check_vpn(vpn: u64) -> Result<()> {
    if is_valid_vpn(vpn) {
        Ok(())
    } else {
        Err(invalid_argument("vpn wider than 45 bits"))
    }
}
