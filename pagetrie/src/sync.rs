//! Lock-protected page table
//!
//! [`update`](crate::update) and [`query`](crate::query) do no locking. Two
//! unsynchronized writers can both find an empty interior slot, both allocate,
//! and the later link silently drops the earlier node with whatever was
//! mapped beneath it. [`LockedPageTable`] puts one reader/writer lock around
//! each table: lookups share the lock, mutations hold it exclusively.

use spin::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pagetrie_api::{FrameAllocator, PhysAddr, PhysToVirt, Result, VirtAddr};

use crate::page_table::{PageTable, TrieCensus};

/// A [`PageTable`] behind a spinning reader/writer lock.
pub struct LockedPageTable<P, A> {
    inner: RwLock<PageTable<P, A>>,
}

impl<P: PhysToVirt, A: FrameAllocator> LockedPageTable<P, A> {
    /// Wraps `table`.
    pub const fn new(table: PageTable<P, A>) -> Self {
        Self { inner: RwLock::new(table) }
    }

    /// Frame number of the root node.
    pub fn root_ppn(&self) -> u64 {
        self.inner.read().root_ppn()
    }

    /// Maps `vpn` to `ppn` under the write lock.
    pub fn map(&self, vpn: u64, ppn: u64) -> Result<()> {
        self.inner.write().map(vpn, ppn)
    }

    /// Removes the mapping for `vpn` under the write lock.
    pub fn unmap(&self, vpn: u64) -> Result<()> {
        self.inner.write().unmap(vpn)
    }

    /// Physical page number mapped at `vpn`, under the read lock.
    pub fn lookup(&self, vpn: u64) -> Option<u64> {
        self.inner.read().lookup(vpn)
    }

    /// Translates a full virtual address under the read lock.
    pub fn translate(&self, va: VirtAddr) -> Option<PhysAddr> {
        self.inner.read().translate(va)
    }

    /// Node and mapping counts, under the read lock.
    pub fn census(&self) -> TrieCensus {
        self.inner.read().census()
    }

    /// Shared access for several lookups under one read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, PageTable<P, A>> {
        self.inner.read()
    }

    /// Exclusive access for a batch of mutations under one write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, PageTable<P, A>> {
        self.inner.write()
    }

    /// Unwraps the table.
    pub fn into_inner(self) -> PageTable<P, A> {
        self.inner.into_inner()
    }
}
