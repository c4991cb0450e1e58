//! Property-based tests for the page table trie
//!
//! The trie is compared against a plain map model under arbitrary install /
//! remove sequences. VPNs are drawn from a few index values per level so that
//! generated keys keep sharing path prefixes.

use std::collections::BTreeMap;

use pagetrie::{
    census, query, update, BumpFrameAllocator, FrameAllocator, SimPhysMemory, NO_MAPPING,
};
use proptest::prelude::*;

const MAX_VPN: u64 = (1 << 45) - 1;
const MAX_PPN: u64 = (1 << 52) - 1;

fn fresh_table(frames: usize) -> (SimPhysMemory, BumpFrameAllocator, u64) {
    let mem = SimPhysMemory::new(0x8000, frames);
    let mut alloc = mem.frame_allocator();
    let root = alloc.alloc_frame().unwrap();
    (mem, alloc, root)
}

/// VPNs whose per-level indices come from a small alphabet, plus the top index
fn arb_clustered_vpn() -> impl Strategy<Value = u64> {
    prop::array::uniform5(prop_oneof![Just(0u64), Just(1), Just(511)])
        .prop_map(|indices| indices.iter().fold(0, |vpn, &index| (vpn << 9) | index))
}

fn arb_vpn() -> impl Strategy<Value = u64> {
    prop_oneof![0..=MAX_VPN, arb_clustered_vpn()]
}

#[derive(Debug, Clone)]
enum Op {
    Install(u64, u64),
    Remove(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_clustered_vpn(), 0..=MAX_PPN).prop_map(|(vpn, ppn)| Op::Install(vpn, ppn)),
        1 => arb_clustered_vpn().prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn install_then_query_roundtrip(vpn in arb_vpn(), ppn in 0..=MAX_PPN) {
        let (mut mem, mut alloc, root) = fresh_table(8);
        update(&mut mem, &mut alloc, root, vpn, ppn).unwrap();
        prop_assert_eq!(query(&mem, root, vpn), ppn);
    }

    #[test]
    fn remove_then_query_is_absent(
        vpn in arb_vpn(),
        ppn in 0..=MAX_PPN,
        installed in any::<bool>(),
    ) {
        let (mut mem, mut alloc, root) = fresh_table(8);
        if installed {
            update(&mut mem, &mut alloc, root, vpn, ppn).unwrap();
        }
        update(&mut mem, &mut alloc, root, vpn, NO_MAPPING).unwrap();
        prop_assert_eq!(query(&mem, root, vpn), NO_MAPPING);
    }

    #[test]
    fn removing_absent_mapping_allocates_nothing(vpn in arb_vpn(), other in arb_vpn()) {
        prop_assume!(vpn != other);
        let (mut mem, mut alloc, root) = fresh_table(8);
        update(&mut mem, &mut alloc, root, other, 0x1).unwrap();
        let before = alloc.stats();

        update(&mut mem, &mut alloc, root, vpn, NO_MAPPING).unwrap();
        prop_assert_eq!(alloc.stats(), before);
        prop_assert_eq!(query(&mem, root, other), 0x1);
    }

    #[test]
    fn install_does_not_disturb_other_vpns(
        vpn1 in arb_vpn(),
        vpn2 in arb_vpn(),
        ppn1 in 0..=MAX_PPN,
        ppn2 in prop::option::of(0..=MAX_PPN),
    ) {
        prop_assume!(vpn1 != vpn2);
        let (mut mem, mut alloc, root) = fresh_table(16);
        if let Some(ppn2) = ppn2 {
            update(&mut mem, &mut alloc, root, vpn2, ppn2).unwrap();
        }
        let expected = query(&mem, root, vpn2);

        update(&mut mem, &mut alloc, root, vpn1, ppn1).unwrap();
        prop_assert_eq!(query(&mem, root, vpn2), expected);
        prop_assert_eq!(query(&mem, root, vpn1), ppn1);
    }

    #[test]
    fn overwrite_allocates_nothing(vpn in arb_vpn(), first in 0..=MAX_PPN, second in 0..=MAX_PPN) {
        let (mut mem, mut alloc, root) = fresh_table(8);
        update(&mut mem, &mut alloc, root, vpn, first).unwrap();
        let before = alloc.stats();

        update(&mut mem, &mut alloc, root, vpn, second).unwrap();
        prop_assert_eq!(alloc.stats(), before);
        prop_assert_eq!(query(&mem, root, vpn), second);
    }

    #[test]
    fn trie_matches_map_model(ops in prop::collection::vec(arb_op(), 1..48)) {
        // Clustered VPNs use at most 3 + 9 + 27 + 81 interior nodes.
        let (mut mem, mut alloc, root) = fresh_table(1 + 3 + 9 + 27 + 81);
        let mut model = BTreeMap::new();

        for op in &ops {
            match *op {
                Op::Install(vpn, ppn) => {
                    update(&mut mem, &mut alloc, root, vpn, ppn).unwrap();
                    model.insert(vpn, ppn);
                }
                Op::Remove(vpn) => {
                    update(&mut mem, &mut alloc, root, vpn, NO_MAPPING).unwrap();
                    model.remove(&vpn);
                }
            }
        }

        for op in &ops {
            let vpn = match *op {
                Op::Install(vpn, _) | Op::Remove(vpn) => vpn,
            };
            let expected = model.get(&vpn).copied().unwrap_or(NO_MAPPING);
            prop_assert_eq!(query(&mem, root, vpn), expected);
        }
        prop_assert_eq!(census(&mem, root).mappings, model.len());
    }
}
