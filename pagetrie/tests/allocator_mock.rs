//! Frame allocation accounting tests
//!
//! A mocked allocator pins down exactly how many frames each walk asks for.

use mockall::{mock, Sequence};
use pagetrie::{census, query, update, Error, FrameAllocator, Result, SimPhysMemory, NO_MAPPING};

mock! {
    Frames {}

    impl FrameAllocator for Frames {
        fn alloc_frame(&mut self) -> Result<u64>;
    }
}

const BASE: u64 = 0x200;
const ROOT: u64 = BASE;

/// Memory for the root plus `nodes` interior frames, and a mock handing out
/// frames right after the root.
fn setup(nodes: usize) -> (SimPhysMemory, MockFrames) {
    let mem = SimPhysMemory::new(BASE, nodes + 1);
    (mem, MockFrames::new())
}

fn hand_out_frames(mock: &mut MockFrames, count: usize, first: u64) {
    let mut next = first;
    mock.expect_alloc_frame().times(count).returning(move || {
        let frame = next;
        next += 1;
        Ok(frame)
    });
}

#[test]
fn test_first_install_allocates_four_nodes() {
    let (mut mem, mut frames) = setup(4);
    hand_out_frames(&mut frames, 4, ROOT + 1);

    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, 0x77).unwrap();

    assert_eq!(query(&mem, ROOT, 0x1A2B3C4D5), 0x77);
    assert_eq!(query(&mem, ROOT, 0x1A2B3C4D6), NO_MAPPING);
}

#[test]
fn test_removal_never_allocates() {
    let (mut mem, mut frames) = setup(4);
    frames.expect_alloc_frame().never();

    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, NO_MAPPING).unwrap();
    update(&mut mem, &mut frames, ROOT, 0, NO_MAPPING).unwrap();

    assert_eq!(query(&mem, ROOT, 0x1A2B3C4D5), NO_MAPPING);
}

#[test]
fn test_overwrite_reuses_path() {
    let (mut mem, mut frames) = setup(4);
    hand_out_frames(&mut frames, 4, ROOT + 1);
    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, 0x77).unwrap();
    frames.checkpoint();

    frames.expect_alloc_frame().never();
    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, 0x88).unwrap();
    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, NO_MAPPING).unwrap();
    update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, 0x99).unwrap();

    assert_eq!(query(&mem, ROOT, 0x1A2B3C4D5), 0x99);
}

#[test]
fn test_top_level_split_allocates_two_chains() {
    let (mut mem, mut frames) = setup(8);
    hand_out_frames(&mut frames, 8, ROOT + 1);
    let left = 0x0_0000_1234;
    let right = (1u64 << 36) | 0x0_0000_1234;

    update(&mut mem, &mut frames, ROOT, left, 0xA).unwrap();
    update(&mut mem, &mut frames, ROOT, right, 0xB).unwrap();

    let counts = census(&mem, ROOT);
    assert_eq!(counts.nodes, 8);
    assert_eq!(counts.mappings, 2);
    assert_eq!(query(&mem, ROOT, left), 0xA);
    assert_eq!(query(&mem, ROOT, right), 0xB);
}

#[test]
fn test_partial_extension_counts_only_missing_levels() {
    let (mut mem, mut frames) = setup(7);
    hand_out_frames(&mut frames, 4, ROOT + 1);
    update(&mut mem, &mut frames, ROOT, 0, 0x1).unwrap();
    frames.checkpoint();

    // Diverges in the level-4 node: only a new leaf node is needed.
    hand_out_frames(&mut frames, 1, ROOT + 5);
    update(&mut mem, &mut frames, ROOT, 1 << 9, 0x2).unwrap();
    frames.checkpoint();

    // Diverges in the level-3 node: a level-4 node and a leaf node.
    hand_out_frames(&mut frames, 2, ROOT + 6);
    update(&mut mem, &mut frames, ROOT, 1 << 18, 0x3).unwrap();
    frames.checkpoint();

    assert_eq!(query(&mem, ROOT, 0), 0x1);
    assert_eq!(query(&mem, ROOT, 1 << 9), 0x2);
    assert_eq!(query(&mem, ROOT, 1 << 18), 0x3);
    assert_eq!(census(&mem, ROOT).nodes, 7);
}

#[test]
fn test_allocator_failure_propagates() {
    let (mut mem, mut frames) = setup(4);
    let mut seq = Sequence::new();
    frames
        .expect_alloc_frame()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(ROOT + 1));
    frames
        .expect_alloc_frame()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Err(Error::OutOfMemory));

    let result = update(&mut mem, &mut frames, ROOT, 0x1A2B3C4D5, 0x77);

    assert_eq!(result, Err(Error::OutOfMemory));
    assert_eq!(query(&mem, ROOT, 0x1A2B3C4D5), NO_MAPPING);
    assert_eq!(census(&mem, ROOT).nodes, 1);
}
