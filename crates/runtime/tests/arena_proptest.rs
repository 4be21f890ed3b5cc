//! Property-based tests for the two-pool arena.
//! Live blocks never overlap, and a refused request changes nothing.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use proptest::prelude::*;
use runtime::{Arena, Block, Pool};

const FAST: usize = 256;
const BULK: usize = 4096;

#[derive(Debug, Clone)]
enum Op {
    Allocate { size: usize, align: usize },
    Samples(usize),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0usize..700, prop::sample::select(vec![1usize, 2, 4, 8, 16]))
            .prop_map(|(size, align)| Op::Allocate { size, align }),
        2 => (0usize..200).prop_map(Op::Samples),
        1 => Just(Op::Reset),
    ]
}

fn arena() -> Arena {
    Arena::new(
        Box::leak(vec![0u8; FAST].into_boxed_slice()),
        Box::leak(vec![0u8; BULK].into_boxed_slice()),
    )
}

fn capacity(pool: Pool) -> usize {
    match pool {
        Pool::Fast => FAST,
        Pool::Bulk => BULK,
    }
}

proptest! {
    /// Blocks stay inside their pool and never overlap while live.
    #[test]
    fn live_blocks_are_disjoint(ops in proptest::collection::vec(op(), 0..100)) {
        let mut arena = arena();
        let mut live: Vec<Block> = Vec::new();

        for op in ops {
            let before = arena.usage();
            let (block, size, align) = match op {
                Op::Allocate { size, align } => (arena.allocate_aligned(size, align), size, align),
                Op::Samples(count) => (arena.allocate_samples(count), count * 4, 4),
                Op::Reset => {
                    arena.reset();
                    live.clear();
                    let usage = arena.usage();
                    prop_assert_eq!(usage.fast_used, 0);
                    prop_assert_eq!(usage.bulk_used, 0);
                    continue;
                }
            };

            match block {
                Some(block) => {
                    prop_assert_eq!(block.len(), size);
                    prop_assert!(block.offset() + block.len() <= capacity(block.pool()));
                    prop_assert!(live.iter().all(|other| !other.overlaps(&block)));
                    live.push(block);
                }
                None => {
                    // padding is below `align`, so anything that fits with
                    // worst-case padding must have been placed
                    prop_assert!(size + align - 1 > before.fast_capacity - before.fast_used);
                    prop_assert!(size + align - 1 > before.bulk_capacity - before.bulk_used);
                    prop_assert_eq!(arena.usage(), before);
                }
            }
        }
    }

    /// Writes through one block never show up in another.
    #[test]
    fn blocks_do_not_alias(sizes in proptest::collection::vec(1usize..64, 1..40)) {
        let mut arena = arena();
        let mut blocks = Vec::new();
        for (tag, size) in sizes.into_iter().enumerate() {
            if let Some(block) = arena.allocate(size) {
                arena.bytes_mut(block).fill(tag as u8);
                blocks.push((tag as u8, block));
            }
        }
        for (tag, block) in blocks {
            prop_assert!(arena.bytes(block).iter().all(|b| *b == tag));
        }
    }
}

#[test]
fn samples_fall_through_to_bulk_once_fast_is_full() {
    let mut arena = arena();
    let first = arena.allocate_samples(FAST / 4).unwrap();
    assert_eq!(first.pool(), Pool::Fast);
    let second = arena.allocate_samples(16).unwrap();
    assert_eq!(second.pool(), Pool::Bulk);
    assert!(arena.samples(second).iter().all(|s| *s == 0.0));
}

#[test]
fn board_sized_pools_report_configured_capacity() {
    use platform::config::{BULK_POOL_SIZE, FAST_POOL_SIZE};

    let mut arena = Arena::new(
        Box::leak(vec![0u8; FAST_POOL_SIZE].into_boxed_slice()),
        Box::leak(vec![0u8; BULK_POOL_SIZE].into_boxed_slice()),
    );
    let usage = arena.usage();
    assert_eq!(usage.fast_capacity, FAST_POOL_SIZE);
    assert_eq!(usage.bulk_capacity, BULK_POOL_SIZE);

    // a two-second stereo buffer at 48 kHz only fits in bulk
    let delay = arena.allocate_samples(2 * 2 * 48_000).unwrap();
    assert_eq!(delay.pool(), Pool::Bulk);
}
