//! Two-region bump allocator for app memory.
//!
//! # Memory layout
//!
//! ```text
//! fast pool (internal SRAM)              bulk pool (external SDRAM)
//! ┌──────────┬──────────┬──────────┐      ┌───────────────────┬─────────────┐
//! │ block 0  │ block 1  │   free   │      │ block 2 (samples) │    free     │
//! └──────────┴──────────┴──────────┘      └───────────────────┴─────────────┘
//!            used ──▶                                  used ──▶
//! ```
//!
//! Requests go to the fast pool while they fit, then fall through to the
//! bulk pool. There is no per-block free: [`Arena::reset`] releases
//! everything at once when an app is torn down.
//!
//! Blocks are handles (pool, offset, length) rather than references, so an
//! app can keep several of them in its state and borrow the bytes back from
//! the arena while it runs.

use core::mem::align_of;

/// Which pool a block lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pool {
    /// Small, low-latency memory
    Fast,
    /// Large, slower memory
    Bulk,
}

/// Handle to a reserved byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Block {
    pool: Pool,
    offset: usize,
    len: usize,
}

impl Block {
    /// Pool the block was carved from.
    pub fn pool(&self) -> Pool {
        self.pool
    }

    /// Byte offset from the start of its pool.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` for zero-length blocks.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range within the pool.
    #[allow(clippy::arithmetic_side_effects)] // Safety: offset + len <= pool capacity, checked at reserve
    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len
    }

    /// `true` when both blocks share a pool and any byte.
    pub fn overlaps(&self, other: &Block) -> bool {
        self.pool == other.pool
            && self.range().start < other.range().end
            && other.range().start < self.range().end
    }
}

/// Snapshot of both pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArenaUsage {
    /// Bytes reserved in the fast pool
    pub fast_used: usize,
    /// Fast pool size
    pub fast_capacity: usize,
    /// Bytes reserved in the bulk pool
    pub bulk_used: usize,
    /// Bulk pool size
    pub bulk_capacity: usize,
}

struct Region {
    mem: &'static mut [u8],
    used: usize,
}

impl Region {
    fn new(mem: &'static mut [u8]) -> Self {
        Self { mem, used: 0 }
    }

    fn capacity(&self) -> usize {
        self.mem.len()
    }

    fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.used)
    }

    /// Padding needed so the next block starts on an `align` boundary in
    /// the address space.
    #[allow(clippy::arithmetic_side_effects)] // Safety: align > 0, result < align
    fn padding(&self, align: usize) -> usize {
        let align = align.max(1);
        let addr = (self.mem.as_ptr() as usize).wrapping_add(self.used);
        (align - addr % align) % align
    }

    /// Bytes a request would consume, padding included.
    fn cost(&self, size: usize, align: usize) -> Option<usize> {
        self.padding(align).checked_add(size)
    }

    fn fits(&self, size: usize, align: usize) -> bool {
        self.cost(size, align)
            .is_some_and(|cost| cost <= self.remaining())
    }

    #[allow(clippy::arithmetic_side_effects)] // Safety: guarded by fits()
    fn reserve(&mut self, size: usize, align: usize) -> Option<usize> {
        if !self.fits(size, align) {
            return None;
        }
        let offset = self.used + self.padding(align);
        self.used = offset + size;
        Some(offset)
    }

    fn get(&self, block: &Block) -> &[u8] {
        self.mem.get(block.range()).unwrap_or_default()
    }

    fn get_mut(&mut self, block: &Block) -> &mut [u8] {
        self.mem.get_mut(block.range()).unwrap_or_default()
    }
}

/// Bump allocator over a fast and a bulk pool.
pub struct Arena {
    fast: Region,
    bulk: Region,
}

impl Arena {
    /// Take ownership of the two pools. Either may be empty.
    pub fn new(fast: &'static mut [u8], bulk: &'static mut [u8]) -> Self {
        Self {
            fast: Region::new(fast),
            bulk: Region::new(bulk),
        }
    }

    /// Reserve `size` bytes with no alignment requirement.
    ///
    /// Returns `None`, leaving both pools untouched, when neither pool has
    /// room. A zero-size request succeeds and consumes nothing.
    pub fn allocate(&mut self, size: usize) -> Option<Block> {
        self.allocate_aligned(size, 1)
    }

    /// Reserve `size` bytes starting on an `align` boundary.
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> Option<Block> {
        let (pool, region) = if self.fast.fits(size, align) {
            (Pool::Fast, &mut self.fast)
        } else {
            (Pool::Bulk, &mut self.bulk)
        };
        let offset = region.reserve(size, align)?;
        Some(Block {
            pool,
            offset,
            len: size,
        })
    }

    /// Like [`Self::allocate`], with the block zero-filled.
    pub fn allocate_zeroed(&mut self, size: usize) -> Option<Block> {
        let block = self.allocate(size)?;
        self.bytes_mut(block).fill(0);
        Some(block)
    }

    /// Reserve room for `count` `f32` samples, zero-filled.
    pub fn allocate_samples(&mut self, count: usize) -> Option<Block> {
        let size = count.checked_mul(core::mem::size_of::<f32>())?;
        let block = self.allocate_aligned(size, align_of::<f32>())?;
        self.bytes_mut(block).fill(0);
        Some(block)
    }

    /// Release every block in both pools.
    ///
    /// Handles from before the reset still index valid memory, but that
    /// memory now belongs to whoever allocates next.
    pub fn reset(&mut self) {
        self.fast.used = 0;
        self.bulk.used = 0;
    }

    fn region(&self, pool: Pool) -> &Region {
        match pool {
            Pool::Fast => &self.fast,
            Pool::Bulk => &self.bulk,
        }
    }

    fn region_mut(&mut self, pool: Pool) -> &mut Region {
        match pool {
            Pool::Fast => &mut self.fast,
            Pool::Bulk => &mut self.bulk,
        }
    }

    /// Bytes of a block.
    pub fn bytes(&self, block: Block) -> &[u8] {
        self.region(block.pool).get(&block)
    }

    /// Mutable bytes of a block.
    pub fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        self.region_mut(block.pool).get_mut(&block)
    }

    /// A block viewed as samples. Empty when the block was not reserved
    /// with [`Self::allocate_samples`] or an equivalent alignment.
    pub fn samples(&self, block: Block) -> &[f32] {
        bytemuck::try_cast_slice(self.bytes(block)).unwrap_or_default()
    }

    /// Mutable samples of a block.
    pub fn samples_mut(&mut self, block: Block) -> &mut [f32] {
        bytemuck::try_cast_slice_mut(self.bytes_mut(block)).unwrap_or_default()
    }

    /// Two disjoint blocks at once, e.g. a delay line and its feedback
    /// buffer. `None` when the blocks overlap.
    pub fn pair_mut(&mut self, a: Block, b: Block) -> Option<(&mut [u8], &mut [u8])> {
        if a.overlaps(&b) {
            return None;
        }
        if a.pool == b.pool {
            let region = self.region_mut(a.pool);
            let (first, second, swapped) = if a.offset <= b.offset {
                (a, b, false)
            } else {
                (b, a, true)
            };
            let (low, high) = region.mem.split_at_mut_checked(second.offset)?;
            let first = low.get_mut(first.range())?;
            let second = high.get_mut(..second.len)?;
            return Some(if swapped {
                (second, first)
            } else {
                (first, second)
            });
        }
        let (fast, bulk) = (&mut self.fast, &mut self.bulk);
        let (a_region, b_region) = if a.pool == Pool::Fast {
            (fast, bulk)
        } else {
            (bulk, fast)
        };
        Some((a_region.get_mut(&a), b_region.get_mut(&b)))
    }

    /// Current reservation totals.
    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage {
            fast_used: self.fast.used,
            fast_capacity: self.fast.capacity(),
            bulk_used: self.bulk.used,
            bulk_capacity: self.bulk.capacity(),
        }
    }
}

impl core::fmt::Debug for Arena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena").field("usage", &self.usage()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn leak(len: usize) -> &'static mut [u8] {
        Box::leak(vec![0u8; len].into_boxed_slice())
    }

    fn arena(fast: usize, bulk: usize) -> Arena {
        Arena::new(leak(fast), leak(bulk))
    }

    #[test]
    fn test_fast_pool_first_then_bulk() {
        let mut arena = arena(100, 1000);
        let a = arena.allocate(60).unwrap();
        let b = arena.allocate(60).unwrap();
        assert_eq!(a.pool(), Pool::Fast);
        assert_eq!(b.pool(), Pool::Bulk);
        // a later small request still lands in the fast pool
        let c = arena.allocate(40).unwrap();
        assert_eq!(c.pool(), Pool::Fast);
        assert_eq!(c.offset(), 60);
    }

    #[test]
    fn test_exact_fit_uses_fast_pool() {
        let mut arena = arena(64, 64);
        assert_eq!(arena.allocate(64).unwrap().pool(), Pool::Fast);
        assert_eq!(arena.usage().fast_used, 64);
    }

    #[test]
    fn test_exhaustion_leaves_state_unchanged() {
        let mut arena = arena(16, 32);
        arena.allocate(10).unwrap();
        let before = arena.usage();
        assert!(arena.allocate(33).is_none());
        assert_eq!(arena.usage(), before);
    }

    #[test]
    fn test_reset_returns_offsets_to_zero() {
        let mut arena = arena(32, 32);
        arena.allocate(20).unwrap();
        arena.allocate(20).unwrap();
        arena.reset();
        let usage = arena.usage();
        assert_eq!((usage.fast_used, usage.bulk_used), (0, 0));
        assert_eq!(arena.allocate(32).unwrap().offset(), 0);
    }

    #[test]
    fn test_samples_are_aligned_and_zeroed() {
        let mut arena = arena(64, 0);
        arena.allocate(3).unwrap();
        let block = arena.allocate_samples(4).unwrap();
        assert_eq!(arena.samples(block), &[0.0; 4]);
        arena.samples_mut(block)[2] = 0.5;
        assert_eq!(arena.samples(block)[2], 0.5);
    }

    #[test]
    fn test_pair_mut_rejects_overlap() {
        let mut arena = arena(64, 64);
        let a = arena.allocate(8).unwrap();
        let b = arena.allocate(8).unwrap();
        let (x, y) = arena.pair_mut(b, a).unwrap();
        x.fill(1);
        y.fill(2);
        assert_eq!(arena.bytes(a), &[2; 8]);
        assert_eq!(arena.bytes(b), &[1; 8]);
        assert!(arena.pair_mut(a, a).is_none());
    }
}
