//! Non-owning storage handles and the allocator interface that issues them.

use std::fmt;

use dope_common::Result;

/// Identity of a storage block: the issuing allocator, the block slot within
/// it, and the allocator epoch the slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    owner: u64,
    index: u32,
    epoch: u64,
}

impl BlockId {
    /// Owner tag of blocks that were not issued by an allocator.
    pub const DETACHED_OWNER: u64 = 0;

    pub fn new(owner: u64, index: u32, epoch: u64) -> BlockId {
        BlockId {
            owner,
            index,
            epoch,
        }
    }

    pub fn owner(&self) -> u64 {
        self.owner
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_detached(&self) -> bool {
        self.owner == Self::DETACHED_OWNER
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.owner, self.index, self.epoch)
    }
}

/// A `Copy` handle to a contiguous block of `len` elements whose first element
/// lives at address `base`.
///
/// The handle does not own the block. Any number of descriptors may hold the
/// same handle; the allocator that issued it decides when the block goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageRef {
    block: BlockId,
    base: i64,
    len: usize,
}

impl StorageRef {
    pub fn new(block: BlockId, base: i64, len: usize) -> StorageRef {
        StorageRef { block, base, len }
    }

    /// Describes storage that no allocator tracks, such as a caller's slice
    /// (with `base == 0`, addresses are slice positions).
    pub fn detached(base: i64, len: usize) -> StorageRef {
        StorageRef::new(BlockId::new(BlockId::DETACHED_OWNER, 0, 0), base, len)
    }

    #[inline]
    pub fn block(&self) -> BlockId {
        self.block
    }

    #[inline]
    pub fn base(&self) -> i64 {
        self.base
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `address` falls inside `[base, base + len)`.
    #[inline]
    pub fn contains_address(&self, address: i64) -> bool {
        let relative = address as i128 - self.base as i128;
        relative >= 0 && relative < self.len as i128
    }

    /// Converts an absolute address into a position within the block.
    #[inline]
    pub fn position_of(&self, address: i64) -> Option<usize> {
        if self.contains_address(address) {
            Some((address as i128 - self.base as i128) as usize)
        } else {
            None
        }
    }
}

/// The collaborator that owns backing storage.
///
/// Descriptors only ever hold the [`StorageRef`]s an allocator hands out; they
/// never allocate, resize, or release storage themselves.
pub trait Allocator {
    /// Produces a block of `element_count` elements.
    fn allocate(&mut self, element_count: usize) -> Result<StorageRef>;

    /// Invalidates `storage`. Called by the owner, never by a descriptor.
    fn release(&mut self, storage: StorageRef) -> Result<()>;
}
