//! Region-style storage allocator.
//!
//! An [`Arena`] carves blocks sequentially out of one backing vector. Each block
//! occupies its own address range (a block's base address is its position in
//! the arena), so addresses resolved through descriptors over different blocks
//! never collide.
//!
//! Releasing a block invalidates its handle but does not reclaim memory; the
//! whole region is reclaimed at once by [`Arena::reset`], which also invalidates
//! every outstanding handle.
//!
//! Owner ids and epochs are never reused: a reset that would exhaust the epoch
//! counter moves the arena to a fresh owner id instead.

use std::sync::atomic::{AtomicU64, Ordering};

use dope_common::{Result, error::Error};

use crate::storage::{Allocator, BlockId, StorageRef};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(BlockId::DETACHED_OWNER + 1);

/// Hands out a process-unique owner id.
///
/// # Panics
///
/// Panics once all `u64` owner ids have been issued.
fn next_owner() -> u64 {
    NEXT_OWNER
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |owner| {
            owner.checked_add(1)
        })
        .expect("arena owner ids exhausted")
}

/// Configuration of an [`Arena`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaOptions {
    initial_capacity: usize,
    max_elements: usize,
}

impl ArenaOptions {
    pub fn new() -> ArenaOptions {
        ArenaOptions {
            initial_capacity: 0,
            max_elements: i64::MAX as usize,
        }
    }

    /// Number of elements to reserve up front.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> ArenaOptions {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Upper limit on the number of elements the arena may hold before a reset.
    pub fn max_elements(mut self, max_elements: usize) -> ArenaOptions {
        self.max_elements = max_elements.min(i64::MAX as usize);
        self
    }
}

impl Default for ArenaOptions {
    fn default() -> Self {
        ArenaOptions::new()
    }
}

#[derive(Debug, Clone)]
struct Block {
    start: usize,
    len: usize,
    live: bool,
}

/// Region allocator handing out [`StorageRef`]s over a single `Vec<T>`.
pub struct Arena<T> {
    owner: u64,
    epoch: u64,
    data: Vec<T>,
    blocks: Vec<Block>,
    options: ArenaOptions,
}

impl<T: Clone + Default> Arena<T> {
    pub fn new() -> Arena<T> {
        Arena::with_options(ArenaOptions::default())
    }

    pub fn with_options(options: ArenaOptions) -> Arena<T> {
        Arena {
            owner: next_owner(),
            epoch: 0,
            data: Vec::with_capacity(options.initial_capacity.min(options.max_elements)),
            blocks: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &ArenaOptions {
        &self.options
    }

    /// Number of elements carved out since the last reset, released blocks
    /// included.
    pub fn used(&self) -> usize {
        self.data.len()
    }

    /// Number of blocks that have been allocated and not yet released.
    pub fn live_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| block.live).count()
    }

    /// Invalidates every handle issued so far and reclaims all elements.
    pub fn reset(&mut self) {
        log::trace!(
            "arena {}: reset epoch {} ({} blocks, {} elements)",
            self.owner,
            self.epoch,
            self.blocks.len(),
            self.data.len()
        );
        match self.epoch.checked_add(1) {
            Some(epoch) => self.epoch = epoch,
            None => {
                self.owner = next_owner();
                self.epoch = 0;
                log::debug!("arena epochs exhausted, continuing as arena {}", self.owner);
            }
        }
        self.blocks.clear();
        self.data.clear();
    }

    /// Returns `true` if `storage` was issued by this arena and is still live.
    pub fn is_live(&self, storage: StorageRef) -> bool {
        self.live_block(storage).is_ok()
    }

    pub fn block(&self, storage: StorageRef) -> Result<&[T]> {
        let block = self.live_block(storage)?;
        Ok(&self.data[block.start..block.start + block.len])
    }

    pub fn block_mut(&mut self, storage: StorageRef) -> Result<&mut [T]> {
        let block = self.live_block(storage)?;
        let range = block.start..block.start + block.len;
        Ok(&mut self.data[range])
    }

    /// Returns the element at a resolved `address` inside `storage`.
    pub fn get(&self, storage: StorageRef, address: i64) -> Result<&T> {
        let position = self.position(storage, address)?;
        Ok(&self.data[position])
    }

    pub fn get_mut(&mut self, storage: StorageRef, address: i64) -> Result<&mut T> {
        let position = self.position(storage, address)?;
        Ok(&mut self.data[position])
    }

    fn position(&self, storage: StorageRef, address: i64) -> Result<usize> {
        let block = self.live_block(storage)?;
        storage
            .position_of(address)
            .map(|position| block.start + position)
            .ok_or_else(|| Error::address_out_of_storage(address, storage.base(), storage.len()))
    }

    fn live_block(&self, storage: StorageRef) -> Result<&Block> {
        let id = storage.block();
        if id.owner() != self.owner {
            return Err(Error::invalid_arg(
                "storage",
                format!("block {id} was not issued by arena {}", self.owner),
            ));
        }
        let block = self
            .blocks
            .get(id.index() as usize)
            .filter(|block| id.epoch() == self.epoch && block.live)
            .ok_or_else(|| Error::stale_storage(id.to_string()))?;
        if block.start as i64 != storage.base() || block.len != storage.len() {
            return Err(Error::invalid_arg(
                "storage",
                format!("handle does not match block {id}"),
            ));
        }
        Ok(block)
    }
}

impl<T: Clone + Default> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T: Clone + Default> Allocator for Arena<T> {
    fn allocate(&mut self, element_count: usize) -> Result<StorageRef> {
        let start = self.data.len();
        if element_count > self.options.max_elements - start {
            return Err(Error::invalid_arg(
                "element_count",
                format!(
                    "{element_count} elements exceed the arena limit ({start} of {} in use)",
                    self.options.max_elements
                ),
            ));
        }
        let index = u32::try_from(self.blocks.len())
            .map_err(|_| Error::invalid_arg("element_count", "too many blocks in arena"))?;
        self.data.resize(start + element_count, T::default());
        self.blocks.push(Block {
            start,
            len: element_count,
            live: true,
        });
        let id = BlockId::new(self.owner, index, self.epoch);
        log::trace!(
            "arena {}: allocated block {id}, {element_count} elements at {start}",
            self.owner
        );
        Ok(StorageRef::new(id, start as i64, element_count))
    }

    fn release(&mut self, storage: StorageRef) -> Result<()> {
        self.live_block(storage)?;
        let id = storage.block();
        self.blocks[id.index() as usize].live = false;
        log::trace!("arena {}: released block {id}", self.owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dope_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_blocks_are_disjoint() {
        let mut arena = Arena::<u32>::new();
        let a = arena.allocate(4).unwrap();
        let b = arena.allocate(3).unwrap();
        assert_eq!(a.base(), 0);
        assert_eq!(b.base(), 4);
        assert_eq!(arena.used(), 7);
        assert_eq!(arena.live_blocks(), 2);

        *arena.get_mut(b, 4).unwrap() = 9;
        arena.block_mut(a).unwrap()[3] = 5;
        assert_eq!(arena.block(a).unwrap(), &[0, 0, 0, 5]);
        assert_eq!(arena.block(b).unwrap(), &[9, 0, 0]);
    }

    #[test]
    fn test_address_outside_block() {
        let mut arena = Arena::<u8>::new();
        let a = arena.allocate(2).unwrap();
        let _b = arena.allocate(2).unwrap();
        let err = arena.get(a, 2).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::AddressOutOfStorage {
                address: 2,
                base: 0,
                len: 2
            }
        );
    }

    #[test]
    fn test_release_invalidates_handle() {
        let mut arena = Arena::<u8>::new();
        let a = arena.allocate(2).unwrap();
        arena.release(a).unwrap();
        assert!(!arena.is_live(a));
        assert!(matches!(
            arena.get(a, 0).unwrap_err().kind(),
            ErrorKind::StaleStorage { .. }
        ));
        assert!(arena.release(a).is_err());
        assert_eq!(arena.live_blocks(), 0);
    }

    #[test]
    fn test_reset_invalidates_everything() {
        let mut arena = Arena::<u8>::new();
        let a = arena.allocate(2).unwrap();
        arena.reset();
        assert_eq!(arena.used(), 0);
        let b = arena.allocate(2).unwrap();
        assert_eq!(b.base(), a.base());
        assert!(!arena.is_live(a));
        assert!(arena.is_live(b));
    }

    #[test]
    fn test_reset_advances_epoch() {
        let mut arena = Arena::<u8>::new();
        let a = arena.allocate(2).unwrap();
        arena.reset();
        let b = arena.allocate(2).unwrap();
        assert_eq!(b.block().owner(), a.block().owner());
        assert_eq!(b.block().epoch(), a.block().epoch() + 1);
        assert_ne!(a.block(), b.block());
    }

    #[test]
    fn test_epoch_exhaustion_switches_owner() {
        let mut arena = Arena::<u8>::new();
        arena.epoch = u64::MAX;
        let last = arena.allocate(2).unwrap();
        let owner = arena.owner;
        arena.reset();
        assert_ne!(arena.owner, owner);
        assert_eq!(arena.epoch, 0);

        let next = arena.allocate(2).unwrap();
        assert_eq!(next.block().epoch(), 0);
        assert!(!arena.is_live(last));
        assert!(arena.block(last).is_err());
        assert!(arena.is_live(next));
    }

    #[test]
    fn test_foreign_handles() {
        let mut first = Arena::<u8>::new();
        let mut second = Arena::<u8>::new();
        let a = first.allocate(2).unwrap();
        let _ = second.allocate(2).unwrap();
        assert!(second.block(a).is_err());
        assert!(first.block(StorageRef::detached(0, 2)).is_err());
    }

    #[test]
    fn test_max_elements() {
        let mut arena = Arena::<u8>::with_options(ArenaOptions::new().max_elements(5));
        arena.allocate(3).unwrap();
        arena.allocate(2).unwrap();
        let err = arena.allocate(1).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        arena.reset();
        arena.allocate(5).unwrap();
    }

    #[test]
    fn test_zero_length_block() {
        let mut arena = Arena::<u8>::new();
        let a = arena.allocate(0).unwrap();
        assert!(a.is_empty());
        assert_eq!(arena.block(a).unwrap().len(), 0);
        assert!(arena.get(a, 0).is_err());
        arena.release(a).unwrap();
    }
}
