//! A descriptor shared between threads.
//!
//! Readers take immutable snapshots; writers build a complete replacement and
//! swap it in with a single assignment under the write lock. A reader therefore
//! sees either the old descriptor or the new one, never new dimensions paired
//! with an old offset. A snapshot taken before a swap stays valid (it still
//! describes the old layout) for as long as the reader holds it.
//!
//! The lock only ever guards a completed snapshot, so a panic in an `update`
//! closure cannot leave it half-written; a poisoned lock is recovered rather
//! than propagated to every later caller.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dope_common::Result;

use crate::{descriptor::Descriptor, dimension::Dimension};

pub struct SharedDescriptor<const RANK: usize> {
    current: RwLock<Arc<Descriptor<RANK>>>,
}

impl<const RANK: usize> SharedDescriptor<RANK> {
    pub fn new(desc: Descriptor<RANK>) -> SharedDescriptor<RANK> {
        SharedDescriptor {
            current: RwLock::new(Arc::new(desc)),
        }
    }

    /// Returns the current snapshot.
    pub fn load(&self) -> Arc<Descriptor<RANK>> {
        self.read().clone()
    }

    /// Replaces the descriptor, returning the previous snapshot.
    pub fn store(&self, desc: Descriptor<RANK>) -> Arc<Descriptor<RANK>> {
        let desc = Arc::new(desc);
        let previous = std::mem::replace(&mut *self.write(), desc);
        log::debug!("shared descriptor replaced (offset {})", previous.offset());
        previous
    }

    /// Derives a replacement from the current descriptor and swaps it in.
    ///
    /// Writers are serialized, so `f` always sees the latest descriptor. If `f`
    /// fails, the current descriptor is left in place.
    pub fn update<F>(&self, f: F) -> Result<Arc<Descriptor<RANK>>>
    where
        F: FnOnce(&Descriptor<RANK>) -> Result<Descriptor<RANK>>,
    {
        let mut current = self.write();
        let next = Arc::new(f(&current)?);
        log::debug!(
            "shared descriptor updated: offset {} -> {}",
            current.offset(),
            next.offset()
        );
        *current = next.clone();
        Ok(next)
    }

    /// Atomically replaces offset and dimensions, keeping the storage handle.
    pub fn reshape(&self, offset: i64, dims: &[Dimension]) -> Result<Arc<Descriptor<RANK>>> {
        self.update(|desc| desc.reshape(offset, dims))
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<Descriptor<RANK>>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Descriptor<RANK>>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<const RANK: usize> From<Descriptor<RANK>> for SharedDescriptor<RANK> {
    fn from(desc: Descriptor<RANK>) -> Self {
        SharedDescriptor::new(desc)
    }
}
