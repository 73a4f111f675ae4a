//! Runtime descriptors ("dope vectors") for dynamically dimensioned arrays.
//!
//! A [`Descriptor`] couples a non-owning [`StorageRef`] with a scalar offset and
//! one [`Dimension`] per axis. Everything an array runtime needs to turn a
//! multi-index into a linear storage address funnels through it:
//!
//! - [`strides`] derives the column-major stride vector (axis 0 varies fastest).
//! - [`resolve`] maps index tuples to addresses, with checked and unchecked
//!   entry points.
//! - [`bounds`] validates index tuples against the per-axis bounds.
//!
//! Storage is owned elsewhere. The [`Allocator`] trait describes that
//! collaborator, and [`Arena`] is a region-style implementation of it.

pub mod arena;
pub mod bounds;
pub mod descriptor;
pub mod dimension;
pub mod indices;
pub mod resolve;
pub mod shared;
pub mod storage;
pub mod strides;

pub use arena::{Arena, ArenaOptions};
pub use descriptor::Descriptor;
pub use dimension::Dimension;
pub use indices::Indices;
pub use resolve::AddressResolver;
pub use shared::SharedDescriptor;
pub use storage::{Allocator, BlockId, StorageRef};

pub use dope_common::{
    Result,
    error::{Error, ErrorKind},
};

/// The largest rank a [`Descriptor`] may be instantiated with.
pub const MAX_RANK: usize = 15;
