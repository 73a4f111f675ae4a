//! The array descriptor.

use dope_common::{
    Result,
    error::Error,
    result::{narrow_address, verify_rank},
};

use crate::{
    MAX_RANK, bounds, dimension::Dimension, indices::Indices, storage::StorageRef, strides,
};

/// Runtime description of a rank-`RANK` array: a storage handle, an offset, and
/// the bounds of every axis.
///
/// The element addressed by the tuple of lower bounds lives at
/// `array.base() + offset`; the others follow in column-major order (axis 0
/// varies fastest). The offset and the dimensions always change together: every
/// reshaping operation produces a complete, validated value.
///
/// A descriptor is a small `Copy` value. It never owns the storage it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor<const RANK: usize> {
    array: StorageRef,
    offset: i64,
    dims: [Dimension; RANK],
}

impl<const RANK: usize> Descriptor<RANK> {
    const RANK_SUPPORTED: () = assert!(RANK <= MAX_RANK, "descriptor rank exceeds MAX_RANK");

    /// Creates a descriptor over `array`.
    ///
    /// Fails with `RankMismatch` unless `dims` holds exactly `RANK` dimensions,
    /// and with `ExtentOverflow` if the element count does not fit in an `i64`.
    /// Consistency with the extent of `array` is the caller's responsibility; see
    /// [`verify_extent`](Self::verify_extent).
    pub fn new(
        array: StorageRef,
        offset: i64,
        dims: &[Dimension],
    ) -> Result<Descriptor<RANK>> {
        verify_rank(RANK, dims.len())?;
        let dims: [Dimension; RANK] = std::array::from_fn(|axis| dims[axis]);
        Self::from_parts(array, offset, dims)
    }

    /// Creates a descriptor from an array of dimensions whose length is already
    /// known to match the rank.
    pub fn from_parts(
        array: StorageRef,
        offset: i64,
        dims: [Dimension; RANK],
    ) -> Result<Descriptor<RANK>> {
        #[allow(clippy::let_unit_value)]
        let () = Self::RANK_SUPPORTED;
        if strides::checked_column_major(&dims).is_none() {
            return Err(Error::extent_overflow(format!(
                "element count of {} does not fit in i64",
                DimsDisplay(&dims)
            )));
        }
        Ok(Descriptor {
            array,
            offset,
            dims,
        })
    }

    /// Creates a descriptor whose first element is the first element of `array`
    /// and checks that every element fits within it.
    pub fn contiguous(array: StorageRef, dims: &[Dimension]) -> Result<Descriptor<RANK>> {
        let desc = Self::new(array, 0, dims)?;
        desc.verify_extent()?;
        Ok(desc)
    }

    #[inline]
    pub fn array(&self) -> StorageRef {
        self.array
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        self.offset
    }

    #[inline]
    pub fn dims(&self) -> &[Dimension; RANK] {
        &self.dims
    }

    /// # Panics
    ///
    /// Panics if `axis >= RANK`.
    #[inline]
    pub fn dim(&self, axis: usize) -> &Dimension {
        &self.dims[axis]
    }

    #[inline]
    pub fn rank(&self) -> usize {
        RANK
    }

    /// Number of elements along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= RANK`.
    #[inline]
    pub fn extent(&self, axis: usize) -> i64 {
        self.dims[axis].dim_size()
    }

    pub fn extents(&self) -> [i64; RANK] {
        self.dims.map(|dim| dim.dim_size())
    }

    pub fn lower_bounds(&self) -> [i64; RANK] {
        self.dims.map(|dim| dim.lower_bound())
    }

    pub fn upper_bounds(&self) -> [i64; RANK] {
        self.dims.map(|dim| dim.upper_bound())
    }

    /// Total number of elements; `1` for a rank-0 descriptor.
    pub fn element_count(&self) -> i64 {
        self.dims.iter().map(Dimension::dim_size).product()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(Dimension::is_empty)
    }

    /// Column-major strides of this descriptor. Derived on every call.
    #[inline]
    pub fn strides(&self) -> [i64; RANK] {
        strides::column_major(&self.dims)
    }

    /// Checks `index` against the bounds of every axis, axis 0 first.
    #[inline]
    pub fn validate(&self, index: &[i64; RANK]) -> Result<()> {
        bounds::validate(&self.dims, index)
    }

    #[inline]
    pub fn contains(&self, index: &[i64; RANK]) -> bool {
        bounds::first_violation(&self.dims, index).is_none()
    }

    /// Iterates over every valid index tuple in storage order.
    pub fn indices(&self) -> Indices<RANK> {
        Indices::new(self.dims, self.element_count())
    }

    /// Returns a descriptor over the same storage with a new offset and new
    /// dimensions. `self` is left untouched.
    pub fn reshape(&self, offset: i64, dims: &[Dimension]) -> Result<Descriptor<RANK>> {
        Self::new(self.array, offset, dims)
    }

    /// Replaces offset and dimensions together. On error `self` is unchanged.
    pub fn reshape_in_place(&mut self, offset: i64, dims: &[Dimension]) -> Result<()> {
        *self = self.reshape(offset, dims)?;
        Ok(())
    }

    /// Re-points the descriptor at different storage, keeping its layout.
    pub fn with_array(&self, array: StorageRef) -> Descriptor<RANK> {
        Descriptor { array, ..*self }
    }

    /// Shifts the lower bounds to `lower_bounds`, keeping the extents and the
    /// offset: the element at `lower_bounds` is the element that used to sit at
    /// the old lower bounds.
    pub fn rebound(&self, lower_bounds: &[i64; RANK]) -> Result<Descriptor<RANK>> {
        let mut dims = self.dims;
        for (dim, &lower_bound) in dims.iter_mut().zip(lower_bounds) {
            *dim = Dimension::with_extent(lower_bound, dim.dim_size())?;
        }
        Self::from_parts(self.array, self.offset, dims)
    }

    /// Narrows the last (slowest-varying) axis to `lower..=upper`.
    ///
    /// Index tuples inside the slab address the same elements as they do in
    /// `self`. `upper == lower - 1` yields an empty slab.
    pub fn slab(&self, lower: i64, upper: i64) -> Result<Descriptor<RANK>> {
        let Some(axis) = RANK.checked_sub(1) else {
            return Err(Error::invalid_arg("slab", "a rank-0 descriptor has no axis"));
        };
        let current = self.dims[axis];
        let narrowed = Dimension::new(lower, upper)?;
        if lower < current.lower_bound() || upper > current.upper_bound() {
            return Err(Error::invalid_arg(
                "slab",
                format!("{narrowed} is not within {current}"),
            ));
        }
        let stride = self.strides()[axis];
        let offset = (lower as i128 - current.lower_bound() as i128) * stride as i128
            + self.offset as i128;
        let offset = narrow_address(offset, || format!("offset of slab {narrowed}"))?;
        let mut dims = self.dims;
        dims[axis] = narrowed;
        Self::from_parts(self.array, offset, dims)
    }

    /// Range of block positions, relative to `array.base()`, that this
    /// descriptor can address; `None` when it is empty.
    pub fn span(&self) -> Option<(i128, i128)> {
        if self.is_empty() {
            return None;
        }
        let last = self
            .dims
            .iter()
            .zip(self.strides())
            .map(|(dim, s)| (dim.dim_size() as i128 - 1) * s as i128)
            .sum::<i128>();
        let first = self.offset as i128;
        Some((first, first + last))
    }

    /// Checks that every element this descriptor addresses lies inside `array`,
    /// and that every such address is representable as an `i64`.
    pub fn verify_extent(&self) -> Result<()> {
        let Some((first, last)) = self.span() else {
            return Ok(());
        };
        if first < 0 || last >= self.array.len() as i128 {
            return Err(Error::extent_overflow(format!(
                "{} at offset {} addresses positions {first}..={last}, block holds {} elements",
                DimsDisplay(&self.dims),
                self.offset,
                self.array.len()
            )));
        }
        let base = self.array.base() as i128;
        narrow_address(base + first, || format!("first address of {}", DimsDisplay(&self.dims)))?;
        narrow_address(base + last, || format!("last address of {}", DimsDisplay(&self.dims)))?;
        Ok(())
    }
}

struct DimsDisplay<'a>(&'a [Dimension]);

impl std::fmt::Display for DimsDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for dim in self.0 {
            write!(f, "{dim}")?;
        }
        Ok(())
    }
}
