//! Stride derivation.
//!
//! Strides are column-major: axis 0 varies fastest, `s[0] = 1` and
//! `s[i] = s[i - 1] * dim[i - 1].dim_size()`. An empty axis zeroes every stride
//! after it. Strides are never stored in a [`Descriptor`](crate::Descriptor);
//! callers that need them repeatedly cache them in an
//! [`AddressResolver`](crate::AddressResolver).

use crate::dimension::Dimension;

/// Derives the column-major stride vector for `dims`.
///
/// Descriptors guarantee that the running products fit in an `i64`; for bounds
/// that were not checked with [`checked_column_major`] the result wraps.
pub fn column_major<const RANK: usize>(dims: &[Dimension; RANK]) -> [i64; RANK] {
    let mut strides = [0i64; RANK];
    let mut stride = 1i64;
    for (s, dim) in strides.iter_mut().zip(dims) {
        *s = stride;
        stride = stride.wrapping_mul(dim.dim_size());
    }
    strides
}

/// Derives the stride vector together with the total element count, or `None`
/// if any running product overflows an `i64`.
pub fn checked_column_major<const RANK: usize>(
    dims: &[Dimension; RANK],
) -> Option<([i64; RANK], i64)> {
    let mut strides = [0i64; RANK];
    let mut stride = 1i64;
    for (s, dim) in strides.iter_mut().zip(dims) {
        *s = stride;
        stride = stride.checked_mul(dim.dim_size())?;
    }
    Some((strides, stride))
}
