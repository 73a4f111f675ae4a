//! Address resolution.
//!
//! Every element access funnels through the same computation:
//!
//! ```text
//! address = base(array) + offset + Σ (index[i] - dim[i].lower_bound) * stride[i]
//! ```
//!
//! The unchecked entry points perform no bounds checking at all. They exist for
//! loops that validated their index tuples once up front; handing them an
//! out-of-range tuple yields an unspecified address (the arithmetic wraps, it
//! never panics). The checked entry points validate first, axis 0 first.

use dope_common::{Result, error::Error};

use crate::{bounds, descriptor::Descriptor, dimension::Dimension};

impl<const RANK: usize> Descriptor<RANK> {
    /// Resolves `index` to a linear address without bounds checking.
    ///
    /// `index` must already have passed [`validate`](Self::validate) against this
    /// descriptor; otherwise the returned address is meaningless.
    #[inline]
    pub fn resolve_unchecked(&self, index: &[i64; RANK]) -> i64 {
        let mut address = self.array().base().wrapping_add(self.offset());
        for ((dim, stride), &i) in self.dims().iter().zip(self.strides()).zip(index) {
            address = address.wrapping_add(i.wrapping_sub(dim.lower_bound()).wrapping_mul(stride));
        }
        address
    }

    /// Validates `index` and resolves it to a linear address.
    #[inline]
    pub fn resolve_checked(&self, index: &[i64; RANK]) -> Result<i64> {
        self.validate(index)?;
        Ok(self.resolve_unchecked(index))
    }

    /// Returns the element at `index` from `data`, the slice backing a detached
    /// storage handle (address `array.base()` is `data[0]`).
    pub fn element<'a, T>(&self, data: &'a [T], index: &[i64; RANK]) -> Result<&'a T> {
        let position = self.slice_position(data.len(), index)?;
        Ok(&data[position])
    }

    /// Mutable counterpart of [`element`](Self::element).
    pub fn element_mut<'a, T>(&self, data: &'a mut [T], index: &[i64; RANK]) -> Result<&'a mut T> {
        let position = self.slice_position(data.len(), index)?;
        Ok(&mut data[position])
    }

    fn slice_position(&self, len: usize, index: &[i64; RANK]) -> Result<usize> {
        let address = self.resolve_checked(index)?;
        let base = self.array().base();
        let relative = address as i128 - base as i128;
        if relative < 0 || relative >= len as i128 {
            return Err(Error::address_out_of_storage(address, base, len));
        }
        Ok(relative as usize)
    }
}

/// A descriptor's addressing state with the strides precomputed.
///
/// The lower bounds, offset and base are folded into a single bias, so an
/// unchecked resolution is one multiply-add per axis. A resolver is a snapshot:
/// reshaping the descriptor afterwards does not update it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressResolver<const RANK: usize> {
    dims: [Dimension; RANK],
    strides: [i64; RANK],
    bias: i64,
}

impl<const RANK: usize> AddressResolver<RANK> {
    pub fn new(desc: &Descriptor<RANK>) -> AddressResolver<RANK> {
        let strides = desc.strides();
        let bias = desc
            .dims()
            .iter()
            .zip(strides)
            .fold(desc.array().base().wrapping_add(desc.offset()), |bias, (dim, s)| {
                bias.wrapping_sub(dim.lower_bound().wrapping_mul(s))
            });
        AddressResolver {
            dims: *desc.dims(),
            strides,
            bias,
        }
    }

    #[inline]
    pub fn strides(&self) -> &[i64; RANK] {
        &self.strides
    }

    /// Address of the all-zeros index tuple, whether or not it is in bounds.
    #[inline]
    pub fn bias(&self) -> i64 {
        self.bias
    }

    /// See [`Descriptor::resolve_unchecked`].
    #[inline]
    pub fn resolve_unchecked(&self, index: &[i64; RANK]) -> i64 {
        self.strides
            .iter()
            .zip(index)
            .fold(self.bias, |address, (&s, &i)| {
                address.wrapping_add(i.wrapping_mul(s))
            })
    }

    #[inline]
    pub fn resolve_checked(&self, index: &[i64; RANK]) -> Result<i64> {
        bounds::validate(&self.dims, index)?;
        Ok(self.resolve_unchecked(index))
    }
}

impl<const RANK: usize> From<&Descriptor<RANK>> for AddressResolver<RANK> {
    fn from(desc: &Descriptor<RANK>) -> Self {
        AddressResolver::new(desc)
    }
}

#[cfg(test)]
mod tests {
    use dope_common::error::ErrorKind;

    use super::*;
    use crate::storage::StorageRef;

    fn sample(base: i64, offset: i64) -> Descriptor<2> {
        let dims = [Dimension::new(1, 3).unwrap(), Dimension::new(0, 1).unwrap()];
        Descriptor::new(StorageRef::detached(base, 6), offset, &dims).unwrap()
    }

    #[test]
    fn test_resolve_example() {
        let desc = sample(0, 0);
        assert_eq!(desc.strides(), [1, 3]);
        assert_eq!(desc.resolve_checked(&[2, 1]).unwrap(), 4);
        assert_eq!(desc.resolve_unchecked(&[2, 1]), 4);

        let desc = sample(1000, 0);
        assert_eq!(desc.resolve_checked(&[2, 1]).unwrap(), 1004);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let err = sample(0, 0).resolve_checked(&[4, 0]).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::IndexOutOfRange {
                axis: 0,
                index: 4,
                lower_bound: 1,
                upper_bound: 3
            }
        );
    }

    #[test]
    fn test_unchecked_never_panics() {
        let desc = sample(i64::MAX, i64::MAX);
        let _ = desc.resolve_unchecked(&[i64::MIN, i64::MAX]);
        let resolver = AddressResolver::new(&desc);
        let _ = resolver.resolve_unchecked(&[i64::MIN, i64::MAX]);
    }

    #[test]
    fn test_resolver_matches_descriptor() {
        let dims = [
            Dimension::new(-2, 1).unwrap(),
            Dimension::new(3, 5).unwrap(),
            Dimension::new(0, 1).unwrap(),
        ];
        let desc = Descriptor::<3>::new(StorageRef::detached(-50, 24), 7, &dims).unwrap();
        let resolver = AddressResolver::from(&desc);
        assert_eq!(resolver.strides(), &[1, 4, 12]);
        for index in desc.indices() {
            assert_eq!(
                resolver.resolve_checked(&index).unwrap(),
                desc.resolve_checked(&index).unwrap()
            );
        }
        assert_eq!(resolver.resolve_checked(&[0, 6, 0]).unwrap_err().axis(), Some(1));
    }

    #[test]
    fn test_element_access() {
        let mut data: Vec<i32> = (0..8).collect();
        let desc = sample(0, 2);
        assert_eq!(*desc.element(&data, &[1, 0]).unwrap(), 2);
        assert_eq!(*desc.element(&data, &[3, 1]).unwrap(), 7);
        *desc.element_mut(&mut data, &[2, 0]).unwrap() = -1;
        assert_eq!(data[3], -1);

        assert!(desc.element(&data, &[0, 0]).is_err());
        let err = desc.element(&data[..7], &[3, 1]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::AddressOutOfStorage { .. }));
    }
}
