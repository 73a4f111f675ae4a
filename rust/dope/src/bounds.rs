//! Bounds validation of index tuples.
//!
//! Axes are checked in order, starting with axis 0, and validation stops at the
//! first violation. The reported axis is therefore always the lowest-numbered
//! axis that is out of range, which keeps error messages reproducible.

use dope_common::{Result, error::Error};

use crate::dimension::Dimension;

/// Checks every `index[i]` against `dims[i]`.
///
/// An empty axis rejects every index.
#[inline]
pub fn validate<const RANK: usize>(dims: &[Dimension; RANK], index: &[i64; RANK]) -> Result<()> {
    match first_violation(dims, index) {
        None => Ok(()),
        Some(axis) => Err(out_of_range(axis, index[axis], &dims[axis])),
    }
}

/// Returns the lowest-numbered axis on which `index` is out of bounds.
#[inline]
pub fn first_violation<const RANK: usize>(
    dims: &[Dimension; RANK],
    index: &[i64; RANK],
) -> Option<usize> {
    dims.iter()
        .zip(index)
        .position(|(dim, &i)| !dim.contains(i))
}

#[cold]
fn out_of_range(axis: usize, index: i64, dim: &Dimension) -> Error {
    Error::index_out_of_range(axis, index, dim.lower_bound(), dim.upper_bound())
}

#[cfg(test)]
mod tests {
    use dope_common::error::ErrorKind;

    use super::*;

    fn dims() -> [Dimension; 2] {
        [Dimension::new(1, 3).unwrap(), Dimension::new(0, 1).unwrap()]
    }

    #[test]
    fn test_within_bounds() {
        let dims = dims();
        assert!(validate(&dims, &[1, 0]).is_ok());
        assert!(validate(&dims, &[3, 1]).is_ok());
        assert_eq!(first_violation(&dims, &[2, 1]), None);
    }

    #[test]
    fn test_reports_axis_and_range() {
        let err = validate(&dims(), &[4, 0]).unwrap_err();
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
    fn test_first_axis_wins() {
        let dims = dims();
        assert_eq!(validate(&dims, &[0, 2]).unwrap_err().axis(), Some(0));
        assert_eq!(validate(&dims, &[2, -1]).unwrap_err().axis(), Some(1));
    }

    #[test]
    fn test_empty_axis_rejects_everything() {
        let dims = [Dimension::new(1, 2).unwrap(), Dimension::new(1, 0).unwrap()];
        for i in -2..3 {
            assert_eq!(validate(&dims, &[1, i]).unwrap_err().axis(), Some(1));
        }
    }
}
