//! Per-axis bounds of an array.

use std::fmt;

use dope_common::{Result, error::Error, verify_arg};

/// Inclusive `[lower_bound, upper_bound]` range of valid indices on one axis.
///
/// `upper_bound == lower_bound - 1` describes an empty axis. The number of
/// elements is always derived from the bounds, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    lower_bound: i64,
    upper_bound: i64,
}

impl Dimension {
    /// Creates a dimension spanning `lower_bound..=upper_bound`.
    ///
    /// Fails with `InvalidDimension` if `upper_bound < lower_bound - 1`, or if the
    /// resulting size does not fit in an `i64`.
    pub fn new(lower_bound: i64, upper_bound: i64) -> Result<Dimension> {
        let size = upper_bound as i128 - lower_bound as i128 + 1;
        if size < 0 || size > i64::MAX as i128 {
            return Err(Error::invalid_dimension(lower_bound, upper_bound));
        }
        Ok(Dimension {
            lower_bound,
            upper_bound,
        })
    }

    /// Creates a dimension of `size` elements starting at `lower_bound`.
    ///
    /// Fails with `InvalidDimension` if the upper bound is not representable; the
    /// reported upper bound is then saturated to the `i64` range.
    pub fn with_extent(lower_bound: i64, size: i64) -> Result<Dimension> {
        verify_arg!(size, size >= 0);
        let upper_bound = lower_bound as i128 + size as i128 - 1;
        if upper_bound < i64::MIN as i128 || upper_bound > i64::MAX as i128 {
            let saturated = upper_bound.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
            return Err(Error::invalid_dimension(lower_bound, saturated));
        }
        Dimension::new(lower_bound, upper_bound as i64)
    }

    /// Creates a dimension of `size` elements with bounds `[0, size - 1]`.
    pub fn zero_based(size: i64) -> Result<Dimension> {
        Dimension::with_extent(0, size)
    }

    #[inline]
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }

    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    /// Number of elements along this axis; `0` for an empty axis.
    #[inline]
    pub fn dim_size(&self) -> i64 {
        if self.upper_bound < self.lower_bound {
            0
        } else {
            self.upper_bound - self.lower_bound + 1
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.upper_bound < self.lower_bound
    }

    /// Returns `true` if `index` is a valid position on this axis.
    #[inline]
    pub fn contains(&self, index: i64) -> bool {
        self.lower_bound <= index && index <= self.upper_bound
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.lower_bound, self.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use dope_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_dim_size() {
        let dim = Dimension::new(1, 3).unwrap();
        assert_eq!(dim.dim_size(), 3);
        assert!(!dim.is_empty());

        let dim = Dimension::new(-4, -4).unwrap();
        assert_eq!(dim.dim_size(), 1);

        let dim = Dimension::new(-2, 5).unwrap();
        assert_eq!(dim.dim_size(), 8);
    }

    #[test]
    fn test_empty_axis_boundary() {
        let dim = Dimension::new(5, 4).unwrap();
        assert!(dim.is_empty());
        assert_eq!(dim.dim_size(), 0);
        assert!(!dim.contains(4));
        assert!(!dim.contains(5));

        let err = Dimension::new(5, 2).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidDimension {
                lower_bound: 5,
                upper_bound: 2
            }
        );
        assert!(Dimension::new(5, 3).is_err());
    }

    #[test]
    fn test_extreme_bounds() {
        assert!(Dimension::new(i64::MIN, i64::MAX).is_err());
        assert!(Dimension::new(i64::MIN + 1, i64::MAX).is_err());
        assert_eq!(
            Dimension::new(0, i64::MAX - 1).unwrap().dim_size(),
            i64::MAX
        );
        // An empty axis near the bottom of the index range.
        assert!(Dimension::new(i64::MIN + 1, i64::MIN).unwrap().is_empty());
    }

    #[test]
    fn test_with_extent() {
        let dim = Dimension::with_extent(-1, 4).unwrap();
        assert_eq!((dim.lower_bound(), dim.upper_bound()), (-1, 2));

        let dim = Dimension::with_extent(10, 0).unwrap();
        assert!(dim.is_empty());
        assert_eq!(dim.upper_bound(), 9);

        assert!(matches!(
            Dimension::with_extent(0, -1).unwrap_err().kind(),
            ErrorKind::InvalidArgument { .. }
        ));
        assert_eq!(
            Dimension::with_extent(i64::MAX, 2).unwrap_err().into_kind(),
            ErrorKind::InvalidDimension {
                lower_bound: i64::MAX,
                upper_bound: i64::MAX
            }
        );
        assert_eq!(
            Dimension::with_extent(i64::MIN, 0).unwrap_err().into_kind(),
            ErrorKind::InvalidDimension {
                lower_bound: i64::MIN,
                upper_bound: i64::MIN
            }
        );

        let dim = Dimension::zero_based(5).unwrap();
        assert_eq!(dim.to_string(), "[0:4]");
    }

    #[test]
    fn test_contains() {
        let dim = Dimension::new(-1, 1).unwrap();
        assert!(!dim.contains(-2));
        assert!(dim.contains(-1));
        assert!(dim.contains(0));
        assert!(dim.contains(1));
        assert!(!dim.contains(2));
    }
}
