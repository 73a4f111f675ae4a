//! Iteration over the index space of a descriptor.

use std::iter::FusedIterator;

use crate::dimension::Dimension;

/// Iterator over every valid index tuple of a descriptor, in storage order
/// (axis 0 varies fastest).
///
/// Created by [`Descriptor::indices`](crate::Descriptor::indices).
#[derive(Debug, Clone)]
pub struct Indices<const RANK: usize> {
    dims: [Dimension; RANK],
    next: Option<[i64; RANK]>,
    remaining: usize,
}

impl<const RANK: usize> Indices<RANK> {
    pub(crate) fn new(dims: [Dimension; RANK], element_count: i64) -> Indices<RANK> {
        if element_count == 0 {
            return Indices {
                dims,
                next: None,
                remaining: 0,
            };
        }
        Indices {
            next: Some(dims.map(|dim| dim.lower_bound())),
            dims,
            remaining: usize::try_from(element_count).unwrap_or(usize::MAX),
        }
    }

    fn advance(&self, current: &[i64; RANK]) -> Option<[i64; RANK]> {
        let mut next = *current;
        for (i, dim) in next.iter_mut().zip(&self.dims) {
            if *i < dim.upper_bound() {
                *i += 1;
                return Some(next);
            }
            *i = dim.lower_bound();
        }
        None
    }
}

impl<const RANK: usize> Iterator for Indices<RANK> {
    type Item = [i64; RANK];

    fn next(&mut self) -> Option<[i64; RANK]> {
        let current = self.next?;
        self.next = self.advance(&current);
        self.remaining = self.remaining.saturating_sub(1);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const RANK: usize> ExactSizeIterator for Indices<RANK> {}

impl<const RANK: usize> FusedIterator for Indices<RANK> {}
