//! Axis-aligned sub-blocks of column-major arrays.

use meshtree_core::{element_count, Dims};
use smallvec::SmallVec;

/// A rectangular block of an array: 0-based start and per-axis count,
/// unit stride.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hyperslab {
    /// First index on each axis (0-based).
    pub start: Dims,
    /// Number of indices on each axis.
    pub count: Dims,
}

impl Hyperslab {
    /// The block covering all of an array with extents `dims`.
    pub fn full(dims: &[usize]) -> Self {
        Self {
            start: SmallVec::from_elem(0, dims.len()),
            count: dims.iter().copied().collect(),
        }
    }

    /// The block between inclusive 1-based corners `min` and `max`.
    ///
    /// Callers validate the corners first; an inverted axis yields a zero
    /// count.
    pub fn from_bounds(min: &[i64], max: &[i64]) -> Self {
        let start = min.iter().map(|&m| (m - 1).max(0) as usize).collect();
        let count = min
            .iter()
            .zip(max)
            .map(|(&lo, &hi)| (hi - lo + 1).max(0) as usize)
            .collect();
        Self { start, count }
    }

    /// Rank of the block.
    pub fn rank(&self) -> usize {
        self.count.len()
    }

    /// Number of elements in the block.
    pub fn element_count(&self) -> usize {
        element_count(&self.count)
    }

    /// Whether the block lies inside an array with extents `dims`.
    pub fn fits(&self, dims: &[usize]) -> bool {
        self.rank() == dims.len()
            && self.start.len() == self.count.len()
            && self
                .start
                .iter()
                .zip(&self.count)
                .zip(dims)
                .all(|((&s, &c), &d)| s + c <= d)
    }

    /// Whether the block covers all of an array with extents `dims`.
    pub fn covers(&self, dims: &[usize]) -> bool {
        self.fits(dims) && self.start.iter().all(|&s| s == 0) && self.count.as_slice() == dims
    }

    /// Linear offsets of the block's elements inside an array with
    /// extents `dims`, in column-major order of the block.
    pub fn offsets<'a>(&'a self, dims: &[usize]) -> SlabOffsets<'a> {
        let mut strides: Dims = SmallVec::with_capacity(dims.len());
        let mut stride = 1;
        for &d in dims {
            strides.push(stride);
            stride *= d;
        }
        SlabOffsets {
            slab: self,
            strides,
            counter: SmallVec::from_elem(0, self.rank()),
            remaining: self.element_count(),
        }
    }
}

/// Iterator returned by [`Hyperslab::offsets`].
pub struct SlabOffsets<'a> {
    slab: &'a Hyperslab,
    strides: Dims,
    counter: Dims,
    remaining: usize,
}

impl Iterator for SlabOffsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = (0..self.counter.len())
            .map(|i| (self.slab.start[i] + self.counter[i]) * self.strides[i])
            .sum();
        for i in 0..self.counter.len() {
            self.counter[i] += 1;
            if self.counter[i] < self.slab.count[i] {
                break;
            }
            self.counter[i] = 0;
        }
        self.remaining -= 1;
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SlabOffsets<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smallvec::smallvec;

    /// Offsets by decomposing each block position into per-axis indices.
    fn walk(dims: &[usize], start: &[usize], count: &[usize]) -> Vec<usize> {
        let total: usize = count.iter().product();
        (0..total)
            .map(|mut position| {
                let mut offset = 0;
                let mut stride = 1;
                for axis in 0..dims.len() {
                    offset += (start[axis] + position % count[axis]) * stride;
                    position /= count[axis];
                    stride *= dims[axis];
                }
                offset
            })
            .collect()
    }

    fn block() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
        prop::collection::vec(1usize..6, 1..4).prop_flat_map(|dims| {
            let axes: Vec<_> = dims
                .iter()
                .map(|&d| (0..d).prop_flat_map(move |s| (Just(s), 1..=d - s)))
                .collect();
            (Just(dims), axes)
        })
    }

    #[test]
    fn full_slab_enumerates_in_order() {
        let slab = Hyperslab::full(&[3, 2]);
        assert_eq!(slab.offsets(&[3, 2]).collect::<Vec<_>>(), [0, 1, 2, 3, 4, 5]);
        assert!(slab.covers(&[3, 2]));
    }

    #[test]
    fn interior_block_is_column_major() {
        // 4x3 array, block rows 2..=3, cols 2..=3 (1-based).
        let slab = Hyperslab::from_bounds(&[2, 2], &[3, 3]);
        assert_eq!(slab.start.as_slice(), &[1, 1]);
        assert_eq!(slab.count.as_slice(), &[2, 2]);
        assert_eq!(slab.offsets(&[4, 3]).collect::<Vec<_>>(), [5, 6, 9, 10]);
        assert!(!slab.covers(&[4, 3]));
    }

    #[test]
    fn fits_checks_rank_and_bounds() {
        let slab = Hyperslab {
            start: smallvec![2],
            count: smallvec![3],
        };
        assert!(slab.fits(&[5]));
        assert!(!slab.fits(&[4]));
        assert!(!slab.fits(&[5, 1]));
    }

    proptest! {
        #[test]
        fn offsets_match_index_walk((dims, axes) in block()) {
            let slab = Hyperslab {
                start: axes.iter().map(|a| a.0).collect(),
                count: axes.iter().map(|a| a.1).collect(),
            };
            prop_assert!(slab.fits(&dims));
            let got: Vec<usize> = slab.offsets(&dims).collect();
            prop_assert_eq!(got, walk(&dims, &slab.start, &slab.count));
        }
    }
}
