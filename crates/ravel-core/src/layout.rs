//! Sizes, strides, and coordinate-to-offset arithmetic.

use std::fmt;

use smallvec::SmallVec;

/// Sizes and strides of one strided view, with stack-allocated storage for
/// rank ≤ 4 (the overwhelmingly common case).
///
/// Both vectors are stored verbatim and never validated against each other
/// or against any backing buffer; the caller guarantees consistency.
/// Strides count storage cells per unit step along a dimension: stride 0
/// yields a broadcast dimension, non-default strides yield non-contiguous
/// views.
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    sizes: SmallVec<[usize; 4]>,
    strides: SmallVec<[usize; 4]>,
}

impl Layout {
    /// Layout with caller-supplied strides, stored verbatim.
    pub fn with_strides(sizes: &[usize], strides: &[usize]) -> Self {
        Self {
            sizes: SmallVec::from_slice(sizes),
            strides: SmallVec::from_slice(strides),
        }
    }

    /// Contiguous row-major layout for `sizes`.
    pub fn row_major(sizes: &[usize]) -> Self {
        Self {
            sizes: SmallVec::from_slice(sizes),
            strides: Self::row_major_strides(sizes),
        }
    }

    /// Default row-major strides: `strides[r-1] = 1`,
    /// `strides[d] = strides[d+1] * sizes[d+1]`.
    pub fn row_major_strides(sizes: &[usize]) -> SmallVec<[usize; 4]> {
        let rank = sizes.len();
        let mut strides = SmallVec::from_elem(1usize, rank);
        for d in (0..rank.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * sizes[d + 1];
        }
        strides
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    /// Dimension sizes.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Cells to advance per unit step along each dimension.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of logical elements.
    pub fn numel(&self) -> usize {
        self.sizes.iter().product()
    }

    /// Minimum cell count a buffer needs to back every coordinate:
    /// `1 + Σ (sizes[d] - 1) * strides[d]`, or 0 if any dimension is empty.
    pub fn footprint(&self) -> usize {
        if self.sizes.iter().any(|&s| s == 0) {
            return 0;
        }
        1 + self
            .sizes
            .iter()
            .zip(&self.strides)
            .map(|(&size, &stride)| (size - 1) * stride)
            .sum::<usize>()
    }

    /// Whether strides equal the row-major defaults for these sizes.
    pub fn is_contiguous(&self) -> bool {
        self.strides == Self::row_major_strides(&self.sizes)
    }

    /// Flat storage offset for a coordinate: the dot product of coordinate
    /// components and strides, folded over the coordinate length.
    ///
    /// Coordinates may be shorter than the rank (the tail then addresses a
    /// contiguous region through the leading strides) or longer; components
    /// past the last dimension ride `strides[rank-1]`, or a unit stride for
    /// rank-1 layouts.
    #[inline]
    pub fn offset(&self, coords: &[usize]) -> usize {
        let rank = self.strides.len();
        let mut offset = 0;
        for (d, &c) in coords.iter().enumerate() {
            let stride = if d < rank {
                self.strides[d]
            } else if rank > 1 {
                self.strides[rank - 1]
            } else {
                1
            };
            offset += c * stride;
        }
        offset
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout(sizes={:?}, strides={:?})",
            self.sizes.as_slice(),
            self.strides.as_slice()
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.sizes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "] / [")?;
        for (i, s) in self.strides.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_strides() {
        let strides = Layout::row_major_strides(&[2, 3, 4]);
        assert_eq!(strides.as_slice(), &[12, 4, 1]);
        assert_eq!(Layout::row_major_strides(&[7]).as_slice(), &[1]);
    }

    #[test]
    fn test_row_major_offset_is_flat_index() {
        let l = Layout::row_major(&[3, 4, 5]);
        let mut flat = 0;
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..5 {
                    assert_eq!(l.offset(&[i, j, k]), flat);
                    flat += 1;
                }
            }
        }
    }

    #[test]
    fn test_offset_partial_coordinate() {
        let l = Layout::row_major(&[3, 4, 5]);
        // [i, j] lands on the start of row (i, j)
        assert_eq!(l.offset(&[2, 3]), 2 * 20 + 3 * 5);
        assert_eq!(l.offset(&[1]), 20);
    }

    #[test]
    fn test_offset_beyond_rank_rides_last_stride() {
        let l = Layout::with_strides(&[2, 2], &[6, 3]);
        assert_eq!(l.offset(&[1, 1, 1]), 6 + 3 + 3);

        // rank-1 layouts use a unit stride for the overflow component
        let l1 = Layout::with_strides(&[4], &[2]);
        assert_eq!(l1.offset(&[1, 3]), 2 + 3);
    }

    #[test]
    fn test_custom_strides() {
        let l = Layout::with_strides(&[2, 2], &[1, 2]);
        assert!(!l.is_contiguous());
        assert_eq!(l.offset(&[1, 1]), 3);
    }

    #[test]
    fn test_broadcast_stride_zero() {
        let l = Layout::with_strides(&[4, 3], &[0, 1]);
        assert_eq!(l.offset(&[3, 2]), 2);
        assert_eq!(l.footprint(), 3);
    }

    #[test]
    fn test_numel_and_footprint() {
        let l = Layout::row_major(&[2, 3, 4]);
        assert_eq!(l.numel(), 24);
        assert_eq!(l.footprint(), 24);

        let padded = Layout::with_strides(&[2, 3], &[8, 1]);
        assert_eq!(padded.numel(), 6);
        assert_eq!(padded.footprint(), 11);

        let empty = Layout::row_major(&[2, 0]);
        assert_eq!(empty.numel(), 0);
        assert_eq!(empty.footprint(), 0);
    }

    #[test]
    fn test_contiguous() {
        assert!(Layout::row_major(&[2, 3]).is_contiguous());
        assert!(Layout::with_strides(&[2, 3], &[3, 1]).is_contiguous());
        assert!(!Layout::with_strides(&[2, 3], &[4, 1]).is_contiguous());
    }

    #[test]
    fn test_display() {
        let l = Layout::row_major(&[2, 3]);
        assert_eq!(format!("{l}"), "[2, 3] / [3, 1]");
    }
}
