//! Strided indexers: coordinate addressing plus per-element codec.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::Zeroable;

use crate::buffer::CellBuffer;
use crate::codec::{Bf16, CellCodec, F16, F32};
use crate::layout::Layout;

/// Capability surface shared by every indexer variant.
///
/// Object-safe so an embedding can hold one `Box<dyn Indexer>` per tensor
/// and dispatch on storage width at runtime. [`as_bytes`](Self::as_bytes)
/// stands in for the cell-typed buffer accessor, which lives on the
/// concrete type.
pub trait Indexer {
    /// Dimension sizes of the view.
    fn sizes(&self) -> &[usize];

    /// Strides of the view, in cells.
    fn strides(&self) -> &[usize];

    /// Read one element at a generic coordinate.
    fn get_at(&self, indices: &[usize]) -> f32;

    /// Write one element at a generic coordinate.
    fn put_at(&mut self, indices: &[usize], value: f32);

    /// Read `dst.len()` elements from consecutive cells starting at a
    /// generic coordinate.
    fn get_run_at(&self, indices: &[usize], dst: &mut [f32]);

    /// Write `src.len()` elements into consecutive cells starting at a
    /// generic coordinate.
    fn put_run_at(&mut self, indices: &[usize], src: &[f32]);

    /// Raw byte view of the backing cells (empty after release).
    fn as_bytes(&self) -> &[u8];

    /// Drop the reference to the backing cells.
    fn release(&mut self);
}

/// Strided, random-access view over a flat buffer of encoded cells.
///
/// Addresses elements by N-dimensional coordinate and converts between the
/// cell encoding and working `f32` values on every access. The accessor
/// path is unchecked and allocation-free: an out-of-range offset fails at
/// the slice boundary, and any access after [`release`](Self::release)
/// hits the empty slice. Wrap in [`Checked`](crate::checked::Checked)
/// where that contract is too sharp.
///
/// # Examples
///
/// ```
/// use ravel_core::Bf16Indexer;
///
/// let mut ix = Bf16Indexer::zeros(&[2, 2]);
/// ix.put2(1, 1, 1.5);
/// assert_eq!(ix.get2(1, 1), 1.5);
/// ```
pub struct StridedIndexer<'a, C: CellCodec> {
    cells: CellBuffer<'a, C::Cell>,
    layout: Layout,
    codec: PhantomData<C>,
}

/// Indexer over truncated single-precision (bfloat16) cells.
pub type Bf16Indexer<'a> = StridedIndexer<'a, Bf16>;
/// Indexer over IEEE 754 half-precision cells.
pub type F16Indexer<'a> = StridedIndexer<'a, F16>;
/// Indexer over full-width `f32` cells.
pub type F32Indexer<'a> = StridedIndexer<'a, F32>;

impl<'a, C: CellCodec> StridedIndexer<'a, C> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Fully contiguous 1-D view over `cells`: sizes `[len]`, strides `[1]`.
    pub fn new(cells: impl Into<CellBuffer<'a, C::Cell>>) -> Self {
        let cells = cells.into();
        let layout = Layout::row_major(&[cells.len()]);
        Self {
            cells,
            layout,
            codec: PhantomData,
        }
    }

    /// View with row-major strides computed from `sizes`.
    pub fn with_sizes(cells: impl Into<CellBuffer<'a, C::Cell>>, sizes: &[usize]) -> Self {
        Self {
            cells: cells.into(),
            layout: Layout::row_major(sizes),
            codec: PhantomData,
        }
    }

    /// View with caller-supplied strides, stored verbatim.
    ///
    /// Nothing is validated; the caller guarantees the buffer covers every
    /// reachable offset.
    pub fn with_strides(
        cells: impl Into<CellBuffer<'a, C::Cell>>,
        sizes: &[usize],
        strides: &[usize],
    ) -> Self {
        Self {
            cells: cells.into(),
            layout: Layout::with_strides(sizes, strides),
            codec: PhantomData,
        }
    }

    /// Owned, zero-filled, row-major view for `sizes`.
    pub fn zeros(sizes: &[usize]) -> Self {
        let layout = Layout::row_major(sizes);
        let cells = vec![C::Cell::zeroed(); layout.numel()];
        Self {
            cells: CellBuffer::Owned(cells),
            layout,
            codec: PhantomData,
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Layout of this view.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Dimension sizes.
    pub fn sizes(&self) -> &[usize] {
        self.layout.sizes()
    }

    /// Strides, in cells.
    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    /// Total number of logical elements.
    pub fn numel(&self) -> usize {
        self.layout.numel()
    }

    /// Whether [`release`](Self::release) was called.
    pub fn is_released(&self) -> bool {
        self.cells.is_released()
    }

    // =========================================================================
    // Scalar access
    // =========================================================================

    /// Read the element at flat index `i`.
    #[inline]
    pub fn get(&self, i: usize) -> f32 {
        C::decode(self.cells.as_slice()[i])
    }

    /// Write the element at flat index `i`.
    #[inline]
    pub fn put(&mut self, i: usize, value: f32) {
        self.cells.as_mut_slice()[i] = C::encode(value);
    }

    /// Read at `i * strides[0] + j`.
    ///
    /// `j` is a flat term, not multiplied by a stride: it can reach past
    /// row `i` for ragged or partial use.
    #[inline]
    pub fn get2(&self, i: usize, j: usize) -> f32 {
        let s = self.layout.strides();
        C::decode(self.cells.as_slice()[i * s[0] + j])
    }

    /// Write at `i * strides[0] + j`.
    #[inline]
    pub fn put2(&mut self, i: usize, j: usize, value: f32) {
        let s = self.layout.strides();
        let offset = i * s[0] + j;
        self.cells.as_mut_slice()[offset] = C::encode(value);
    }

    /// Read at `i * strides[0] + j * strides[1] + k`.
    #[inline]
    pub fn get3(&self, i: usize, j: usize, k: usize) -> f32 {
        let s = self.layout.strides();
        C::decode(self.cells.as_slice()[i * s[0] + j * s[1] + k])
    }

    /// Write at `i * strides[0] + j * strides[1] + k`.
    #[inline]
    pub fn put3(&mut self, i: usize, j: usize, k: usize, value: f32) {
        let s = self.layout.strides();
        let offset = i * s[0] + j * s[1] + k;
        self.cells.as_mut_slice()[offset] = C::encode(value);
    }

    /// Read at a generic coordinate (see [`Layout::offset`]).
    #[inline]
    pub fn get_at(&self, indices: &[usize]) -> f32 {
        C::decode(self.cells.as_slice()[self.layout.offset(indices)])
    }

    /// Write at a generic coordinate.
    #[inline]
    pub fn put_at(&mut self, indices: &[usize], value: f32) {
        let offset = self.layout.offset(indices);
        self.cells.as_mut_slice()[offset] = C::encode(value);
    }

    // =========================================================================
    // Bulk access
    // =========================================================================
    //
    // Runs always advance one cell per element regardless of the declared
    // strides; the caller guarantees the addressed cells are consecutive in
    // the intended layout.

    /// Read `dst.len()` elements starting at cell `i * strides[0]`.
    #[inline]
    pub fn get_run(&self, i: usize, dst: &mut [f32]) {
        self.read_run(i * self.layout.strides()[0], dst);
    }

    /// Write `src.len()` elements starting at cell `i * strides[0]`.
    #[inline]
    pub fn put_run(&mut self, i: usize, src: &[f32]) {
        self.write_run(i * self.layout.strides()[0], src);
    }

    /// Read `dst.len()` elements starting at cell
    /// `i * strides[0] + j * strides[1]`.
    #[inline]
    pub fn get_run2(&self, i: usize, j: usize, dst: &mut [f32]) {
        let s = self.layout.strides();
        self.read_run(i * s[0] + j * s[1], dst);
    }

    /// Write `src.len()` elements starting at cell
    /// `i * strides[0] + j * strides[1]`.
    #[inline]
    pub fn put_run2(&mut self, i: usize, j: usize, src: &[f32]) {
        let s = self.layout.strides();
        let base = i * s[0] + j * s[1];
        self.write_run(base, src);
    }

    /// Read `dst.len()` elements starting at a generic coordinate.
    #[inline]
    pub fn get_run_at(&self, indices: &[usize], dst: &mut [f32]) {
        self.read_run(self.layout.offset(indices), dst);
    }

    /// Write `src.len()` elements starting at a generic coordinate.
    #[inline]
    pub fn put_run_at(&mut self, indices: &[usize], src: &[f32]) {
        let base = self.layout.offset(indices);
        self.write_run(base, src);
    }

    #[inline]
    fn read_run(&self, base: usize, dst: &mut [f32]) {
        let cells = &self.cells.as_slice()[base..base + dst.len()];
        for (d, &cell) in dst.iter_mut().zip(cells) {
            *d = C::decode(cell);
        }
    }

    #[inline]
    fn write_run(&mut self, base: usize, src: &[f32]) {
        let cells = &mut self.cells.as_mut_slice()[base..base + src.len()];
        for (cell, &value) in cells.iter_mut().zip(src) {
            *cell = C::encode(value);
        }
    }

    // =========================================================================
    // Interop & lifecycle
    // =========================================================================

    /// Live reference to the backing cells; the slice aliases the
    /// indexer's own storage, nothing is copied.
    ///
    /// Empty after [`release`](Self::release).
    pub fn cells(&self) -> &[C::Cell] {
        self.cells.as_slice()
    }

    /// Mutable live reference to the backing cells.
    ///
    /// Mutations are visible to every subsequent accessor.
    pub fn cells_mut(&mut self) -> &mut [C::Cell] {
        self.cells.as_mut_slice()
    }

    /// Backing cells as raw bytes, for zero-copy serialization or transfer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.cells.as_slice())
    }

    /// Backing cells as mutable raw bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.cells.as_mut_slice())
    }

    /// Drop the reference to the backing cells.
    ///
    /// Owned cells are freed; borrowed cells return to the caller
    /// untouched. Accessors called afterwards hit the empty slice and
    /// panic at the storage boundary; sequence `release` after all other
    /// use.
    pub fn release(&mut self) {
        self.cells.release();
    }
}

impl<C: CellCodec> Indexer for StridedIndexer<'_, C> {
    fn sizes(&self) -> &[usize] {
        self.layout.sizes()
    }

    fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    fn get_at(&self, indices: &[usize]) -> f32 {
        StridedIndexer::get_at(self, indices)
    }

    fn put_at(&mut self, indices: &[usize], value: f32) {
        StridedIndexer::put_at(self, indices, value);
    }

    fn get_run_at(&self, indices: &[usize], dst: &mut [f32]) {
        StridedIndexer::get_run_at(self, indices, dst);
    }

    fn put_run_at(&mut self, indices: &[usize], src: &[f32]) {
        StridedIndexer::put_run_at(self, indices, src);
    }

    fn as_bytes(&self) -> &[u8] {
        StridedIndexer::as_bytes(self)
    }

    fn release(&mut self) {
        StridedIndexer::release(self);
    }
}

impl<C: CellCodec> fmt::Debug for StridedIndexer<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StridedIndexer(layout={}, cells={}, released={})",
            self.layout,
            self.cells.len(),
            self.is_released(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bf16;

    #[test]
    fn test_1d_default_layout() {
        let ix = Bf16Indexer::new(vec![0u16; 6]);
        assert_eq!(ix.sizes(), &[6]);
        assert_eq!(ix.strides(), &[1]);
        assert_eq!(ix.numel(), 6);
    }

    #[test]
    fn test_scalar_get_put() {
        let mut ix = Bf16Indexer::new(vec![0u16; 4]);
        ix.put(2, 1.5);
        assert_eq!(ix.get(2), 1.5);
        assert_eq!(ix.cells()[2], bf16::from_f32(1.5));
    }

    #[test]
    fn test_2x2_row_major_scenario() {
        let mut ix = Bf16Indexer::with_strides(vec![0u16; 4], &[2, 2], &[2, 1]);
        ix.put2(1, 1, 1.5);
        // 1.5 is exactly representable in bfloat16
        assert_eq!(ix.get2(1, 1), 1.5);
        assert_eq!(ix.cells(), &[0, 0, 0, 0x3FC0]);
    }

    #[test]
    fn test_get2_is_flat_in_j() {
        let cells: Vec<u16> = (0..6).map(|n| bf16::from_f32(n as f32)).collect();
        let ix = Bf16Indexer::with_sizes(cells, &[2, 3]);
        // j reaches past row 0's extent
        assert_eq!(ix.get2(0, 4), 4.0);
    }

    #[test]
    fn test_get3() {
        let cells: Vec<u16> = (0..24).map(|n| bf16::from_f32(n as f32)).collect();
        let ix = Bf16Indexer::with_sizes(cells, &[2, 3, 4]);
        assert_eq!(ix.get3(1, 2, 3), 23.0);
        assert_eq!(ix.get_at(&[1, 2, 3]), 23.0);
    }

    #[test]
    fn test_put_at_generic() {
        let mut ix = Bf16Indexer::zeros(&[2, 3, 4]);
        ix.put_at(&[1, 0, 2], 2.5);
        assert_eq!(ix.get(14), 2.5);
    }

    #[test]
    fn test_bulk_matches_scalar() {
        let cells: Vec<u16> = (0..12).map(|n| bf16::from_f32(n as f32 * 0.25)).collect();
        let ix = Bf16Indexer::with_sizes(cells, &[3, 4]);

        let mut run = [0.0f32; 4];
        ix.get_run(2, &mut run);
        let base = 2 * 4;
        for (n, &v) in run.iter().enumerate() {
            assert_eq!(v, ix.get(base + n));
        }

        let mut run2 = [0.0f32; 2];
        ix.get_run2(1, 2, &mut run2);
        assert_eq!(run2, [ix.get(6), ix.get(7)]);
    }

    #[test]
    fn test_bulk_put() {
        let mut ix = Bf16Indexer::zeros(&[2, 4]);
        ix.put_run(1, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ix.get2(1, 0), 1.0);
        assert_eq!(ix.get2(1, 3), 4.0);

        ix.put_run_at(&[0, 1], &[9.0, 10.0]);
        assert_eq!(ix.get(1), 9.0);
        assert_eq!(ix.get(2), 10.0);
    }

    #[test]
    fn test_write_read_idempotent() {
        let mut ix = Bf16Indexer::zeros(&[4]);
        let v = 3.14159f32;
        ix.put(0, v);
        let once = ix.get(0);
        assert_eq!(once, bf16::to_f32(bf16::from_f32(v)));
        // writing the already-decoded value back changes nothing
        ix.put(1, once);
        assert_eq!(ix.cells()[0], ix.cells()[1]);
    }

    #[test]
    fn test_borrowed_buffer() {
        let mut cells = [0u16; 4];
        {
            let mut ix = Bf16Indexer::with_sizes(cells.as_mut_slice(), &[2, 2]);
            ix.put2(0, 1, 1.0);
        }
        assert_eq!(cells[1], bf16::ONE);
    }

    #[test]
    fn test_release() {
        let mut ix = Bf16Indexer::zeros(&[2, 2]);
        ix.release();
        assert!(ix.is_released());
        assert!(ix.cells().is_empty());
        assert!(ix.as_bytes().is_empty());
    }

    #[test]
    fn test_as_bytes_width() {
        let ix = Bf16Indexer::zeros(&[3]);
        assert_eq!(ix.as_bytes().len(), 6);
        let fx = F32Indexer::zeros(&[3]);
        assert_eq!(fx.as_bytes().len(), 12);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics_at_storage_boundary() {
        let ix = Bf16Indexer::new(vec![0u16; 2]);
        ix.get(2);
    }
}
