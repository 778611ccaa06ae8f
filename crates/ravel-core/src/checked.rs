//! Bounds- and lifecycle-checked wrapper over a strided indexer.
//!
//! The core accessors are unchecked. Embeddings that want
//! errors instead of storage-boundary panics wrap the indexer here and pay
//! the validation cost on every call. Coordinates are strict full-rank.

use crate::codec::CellCodec;
use crate::indexer::StridedIndexer;
use crate::{RavelError, Result};

/// Checked view over a [`StridedIndexer`].
pub struct Checked<'a, C: CellCodec> {
    inner: StridedIndexer<'a, C>,
}

impl<'a, C: CellCodec> Checked<'a, C> {
    /// Wrap `inner`, verifying the buffer covers the layout footprint.
    pub fn new(inner: StridedIndexer<'a, C>) -> Result<Self> {
        let footprint = inner.layout().footprint();
        let len = inner.cells().len();
        if len < footprint {
            return Err(RavelError::StorageTooSmall { len, footprint });
        }
        Ok(Self { inner })
    }

    /// Read one element at a full-rank coordinate.
    pub fn get(&self, indices: &[usize]) -> Result<f32> {
        let offset = self.offset_of(indices)?;
        Ok(self.inner.get(offset))
    }

    /// Write one element at a full-rank coordinate.
    pub fn put(&mut self, indices: &[usize], value: f32) -> Result<()> {
        let offset = self.offset_of(indices)?;
        self.inner.put(offset, value);
        Ok(())
    }

    /// Read a run of `dst.len()` consecutive cells starting at a full-rank
    /// coordinate.
    pub fn get_run(&self, indices: &[usize], dst: &mut [f32]) -> Result<()> {
        let base = self.run_base(indices, dst.len())?;
        for (n, d) in dst.iter_mut().enumerate() {
            *d = self.inner.get(base + n);
        }
        Ok(())
    }

    /// Write a run of `src.len()` consecutive cells starting at a
    /// full-rank coordinate.
    pub fn put_run(&mut self, indices: &[usize], src: &[f32]) -> Result<()> {
        let base = self.run_base(indices, src.len())?;
        for (n, &value) in src.iter().enumerate() {
            self.inner.put(base + n, value);
        }
        Ok(())
    }

    /// The wrapped indexer.
    pub fn inner(&self) -> &StridedIndexer<'a, C> {
        &self.inner
    }

    /// The wrapped indexer, mutable.
    pub fn inner_mut(&mut self) -> &mut StridedIndexer<'a, C> {
        &mut self.inner
    }

    /// Unwrap back into the unchecked indexer.
    pub fn into_inner(self) -> StridedIndexer<'a, C> {
        self.inner
    }

    fn offset_of(&self, indices: &[usize]) -> Result<usize> {
        if self.inner.is_released() {
            return Err(RavelError::Released);
        }
        let sizes = self.inner.sizes();
        if indices.len() != sizes.len() {
            return Err(RavelError::RankMismatch {
                got: indices.len(),
                rank: sizes.len(),
            });
        }
        for (axis, (&index, &size)) in indices.iter().zip(sizes).enumerate() {
            if index >= size {
                return Err(RavelError::AxisOutOfBounds { axis, index, size });
            }
        }
        let offset = self.inner.layout().offset(indices);
        let len = self.inner.cells().len();
        if offset >= len {
            return Err(RavelError::OffsetOutOfBounds { offset, len });
        }
        Ok(offset)
    }

    fn run_base(&self, indices: &[usize], run: usize) -> Result<usize> {
        let base = self.offset_of(indices)?;
        let len = self.inner.cells().len();
        let end = base.saturating_add(run);
        if end > len {
            return Err(RavelError::OffsetOutOfBounds {
                offset: end - 1,
                len,
            });
        }
        Ok(base)
    }
}
