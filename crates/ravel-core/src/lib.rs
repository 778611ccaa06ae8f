//! # ravel-core
//!
//! Strided, multi-dimensional, random-access indexing over flat buffers of
//! compact float cells.
//!
//! A [`StridedIndexer`] addresses elements of a flat cell buffer by
//! N-dimensional coordinate instead of flat offset, converting between the
//! storage encoding and working `f32` values on every access:
//! - bfloat16 cells ([`Bf16Indexer`]): the upper 16 bits of an `f32`
//! - IEEE 754 half-precision cells ([`F16Indexer`])
//! - full-width `f32` cells ([`F32Indexer`])
//!
//! Addressing supports arbitrary rank, size and stride, including
//! non-contiguous and broadcast (stride-0) layouts. The hot accessor path
//! is unchecked and allocation-free; the [`checked`] module layers bounds
//! and lifecycle validation on top for embeddings that want errors instead
//! of storage-boundary panics.

pub mod bf16;
pub mod codec;
pub mod buffer;
pub mod layout;
pub mod indexer;
pub mod checked;
pub mod error;
pub mod prelude;

pub use codec::{Bf16, CellCodec, F16, F32};
pub use buffer::CellBuffer;
pub use layout::Layout;
pub use indexer::{Bf16Indexer, F16Indexer, F32Indexer, Indexer, StridedIndexer};
pub use checked::Checked;
pub use error::RavelError;

pub type Result<T> = std::result::Result<T, RavelError>;
