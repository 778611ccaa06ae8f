//! Convenience re-exports for common ravel-core types.
//!
//! ```rust
//! use ravel_core::prelude::*;
//! ```

pub use crate::Bf16Indexer;
pub use crate::F16Indexer;
pub use crate::F32Indexer;
pub use crate::StridedIndexer;
pub use crate::Indexer;
pub use crate::Layout;
pub use crate::CellBuffer;
pub use crate::Checked;
pub use crate::RavelError;
pub use crate::Result;
