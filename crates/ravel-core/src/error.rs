use thiserror::Error;

/// Errors reported by the checked accessor layer.
///
/// The unchecked core never returns these; out-of-range access there
/// fails at the storage boundary instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RavelError {
    #[error("index {index} out of bounds for axis {axis} of size {size}")]
    AxisOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },

    #[error("got {got} indices for a rank-{rank} layout")]
    RankMismatch { got: usize, rank: usize },

    #[error("flat offset {offset} exceeds storage of {len} cells")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("storage of {len} cells cannot back a layout addressing {footprint}")]
    StorageTooSmall { len: usize, footprint: usize },

    #[error("indexer was released")]
    Released,
}
