//! Error types for quadseg-region

use crate::tree::RegionId;
use quadseg_core::Rect;
use thiserror::Error;

/// Errors that can occur during segmentation
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] quadseg_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Region of interest has zero area
    #[error("empty region of interest: {0}")]
    EmptyRoi(Rect),

    /// Region of interest does not lie inside the field
    #[error("region of interest {roi} out of bounds for {width}x{height} field")]
    RoiOutOfBounds { roi: Rect, width: u32, height: u32 },

    /// A region must be split but cannot be quartered evenly
    #[error("cannot quarter region {0}: odd width or height")]
    OddDimension(Rect),

    /// Region id does not belong to the tree
    #[error("invalid region id: {0}")]
    InvalidRegion(RegionId),

    /// Tree violates a structural invariant
    #[error("invalid region tree: {0}")]
    InvalidTree(String),

    /// Error raised by a homogeneity predicate
    #[error("predicate error: {0}")]
    Predicate(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
