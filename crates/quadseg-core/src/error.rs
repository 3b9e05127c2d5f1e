//! Error types for quadseg-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use crate::rect::Rect;
use thiserror::Error;

/// quadseg-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid raster dimensions
    #[error("invalid field dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Channel count outside the supported range
    #[error("invalid channel count: {0} (expected 1..={max})", max = crate::MAX_CHANNELS)]
    InvalidChannels(u32),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Rectangle does not lie inside the raster
    #[error("rectangle {rect} out of bounds for {width}x{height} field")]
    RectOutOfBounds { rect: Rect, width: u32, height: u32 },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed serialized data
    #[error("decode error: {0}")]
    DecodeError(String),
}

/// Result type alias for quadseg-core operations
pub type Result<T> = std::result::Result<T, Error>;
