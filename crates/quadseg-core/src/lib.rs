//! quadseg Core - Basic data structures for quadtree segmentation
//!
//! This crate provides the fundamental data structures used throughout
//! the quadseg workspace:
//!
//! - [`Field`] / [`FieldView`] - Multi-channel floating-point raster and
//!   rectangular windows onto it
//! - [`Rect`] - Rectangle regions
//! - [`RegionStats`] - Per-channel mean and standard deviation
//! - [`IntegralImage`] - Summed area tables for O(1) rectangle statistics

pub mod error;
pub mod field;
pub mod integral;
pub mod rect;
pub mod stats;

pub use error::{Error, Result};
pub use field::{Field, FieldView};
pub use integral::IntegralImage;
pub use rect::Rect;
pub use stats::RegionStats;

/// Maximum number of interleaved channels in a [`Field`]
pub const MAX_CHANNELS: usize = 4;
