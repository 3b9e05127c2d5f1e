//! quadseg - Quadtree split-and-merge segmentation for Rust
//!
//! Partitions a rectangular region of a raster into homogeneous regions
//! by recursive quartering followed by merging of compatible siblings.
//!
//! # Overview
//!
//! - Multi-channel floating-point rasters ([`Field`]) and their windows
//! - Region statistics, direct or via integral images
//! - Quadtree splitting with pluggable homogeneity predicates
//! - Sibling merging and label maps
//! - Fixed-depth quadtree statistics
//! - Text serialization of region trees
//!
//! # Example
//!
//! ```
//! use quadseg::{Field, Rect};
//! use quadseg::region::{segment, PredicateKind, SplitMergeOptions};
//!
//! let mut field = Field::new(16, 16, 1).unwrap();
//! field.fill_rect(Rect::new(0, 8, 16, 8), &[1.0]).unwrap();
//!
//! let tree = segment(&field, &SplitMergeOptions::default(), PredicateKind::ZeroVariance).unwrap();
//! assert_eq!(tree.valid_leaf_count(), 2);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use quadseg_core::*;

// Re-export the segmentation crate as a module to avoid name conflicts
pub use quadseg_region as region;
