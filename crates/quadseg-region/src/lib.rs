//! quadseg-region - Quadtree split-and-merge segmentation
//!
//! This crate partitions a rectangular region of a [`Field`](quadseg_core::Field)
//! into homogeneous regions:
//!
//! - **Splitting** - Recursive quartering until every leaf satisfies a homogeneity predicate
//! - **Merging** - Fusing adjacent sibling leaves whose union is still homogeneous
//! - **Predicates** - Built-in zero-variance and bounded-variance tests, or any closure
//! - **Serialization** - Text format for storing and reloading region trees
//!
//! # Examples
//!
//! ## Split and merge
//!
//! ```
//! use quadseg_region::{split_merge, SplitMergeOptions, ZeroVariance};
//! use quadseg_core::{Field, Rect};
//!
//! // Left half dark, right half bright
//! let mut field = Field::new(8, 8, 1).unwrap();
//! field.fill_rect(Rect::new(4, 0, 4, 8), &[255.0]).unwrap();
//!
//! let tree = split_merge(&field, field.bounds(), &SplitMergeOptions::default(), &ZeroVariance)
//!     .unwrap();
//! assert_eq!(tree.valid_leaf_count(), 2);
//! ```
//!
//! ## Custom predicate
//!
//! ```
//! use quadseg_region::{split, RegionResult, SplitMergeOptions, Subregion};
//! use quadseg_core::Field;
//!
//! let field = Field::from_fn(8, 8, |x, _| x as f32).unwrap();
//!
//! // Accept any region whose horizontal extent is at most 2
//! let narrow = |r: &Subregion<'_>, _tol: f64, _min: u64| -> RegionResult<bool> {
//!     Ok(r.rect().w <= 2)
//! };
//! let tree = split(&field, field.bounds(), &SplitMergeOptions::default(), &narrow).unwrap();
//! assert_eq!(tree.leaf_count(), 16);
//! ```
//!
//! ## Label map
//!
//! ```
//! use quadseg_region::{segment, PredicateKind, SplitMergeOptions};
//! use quadseg_core::{Field, Rect};
//!
//! let mut field = Field::new(4, 4, 1).unwrap();
//! field.fill_rect(Rect::new(0, 2, 4, 2), &[1.0]).unwrap();
//!
//! let tree = segment(&field, &SplitMergeOptions::default(), PredicateKind::ZeroVariance).unwrap();
//! let labels = tree.label_map();
//! assert_eq!(labels[0], labels[3]);
//! assert_ne!(labels[0], labels[15]);
//! ```

pub mod error;
pub mod merge;
pub mod predicate;
pub mod segment;
pub mod serial;
pub mod split;
pub mod tree;

// Re-export core types
pub use quadseg_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

// Re-export tree types
pub use tree::{Label, Leaves, Region, RegionId, RegionTree};

// Re-export predicates
pub use predicate::{BoundedVariance, Predicate, PredicateKind, Subregion, ZeroVariance};

// Re-export split types and functions
pub use split::{
    DEFAULT_MIN_SIZE, DEFAULT_TOLERANCE, QuarterPolicy, SplitMergeOptions, StatsMode, split,
};

// Re-export merge functions
pub use merge::{merge, merge_from};

// Re-export pipeline functions
pub use segment::{segment, split_merge};
