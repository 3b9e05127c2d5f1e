//! Split-and-merge pipeline
//!
//! Convenience entry points that run [`split`] followed by [`merge`] with
//! the same options and predicate.

use crate::error::RegionResult;
use crate::merge::merge;
use crate::predicate::{Predicate, PredicateKind};
use crate::split::{SplitMergeOptions, split};
use crate::tree::RegionTree;
use quadseg_core::{Field, Rect};

/// Split `roi` into a quadtree and merge compatible siblings
///
/// Equivalent to calling [`split`] then [`merge`] with the same arguments.
pub fn split_merge<P: Predicate + ?Sized>(
    field: &Field,
    roi: Rect,
    options: &SplitMergeOptions,
    predicate: &P,
) -> RegionResult<RegionTree> {
    let mut tree = split(field, roi, options, predicate)?;
    merge(field, &mut tree, options, predicate)?;
    Ok(tree)
}

/// Segment the whole field with a built-in predicate
///
/// # Examples
///
/// ```
/// use quadseg_core::{Field, Rect};
/// use quadseg_region::{segment, PredicateKind, SplitMergeOptions};
///
/// let mut field = Field::new(8, 8, 1).unwrap();
/// field.fill_rect(Rect::new(0, 0, 8, 4), &[200.0]).unwrap();
///
/// let tree = segment(&field, &SplitMergeOptions::default(), PredicateKind::ZeroVariance).unwrap();
/// assert_eq!(tree.valid_leaf_count(), 2);
/// ```
pub fn segment(
    field: &Field,
    options: &SplitMergeOptions,
    kind: PredicateKind,
) -> RegionResult<RegionTree> {
    split_merge(field, field.bounds(), options, &kind)
}
