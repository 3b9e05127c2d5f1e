//! Sibling merging
//!
//! After splitting, adjacent sibling leaves often belong to the same
//! homogeneous area. Merging walks the tree from a starting region and, at
//! every internal region with children `[TL, TR, BL, BR]`:
//!
//! 1. tries the row pairs `TL + TR` and `BL + BR` (both are attempted);
//! 2. only if neither row pair merged, tries the column pairs `TL + BL`
//!    and `TR + BR`;
//! 3. descends into every child that is itself internal.
//!
//! Merges never cross non-sibling regions. A successful merge widens the
//! first region to the union, recomputes its label, and marks the second
//! region as merged into the first. Merged regions remain in the tree.

use crate::error::{RegionError, RegionResult};
use crate::predicate::{Predicate, Subregion};
use crate::split::{SplitMergeOptions, build_integral, check_roi};
use crate::tree::{Label, RegionId, RegionTree};
use quadseg_core::{Field, IntegralImage};

struct MergeContext<'a, P: ?Sized> {
    field: &'a Field,
    integral: Option<&'a IntegralImage>,
    options: &'a SplitMergeOptions,
    predicate: &'a P,
}

impl<P: Predicate + ?Sized> MergeContext<'_, P> {
    /// Merge `second` into `first` if both are valid leaves that share a
    /// full edge and the predicate accepts their union
    fn try_merge(&self, tree: &mut RegionTree, first: RegionId, second: RegionId) -> RegionResult<bool> {
        let a = &tree[first];
        let b = &tree[second];
        if !a.is_leaf() || !b.is_leaf() || !a.is_valid() || !b.is_valid() {
            return Ok(false);
        }
        let Some(union) = a.rect().adjacent_union(&b.rect()) else {
            return Ok(false);
        };

        let region = Subregion::new(self.field.view(union)?, self.integral);
        if !self
            .predicate
            .is_homogeneous(&region, self.options.tolerance, self.options.min_size)?
        {
            return Ok(false);
        }

        let label = Label::from_stats(&region.stats()?);
        log::trace!("merge region {} into {} -> {}", second, first, union);
        tree.absorb(first, second, union, label);
        Ok(true)
    }
}

/// Merge compatible sibling leaves of the whole tree in place
///
/// Returns the number of merges performed. Use the same options and
/// predicate that built the tree; a different predicate is allowed but the
/// consistency of the result with the split is then the caller's concern.
///
/// # Errors
///
/// Returns an error for invalid options, a tree whose region of interest
/// does not fit `field`, or any error raised by the predicate.
///
/// # Examples
///
/// ```
/// use quadseg_core::{Field, Rect};
/// use quadseg_region::{merge, split, SplitMergeOptions, ZeroVariance};
///
/// let mut field = Field::new(4, 4, 1).unwrap();
/// field.fill_rect(Rect::new(0, 2, 4, 2), &[9.0]).unwrap();
/// let options = SplitMergeOptions::default();
///
/// let mut tree = split(&field, field.bounds(), &options, &ZeroVariance).unwrap();
/// assert_eq!(tree.valid_leaf_count(), 4);
///
/// let merges = merge(&field, &mut tree, &options, &ZeroVariance).unwrap();
/// assert_eq!(merges, 2);
/// assert_eq!(tree.valid_leaf_count(), 2);
/// ```
pub fn merge<P: Predicate + ?Sized>(
    field: &Field,
    tree: &mut RegionTree,
    options: &SplitMergeOptions,
    predicate: &P,
) -> RegionResult<usize> {
    let root = tree.root();
    merge_from(field, tree, root, options, predicate)
}

/// Merge compatible sibling leaves of the subtree rooted at `start`
///
/// A leaf `start` is a no-op.
pub fn merge_from<P: Predicate + ?Sized>(
    field: &Field,
    tree: &mut RegionTree,
    start: RegionId,
    options: &SplitMergeOptions,
    predicate: &P,
) -> RegionResult<usize> {
    options.validate()?;
    check_roi(field, tree.roi())?;
    tree.checked(start)?;
    if field.channels() != tree.channels() {
        return Err(RegionError::InvalidParameters(format!(
            "field has {} channels but the tree was built from {}",
            field.channels(),
            tree.channels()
        )));
    }

    let integral = build_integral(field, options);
    let ctx = MergeContext {
        field,
        integral: integral.as_ref(),
        options,
        predicate,
    };

    let mut merges = 0usize;
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let Some(&[tl, tr, bl, br]) = tree[id].children() else {
            continue;
        };

        let top = ctx.try_merge(tree, tl, tr)?;
        let bottom = ctx.try_merge(tree, bl, br)?;
        merges += top as usize + bottom as usize;
        if !top && !bottom {
            let left = ctx.try_merge(tree, tl, bl)?;
            let right = ctx.try_merge(tree, tr, br)?;
            merges += left as usize + right as usize;
        }

        for child in [br, bl, tr, tl] {
            if tree[child].is_internal() {
                stack.push(child);
            }
        }
    }

    log::debug!(
        "merge from region {}: {} merges, {} valid leaves",
        start,
        merges,
        tree.valid_leaf_count()
    );
    Ok(merges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{BoundedVariance, ZeroVariance};
    use crate::split::split;
    use quadseg_core::Rect;

    fn quadrants_4x4(values: [f32; 4]) -> Field {
        let mut field = Field::new(4, 4, 1).unwrap();
        for (rect, v) in Rect::new(0, 0, 4, 4).quadrants().into_iter().zip(values) {
            field.fill_rect(rect, &[v]).unwrap();
        }
        field
    }

    fn split_merge(field: &Field) -> (RegionTree, usize) {
        let options = SplitMergeOptions::default();
        let mut tree = split(field, field.bounds(), &options, &ZeroVariance).unwrap();
        let merges = merge(field, &mut tree, &options, &ZeroVariance).unwrap();
        (tree, merges)
    }

    #[test]
    fn test_top_row_merge() {
        let field = quadrants_4x4([5.0, 5.0, 1.0, 2.0]);
        let (tree, merges) = split_merge(&field);
        let [tl, tr, bl, br] = *tree[tree.root()].children().unwrap();

        assert_eq!(merges, 1);
        assert_eq!(tree.valid_leaf_count(), 3);
        assert_eq!(tree[tl].rect(), Rect::new(0, 0, 4, 2));
        assert_eq!(tree[tl].label().unwrap().value(0), 5.0);
        assert!(!tree[tr].is_valid());
        assert_eq!(tree[tr].merged_into(), Some(tl));
        assert!(tree[bl].is_valid());
        assert!(tree[br].is_valid());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_columns_only_when_rows_fail() {
        // Left column 3, right column 4: no row pair matches
        let field = quadrants_4x4([3.0, 4.0, 3.0, 4.0]);
        let (tree, merges) = split_merge(&field);
        let [tl, tr, bl, br] = *tree[tree.root()].children().unwrap();

        assert_eq!(merges, 2);
        assert_eq!(tree[tl].rect(), Rect::new(0, 0, 2, 4));
        assert_eq!(tree[tr].rect(), Rect::new(2, 0, 2, 4));
        assert_eq!(tree[bl].merged_into(), Some(tl));
        assert_eq!(tree[br].merged_into(), Some(tr));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_columns_skipped_after_row_merge() {
        // Top row merges, so the matching left column is never tried
        let field = quadrants_4x4([6.0, 6.0, 6.0, 1.0]);
        let (tree, merges) = split_merge(&field);
        let [tl, tr, bl, _] = *tree[tree.root()].children().unwrap();

        assert_eq!(merges, 1);
        assert_eq!(tree[tr].merged_into(), Some(tl));
        assert!(tree[bl].is_valid());
        assert_eq!(tree.valid_leaf_count(), 3);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let field = quadrants_4x4([5.0, 5.0, 1.0, 2.0]);
        let options = SplitMergeOptions::default();
        let (mut tree, _) = split_merge(&field);
        let before = tree.clone();

        let merges = merge(&field, &mut tree, &options, &ZeroVariance).unwrap();
        assert_eq!(merges, 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_merge_recurses_into_internal_children() {
        // 8x8: top-left quadrant holds a 2x2 pattern whose top row matches
        let mut field = Field::new_with_value(8, 8, 1, 0.0).unwrap();
        field.fill_rect(Rect::new(4, 0, 4, 4), &[1.0]).unwrap();
        field.fill_rect(Rect::new(0, 4, 4, 4), &[2.0]).unwrap();
        field.fill_rect(Rect::new(4, 4, 4, 4), &[3.0]).unwrap();
        field.fill_rect(Rect::new(0, 2, 2, 2), &[7.0]).unwrap();
        field.fill_rect(Rect::new(2, 2, 2, 2), &[8.0]).unwrap();

        let (tree, merges) = split_merge(&field);
        let [tl, ..] = *tree[tree.root()].children().unwrap();
        assert!(tree[tl].is_internal());
        let [tl_tl, tl_tr, _, _] = *tree[tl].children().unwrap();

        // Only the nested top row (both 0.0) merges; root-level siblings differ
        assert_eq!(merges, 1);
        assert_eq!(tree[tl_tl].rect(), Rect::new(0, 0, 4, 2));
        assert_eq!(tree[tl_tr].merged_into(), Some(tl_tl));
        assert_eq!(tree.valid_leaf_count(), 6);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_internal_siblings_not_merged() {
        let field = Field::from_fn(4, 4, |x, y| (x + 4 * y) as f32).unwrap();
        let (tree, merges) = split_merge(&field);
        assert_eq!(merges, 0);
        assert_eq!(tree.valid_leaf_count(), 16);
    }

    #[test]
    fn test_merge_leaf_start_is_noop() {
        let field = Field::new_with_value(4, 4, 1, 1.0).unwrap();
        let options = SplitMergeOptions::default();
        let mut tree = split(&field, field.bounds(), &options, &ZeroVariance).unwrap();
        let root = tree.root();
        assert_eq!(
            merge_from(&field, &mut tree, root, &options, &ZeroVariance).unwrap(),
            0
        );
    }

    #[test]
    fn test_merge_with_bounded_variance() {
        // Quadrant means differ by less than the tolerance
        let field = quadrants_4x4([10.0, 11.0, 50.0, 52.0]);
        let options = SplitMergeOptions::new(1.0, 1);
        let mut tree = split(&field, field.bounds(), &options, &BoundedVariance).unwrap();
        let merges = merge(&field, &mut tree, &options, &BoundedVariance).unwrap();

        // Top pair has std dev 0.5, bottom pair 1.0: both within tolerance
        assert_eq!(merges, 2);
        assert_eq!(tree.valid_leaf_count(), 2);
        let [tl, _, bl, _] = *tree[tree.root()].children().unwrap();
        assert_eq!(tree[tl].label().unwrap().value(0), 10.5);
        assert_eq!(tree[bl].label().unwrap().value(0), 51.0);
    }

    #[test]
    fn test_merge_rejects_mismatched_field() {
        let field = Field::new(4, 4, 1).unwrap();
        let options = SplitMergeOptions::default();
        let mut tree = split(&field, field.bounds(), &options, &ZeroVariance).unwrap();

        let small = Field::new(2, 2, 1).unwrap();
        assert!(matches!(
            merge(&small, &mut tree, &options, &ZeroVariance),
            Err(RegionError::RoiOutOfBounds { .. })
        ));
        let color = Field::new(4, 4, 3).unwrap();
        assert!(matches!(
            merge(&color, &mut tree, &options, &ZeroVariance),
            Err(RegionError::InvalidParameters(_))
        ));
    }
}
