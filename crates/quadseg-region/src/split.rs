//! Quadtree splitting
//!
//! Recursively partitions a region of interest into quadrants until every
//! leaf satisfies a homogeneity [`Predicate`] or can no longer be
//! quartered. The result is a [`RegionTree`] whose leaves tile the region
//! of interest exactly.

use crate::error::{RegionError, RegionResult};
use crate::predicate::{Predicate, Subregion};
use crate::tree::{Label, RegionId, RegionTree};
use quadseg_core::{Field, IntegralImage, Rect};

/// Default standard deviation tolerance for [`crate::BoundedVariance`]
pub const DEFAULT_TOLERANCE: f64 = 4.0;

/// Default minimum region area (in cells)
pub const DEFAULT_MIN_SIZE: u64 = 4;

/// What to do with a region that must be split but has odd sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuarterPolicy {
    /// Keep the region as a leaf when its width or height is odd
    #[default]
    ForceLeaf,
    /// Quarter with floor division; right and bottom quadrants take the
    /// remainder. Regions one cell wide or high become leaves.
    Floor,
    /// Fail with [`RegionError::OddDimension`]
    RequireEven,
}

/// How subregion statistics are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsMode {
    /// Scan the samples of every evaluated window
    #[default]
    Direct,
    /// Build an integral image once per call and answer queries in O(1)
    Integral,
}

/// Options for splitting and merging
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMergeOptions {
    /// Largest standard deviation accepted as homogeneous (>= 0)
    pub tolerance: f64,
    /// Area (in cells) at or below which a region is accepted (>= 1)
    pub min_size: u64,
    /// Handling of odd-sized regions
    pub quarter_policy: QuarterPolicy,
    /// Statistics backend
    pub stats_mode: StatsMode,
}

impl Default for SplitMergeOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_size: DEFAULT_MIN_SIZE,
            quarter_policy: QuarterPolicy::default(),
            stats_mode: StatsMode::default(),
        }
    }
}

impl SplitMergeOptions {
    /// Create options with the given tolerance and minimum size
    pub fn new(tolerance: f64, min_size: u64) -> Self {
        Self {
            tolerance,
            min_size,
            ..Default::default()
        }
    }

    /// Set the odd-dimension policy
    pub fn with_quarter_policy(mut self, policy: QuarterPolicy) -> Self {
        self.quarter_policy = policy;
        self
    }

    /// Set the statistics backend
    pub fn with_stats_mode(mut self, mode: StatsMode) -> Self {
        self.stats_mode = mode;
        self
    }

    /// Check that the options are usable
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidParameters` if the tolerance is negative
    /// or not a number, or if `min_size` is zero.
    pub fn validate(&self) -> RegionResult<()> {
        if !(self.tolerance >= 0.0) {
            return Err(RegionError::InvalidParameters(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.min_size == 0 {
            return Err(RegionError::InvalidParameters(
                "min_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that `roi` is a non-empty window inside `field`
pub(crate) fn check_roi(field: &Field, roi: Rect) -> RegionResult<()> {
    if roi.is_empty() {
        return Err(RegionError::EmptyRoi(roi));
    }
    if !field.bounds().contains_rect(&roi) {
        return Err(RegionError::RoiOutOfBounds {
            roi,
            width: field.width(),
            height: field.height(),
        });
    }
    Ok(())
}

pub(crate) fn build_integral(field: &Field, options: &SplitMergeOptions) -> Option<IntegralImage> {
    match options.stats_mode {
        StatsMode::Direct => None,
        StatsMode::Integral => Some(IntegralImage::new(field)),
    }
}

/// Decide whether a rejected region can be quartered under `policy`
fn can_quarter(rect: Rect, policy: QuarterPolicy) -> RegionResult<bool> {
    let even = rect.w % 2 == 0 && rect.h % 2 == 0;
    match policy {
        QuarterPolicy::ForceLeaf => Ok(even),
        QuarterPolicy::Floor => Ok(rect.w >= 2 && rect.h >= 2),
        QuarterPolicy::RequireEven => {
            if rect.w == 1 && rect.h == 1 {
                Ok(false)
            } else if even {
                Ok(true)
            } else {
                Err(RegionError::OddDimension(rect))
            }
        }
    }
}

/// Split a region of interest into a quadtree of homogeneous regions
///
/// The predicate is evaluated on `roi` first; if it accepts, the result is
/// a single leaf. Otherwise the region is quartered into top-left,
/// top-right, bottom-left and bottom-right children (in that order) and
/// each is split in turn. Every leaf is labeled with the per-channel mean
/// of its samples.
///
/// # Arguments
///
/// * `field` - Input raster (not modified)
/// * `roi` - Window to segment; must be non-empty and inside `field`
/// * `options` - Tolerance, minimum size, odd-size policy, statistics mode
/// * `predicate` - Homogeneity test
///
/// # Errors
///
/// Returns an error for an empty or out-of-bounds ROI, invalid options,
/// an odd region under [`QuarterPolicy::RequireEven`], or any error raised
/// by the predicate.
///
/// # Examples
///
/// ```
/// use quadseg_core::{Field, Rect};
/// use quadseg_region::{split, SplitMergeOptions, ZeroVariance};
///
/// let field = Field::new_with_value(4, 4, 1, 3.0).unwrap();
/// let tree = split(&field, Rect::new(0, 0, 4, 4), &SplitMergeOptions::default(), &ZeroVariance).unwrap();
/// assert_eq!(tree.len(), 1);
/// assert_eq!(tree[tree.root()].label().unwrap().value(0), 3.0);
/// ```
pub fn split<P: Predicate + ?Sized>(
    field: &Field,
    roi: Rect,
    options: &SplitMergeOptions,
    predicate: &P,
) -> RegionResult<RegionTree> {
    options.validate()?;
    check_roi(field, roi)?;
    let integral = build_integral(field, options);

    let mut tree = RegionTree::with_root(roi, field.channels());
    let mut stack: Vec<RegionId> = vec![tree.root()];

    while let Some(id) = stack.pop() {
        let rect = tree[id].rect();
        let region = Subregion::new(field.view(rect)?, integral.as_ref());
        let homogeneous = predicate.is_homogeneous(&region, options.tolerance, options.min_size)?;

        if !homogeneous && can_quarter(rect, options.quarter_policy)? {
            log::trace!("split {} at depth {}", rect, tree[id].depth());
            let children = tree.push_children(id, rect.quadrants());
            stack.extend(children.iter().rev());
        } else {
            let label = Label::from_stats(&region.stats()?);
            tree.set_label(id, label);
        }
    }

    log::debug!(
        "split {}: {} regions, {} leaves, depth {}",
        roi,
        tree.len(),
        tree.leaf_count(),
        tree.max_depth()
    );
    Ok(tree)
}
