//! Homogeneity predicates
//!
//! A predicate decides whether a subregion is homogeneous enough to stop
//! subdividing it (during splitting) or to join two siblings (during
//! merging). Any closure with the signature
//! `Fn(&Subregion<'_>, f64, u64) -> RegionResult<bool>` is a predicate, so
//! alternative criteria plug in without touching the splitter or merger.
//!
//! # Examples
//!
//! ```
//! use quadseg_region::{Predicate, Subregion, RegionResult};
//! use quadseg_core::Field;
//!
//! // Homogeneous when the value range is small
//! let narrow_range = |region: &Subregion<'_>, tolerance: f64, _min_size: u64| -> RegionResult<bool> {
//!     let (lo, hi) = region
//!         .view()
//!         .samples(0)
//!         .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
//!     Ok(((hi - lo) as f64) <= tolerance)
//! };
//!
//! let field = Field::from_fn(4, 4, |x, _| x as f32).unwrap();
//! let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
//! assert!(narrow_range.is_homogeneous(&region, 3.0, 1).unwrap());
//! assert!(!narrow_range.is_homogeneous(&region, 2.0, 1).unwrap());
//! ```

use crate::error::RegionResult;
use quadseg_core::{FieldView, IntegralImage, Rect, RegionStats};

/// A window of the field handed to a [`Predicate`]
///
/// Statistics come from the integral image when one was built for the
/// call, otherwise from a direct scan of the samples.
#[derive(Debug, Clone, Copy)]
pub struct Subregion<'a> {
    view: FieldView<'a>,
    integral: Option<&'a IntegralImage>,
}

impl<'a> Subregion<'a> {
    pub fn new(view: FieldView<'a>, integral: Option<&'a IntegralImage>) -> Self {
        Subregion { view, integral }
    }

    /// The samples of the window
    #[inline]
    pub fn view(&self) -> FieldView<'a> {
        self.view
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.view.rect()
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.view.area()
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.view.channels()
    }

    /// Per-channel mean and population standard deviation
    pub fn stats(&self) -> RegionResult<RegionStats> {
        match self.integral {
            Some(integral) => Ok(integral.stats(&self.view.rect())?),
            None => Ok(self.view.stats()),
        }
    }

    /// Upper bound on the rounding error of the variances from
    /// [`Subregion::stats`]; zero for a direct scan
    pub fn variance_error_bound(&self) -> RegionResult<f64> {
        match self.integral {
            Some(integral) => Ok(integral.variance_error_bound(&self.view.rect())?),
            None => Ok(0.0),
        }
    }

    /// Whether every sample in every channel is identical
    pub fn is_uniform(&self) -> bool {
        self.view.is_uniform()
    }
}

/// Homogeneity test deciding whether a subregion should stop subdividing
pub trait Predicate {
    /// Return `true` if `region` is homogeneous
    ///
    /// `tolerance` bounds the allowed spread of values and `min_size` is an
    /// area (in cells) at or below which a region may be accepted
    /// regardless of its content; implementations may ignore either.
    fn is_homogeneous(
        &self,
        region: &Subregion<'_>,
        tolerance: f64,
        min_size: u64,
    ) -> RegionResult<bool>;
}

impl<F> Predicate for F
where
    F: Fn(&Subregion<'_>, f64, u64) -> RegionResult<bool>,
{
    fn is_homogeneous(
        &self,
        region: &Subregion<'_>,
        tolerance: f64,
        min_size: u64,
    ) -> RegionResult<bool> {
        self(region, tolerance, min_size)
    }
}

/// Exact homogeneity: every sample is identical
///
/// Equivalent to a population standard deviation of exactly zero, but
/// evaluated by comparison so it is immune to rounding. Ignores
/// `tolerance` and `min_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroVariance;

impl Predicate for ZeroVariance {
    fn is_homogeneous(&self, region: &Subregion<'_>, _: f64, _: u64) -> RegionResult<bool> {
        Ok(region.is_uniform())
    }
}

/// Tolerance-bounded homogeneity with a minimum-area floor
///
/// Homogeneous if the largest per-channel standard deviation is at most
/// `tolerance`, or if the area is at most `min_size`. A variance from the
/// integral image that lies within its rounding bound of `tolerance²` is
/// rechecked by scanning, so both statistics backends agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundedVariance;

impl Predicate for BoundedVariance {
    fn is_homogeneous(
        &self,
        region: &Subregion<'_>,
        tolerance: f64,
        min_size: u64,
    ) -> RegionResult<bool> {
        if region.area() <= min_size {
            return Ok(true);
        }
        let std_dev = region.stats()?.max_std_dev();
        let limit = tolerance * tolerance;
        if (std_dev * std_dev - limit).abs() <= region.variance_error_bound()? {
            return Ok(region.view().stats().max_std_dev() <= tolerance);
        }
        Ok(std_dev <= tolerance)
    }
}

/// Built-in predicate selectable at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PredicateKind {
    /// See [`ZeroVariance`]
    ZeroVariance,
    /// See [`BoundedVariance`]
    #[default]
    BoundedVariance,
}

impl Predicate for PredicateKind {
    fn is_homogeneous(
        &self,
        region: &Subregion<'_>,
        tolerance: f64,
        min_size: u64,
    ) -> RegionResult<bool> {
        match self {
            PredicateKind::ZeroVariance => ZeroVariance.is_homogeneous(region, tolerance, min_size),
            PredicateKind::BoundedVariance => {
                BoundedVariance.is_homogeneous(region, tolerance, min_size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegionError;
    use quadseg_core::Field;

    fn noisy() -> Field {
        // Alternating 0/10 columns: std dev 5
        Field::from_fn(4, 4, |x, _| if x % 2 == 0 { 0.0 } else { 10.0 }).unwrap()
    }

    #[test]
    fn test_zero_variance() {
        let flat = Field::new_with_value(3, 3, 1, 2.5).unwrap();
        let region = Subregion::new(flat.view(flat.bounds()).unwrap(), None);
        assert!(ZeroVariance.is_homogeneous(&region, 0.0, 1).unwrap());

        let field = noisy();
        let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
        assert!(!ZeroVariance.is_homogeneous(&region, 100.0, 100).unwrap());
    }

    #[test]
    fn test_bounded_variance_tolerance() {
        let field = noisy();
        let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
        assert!(BoundedVariance.is_homogeneous(&region, 5.0, 1).unwrap());
        assert!(!BoundedVariance.is_homogeneous(&region, 4.9, 1).unwrap());
    }

    #[test]
    fn test_bounded_variance_min_size() {
        let field = noisy();
        let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
        assert!(BoundedVariance.is_homogeneous(&region, 0.0, 16).unwrap());
        assert!(!BoundedVariance.is_homogeneous(&region, 0.0, 15).unwrap());
    }

    #[test]
    fn test_integral_statistics() {
        let field = noisy();
        let integral = IntegralImage::new(&field);
        let region = Subregion::new(field.view(field.bounds()).unwrap(), Some(&integral));
        let stats = region.stats().unwrap();
        assert_eq!(stats.mean(0), 5.0);
        assert_eq!(stats.std_dev(0), 5.0);
    }

    #[test]
    fn test_integral_constant_block_at_zero_tolerance() {
        let mut field =
            Field::from_fn(64, 64, |x, y| ((x * 31 + y * 17) % 251) as f32 * 1.37).unwrap();
        let block = Rect::new(32, 32, 32, 32);
        field.fill_rect(block, &[0.1]).unwrap();
        let integral = IntegralImage::new(&field);
        let region = Subregion::new(field.view(block).unwrap(), Some(&integral));
        assert!(region.variance_error_bound().unwrap() > 0.0);
        assert!(BoundedVariance.is_homogeneous(&region, 0.0, 1).unwrap());

        let mixed = Subregion::new(field.view(Rect::new(0, 0, 32, 32)).unwrap(), Some(&integral));
        assert!(!BoundedVariance.is_homogeneous(&mixed, 0.0, 1).unwrap());
    }

    #[test]
    fn test_kind_dispatch() {
        let field = noisy();
        let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
        assert!(!PredicateKind::ZeroVariance
            .is_homogeneous(&region, 5.0, 1)
            .unwrap());
        assert!(PredicateKind::BoundedVariance
            .is_homogeneous(&region, 5.0, 1)
            .unwrap());
        assert_eq!(PredicateKind::default(), PredicateKind::BoundedVariance);
    }

    #[test]
    fn test_closure_errors_propagate() {
        let failing = |_: &Subregion<'_>, _: f64, _: u64| -> RegionResult<bool> {
            Err(RegionError::Predicate("undefined".to_string()))
        };
        let field = noisy();
        let region = Subregion::new(field.view(field.bounds()).unwrap(), None);
        assert!(matches!(
            failing.is_homogeneous(&region, 0.0, 1),
            Err(RegionError::Predicate(_))
        ));
    }
}
