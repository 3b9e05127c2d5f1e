//! Integral image (summed area table)
//!
//! Holds per-channel prefix sums of samples and of squared samples so that
//! the sum, mean and variance of any rectangle are available in O(1).
//!
//! Sums are accumulated in `f64`. They are exact for integer-valued data
//! (8-bit or 16-bit images) of any practical size; for arbitrary floating
//! point data the derived variance suffers cancellation against the large
//! far-corner entries; [`IntegralImage::variance_error_bound`] bounds that
//! error so callers can fall back to a direct scan near a threshold.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::rect::Rect;
use crate::stats::RegionStats;

/// Integral image with sum and squared-sum tables
///
/// Each table has `(width + 1) * (height + 1)` entries per channel; entry
/// `(x, y)` holds the sum over the rectangle `(0, 0, x, y)`.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: u32,
    height: u32,
    channels: u32,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl IntegralImage {
    /// Build the integral tables for a field
    pub fn new(field: &Field) -> Self {
        let (width, height) = field.dimensions();
        let nc = field.channels() as usize;
        let stride = (width as usize + 1) * nc;
        let len = stride * (height as usize + 1);
        let mut sum = vec![0.0f64; len];
        let mut sum_sq = vec![0.0f64; len];

        let mut row_sum = vec![0.0f64; nc];
        let mut row_sq = vec![0.0f64; nc];
        for y in 0..height as usize {
            row_sum.fill(0.0);
            row_sq.fill(0.0);
            let row = field.row(y as u32);
            for (x, px) in row.chunks_exact(nc).enumerate() {
                let above = y * stride + (x + 1) * nc;
                let here = (y + 1) * stride + (x + 1) * nc;
                for c in 0..nc {
                    let v = px[c] as f64;
                    row_sum[c] += v;
                    row_sq[c] += v * v;
                    sum[here + c] = sum[above + c] + row_sum[c];
                    sum_sq[here + c] = sum_sq[above + c] + row_sq[c];
                }
            }
        }

        IntegralImage {
            width,
            height,
            channels: nc as u32,
            sum,
            sum_sq,
        }
    }

    /// Get the width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    fn check(&self, rect: &Rect, channel: u32) -> Result<()> {
        if !Rect::from_size(self.width, self.height).contains_rect(rect) {
            return Err(Error::RectOutOfBounds {
                rect: *rect,
                width: self.width,
                height: self.height,
            });
        }
        if channel >= self.channels {
            return Err(Error::IndexOutOfBounds {
                index: channel as usize,
                len: self.channels as usize,
            });
        }
        Ok(())
    }

    fn rect_total(&self, table: &[f64], rect: &Rect, channel: u32) -> f64 {
        let nc = self.channels as usize;
        let stride = (self.width as usize + 1) * nc;
        let c = channel as usize;
        let x0 = rect.x as usize;
        let y0 = rect.y as usize;
        let x1 = x0 + rect.w as usize;
        let y1 = y0 + rect.h as usize;
        table[y1 * stride + x1 * nc + c] - table[y0 * stride + x1 * nc + c]
            - table[y1 * stride + x0 * nc + c]
            + table[y0 * stride + x0 * nc + c]
    }

    /// Sum of one channel over a rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is outside the image or the channel
    /// does not exist.
    pub fn sum_rect(&self, rect: &Rect, channel: u32) -> Result<f64> {
        self.check(rect, channel)?;
        Ok(self.rect_total(&self.sum, rect, channel))
    }

    /// Sum of squares of one channel over a rectangle
    pub fn sum_sq_rect(&self, rect: &Rect, channel: u32) -> Result<f64> {
        self.check(rect, channel)?;
        Ok(self.rect_total(&self.sum_sq, rect, channel))
    }

    /// Per-channel mean and standard deviation over a non-empty rectangle
    pub fn stats(&self, rect: &Rect) -> Result<RegionStats> {
        if rect.is_empty() {
            return Err(Error::InvalidDimension {
                width: rect.w,
                height: rect.h,
            });
        }
        self.check(rect, 0)?;
        let nc = self.channels as usize;
        let mut sum = [0.0f64; crate::MAX_CHANNELS];
        let mut sum_sq = [0.0f64; crate::MAX_CHANNELS];
        for c in 0..nc {
            sum[c] = self.rect_total(&self.sum, rect, c as u32);
            sum_sq[c] = self.rect_total(&self.sum_sq, rect, c as u32);
        }
        Ok(RegionStats::from_sums(
            rect.area(),
            self.channels,
            &sum,
            &sum_sq,
        ))
    }

    /// Upper bound on the absolute rounding error of the variances that
    /// [`IntegralImage::stats`] derives for `rect`, over all channels
    ///
    /// Table entries carry an accumulated error of at most
    /// `(width + height + 2) * EPSILON` relative to the far-corner squared
    /// sum, which is the largest entry read for the rectangle. The bound
    /// covers the squared-sum term and the squared-mean term with a factor
    /// two of headroom.
    pub fn variance_error_bound(&self, rect: &Rect) -> Result<f64> {
        if rect.is_empty() {
            return Err(Error::InvalidDimension {
                width: rect.w,
                height: rect.h,
            });
        }
        self.check(rect, 0)?;
        let nc = self.channels as usize;
        let stride = (self.width as usize + 1) * nc;
        let corner = (rect.y + rect.h) as usize * stride + (rect.x + rect.w) as usize * nc;
        let far_sq = self.sum_sq[corner..corner + nc]
            .iter()
            .copied()
            .fold(0.0, f64::max);

        let n = rect.area() as f64;
        let prefix_area = (rect.x + rect.w) as f64 * (rect.y + rect.h) as f64;
        let scale = (self.width as f64 + self.height as f64 + 2.0) * f64::EPSILON;
        Ok(2.0 * scale * far_sq / n * (4.0 + 8.0 * (prefix_area / n).sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Field {
        Field::from_fn(6, 4, |x, y| (x + 6 * y) as f32).unwrap()
    }

    #[test]
    fn test_sum_rect_matches_scan() {
        let field = ramp();
        let integral = IntegralImage::new(&field);
        let rect = Rect::new(1, 1, 3, 2);
        let expected: f32 = field.view(rect).unwrap().samples(0).sum();
        assert_eq!(integral.sum_rect(&rect, 0).unwrap(), expected as f64);

        let whole = integral.sum_rect(&field.bounds(), 0).unwrap();
        assert_eq!(whole, (0..24).sum::<u32>() as f64);
    }

    #[test]
    fn test_sum_sq_rect() {
        let field = ramp();
        let integral = IntegralImage::new(&field);
        // Row 0, columns 0..3: 0 + 1 + 4
        assert_eq!(
            integral.sum_sq_rect(&Rect::new(0, 0, 3, 1), 0).unwrap(),
            5.0
        );
    }

    #[test]
    fn test_stats_match_direct() {
        let field = ramp();
        let integral = IntegralImage::new(&field);
        let rect = Rect::new(2, 0, 4, 4);
        let direct = field.view(rect).unwrap().stats();
        let fast = integral.stats(&rect).unwrap();
        assert_eq!(fast.count(), direct.count());
        assert!((fast.mean(0) - direct.mean(0)).abs() < 1e-9);
        assert!((fast.std_dev(0) - direct.std_dev(0)).abs() < 1e-9);
    }

    #[test]
    fn test_multichannel_sums() {
        let mut field = Field::new(3, 3, 2).unwrap();
        field.fill_rect(field.bounds(), &[1.0, 10.0]).unwrap();
        let integral = IntegralImage::new(&field);
        assert_eq!(integral.sum_rect(&field.bounds(), 0).unwrap(), 9.0);
        assert_eq!(integral.sum_rect(&field.bounds(), 1).unwrap(), 90.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let integral = IntegralImage::new(&ramp());
        assert!(integral.sum_rect(&Rect::new(4, 0, 3, 1), 0).is_err());
        assert!(integral.sum_rect(&Rect::new(0, 0, 1, 1), 1).is_err());
        assert!(integral.stats(&Rect::new(0, 0, 0, 1)).is_err());
        assert!(integral.variance_error_bound(&Rect::new(0, 0, 0, 1)).is_err());
        assert!(integral.variance_error_bound(&Rect::new(5, 3, 2, 2)).is_err());
    }

    #[test]
    fn test_variance_error_bound_covers_constant_block() {
        let mut field =
            Field::from_fn(128, 128, |x, y| ((x * 31 + y * 17) % 251) as f32 * 1.37).unwrap();
        let block = Rect::new(96, 96, 32, 32);
        for value in [0.1, 97.1] {
            field.fill_rect(block, &[value]).unwrap();
            let integral = IntegralImage::new(&field);
            let bound = integral.variance_error_bound(&block).unwrap();
            let fast = integral.stats(&block).unwrap();
            assert!(fast.variance(0) <= bound);
            assert!(bound < 1e-3);
        }
    }
}
