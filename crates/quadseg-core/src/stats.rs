//! Region statistics
//!
//! Per-channel mean and population standard deviation over a rectangular
//! window, computed either by scanning a [`FieldView`] or from precomputed
//! sums (see [`IntegralImage`](crate::IntegralImage)).

use crate::MAX_CHANNELS;
use crate::field::FieldView;

/// Mean and population standard deviation of a window, per channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    count: u64,
    channels: u32,
    mean: [f64; MAX_CHANNELS],
    std_dev: [f64; MAX_CHANNELS],
}

impl RegionStats {
    /// Compute statistics by scanning every sample of a view
    ///
    /// Uses two passes (mean, then squared deviations) so that constant
    /// windows yield a standard deviation of exactly zero whenever the mean
    /// is representable.
    pub fn from_view(view: &FieldView<'_>) -> Self {
        let nc = view.channels() as usize;
        let count = view.area();
        let n = count as f64;

        let mut sum = [0.0f64; MAX_CHANNELS];
        for row in view.rows() {
            for px in row.chunks_exact(nc) {
                for (acc, &v) in sum.iter_mut().zip(px) {
                    *acc += v as f64;
                }
            }
        }
        let mut mean = [0.0f64; MAX_CHANNELS];
        for c in 0..nc {
            mean[c] = sum[c] / n;
        }

        let mut sq_dev = [0.0f64; MAX_CHANNELS];
        for row in view.rows() {
            for px in row.chunks_exact(nc) {
                for c in 0..nc {
                    let d = px[c] as f64 - mean[c];
                    sq_dev[c] += d * d;
                }
            }
        }
        let mut std_dev = [0.0f64; MAX_CHANNELS];
        for c in 0..nc {
            std_dev[c] = (sq_dev[c] / n).sqrt();
        }

        RegionStats {
            count,
            channels: nc as u32,
            mean,
            std_dev,
        }
    }

    /// Build statistics from per-channel sums and sums of squares
    ///
    /// Negative variances produced by rounding are clamped to zero.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or the slices are shorter than `channels`.
    pub fn from_sums(count: u64, channels: u32, sum: &[f64], sum_sq: &[f64]) -> Self {
        assert!(count > 0, "statistics of an empty window");
        let n = count as f64;
        let mut mean = [0.0f64; MAX_CHANNELS];
        let mut std_dev = [0.0f64; MAX_CHANNELS];
        for c in 0..channels as usize {
            let m = sum[c] / n;
            let var = (sum_sq[c] / n - m * m).max(0.0);
            mean[c] = m;
            std_dev[c] = var.sqrt();
        }
        RegionStats {
            count,
            channels,
            mean,
            std_dev,
        }
    }

    /// Number of samples (per channel)
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Mean of one channel (0.0 for channels the window does not have)
    #[inline]
    pub fn mean(&self, channel: u32) -> f64 {
        self.mean.get(channel as usize).copied().unwrap_or(0.0)
    }

    /// Means of all channels
    pub fn means(&self) -> &[f64] {
        &self.mean[..self.channels as usize]
    }

    /// Population standard deviation of one channel
    #[inline]
    pub fn std_dev(&self, channel: u32) -> f64 {
        self.std_dev.get(channel as usize).copied().unwrap_or(0.0)
    }

    /// Population standard deviations of all channels
    pub fn std_devs(&self) -> &[f64] {
        &self.std_dev[..self.channels as usize]
    }

    /// Largest standard deviation over all channels
    pub fn max_std_dev(&self) -> f64 {
        self.std_devs().iter().copied().fold(0.0, f64::max)
    }

    /// Population variance of one channel
    pub fn variance(&self, channel: u32) -> f64 {
        let s = self.std_dev(channel);
        s * s
    }
}
