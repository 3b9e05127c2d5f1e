//! Field - Multi-channel floating-point raster
//!
//! `Field` is a 2D array of `f32` samples with 1 to [`MAX_CHANNELS`]
//! interleaved channels. It is the input to segmentation: grayscale images
//! are single-channel fields, color images are 3- or 4-channel fields.
//!
//! # Examples
//!
//! ```
//! use quadseg_core::{Field, Rect};
//!
//! let mut field = Field::new(8, 8, 1).unwrap();
//! field.set_sample(2, 3, 0, 7.5).unwrap();
//! assert_eq!(field.get_sample(2, 3, 0).unwrap(), 7.5);
//!
//! let view = field.view(Rect::new(0, 0, 4, 4)).unwrap();
//! assert_eq!(view.area(), 16);
//! ```

use crate::MAX_CHANNELS;
use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::stats::RegionStats;

/// Floating-point raster
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding and channels
/// interleaved. Channel `c` of the sample at (x, y) is at index
/// `(y * width + x) * channels + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Width in samples
    width: u32,
    /// Height in samples
    height: u32,
    /// Number of interleaved channels
    channels: u32,
    /// Sample data
    data: Vec<f32>,
}

fn check_shape(width: u32, height: u32, channels: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    if channels == 0 || channels as usize > MAX_CHANNELS {
        return Err(Error::InvalidChannels(channels));
    }
    Ok(width as usize * height as usize * channels as usize)
}

impl Field {
    /// Create a new field with all samples set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0, and
    /// `Error::InvalidChannels` if `channels` is not in `1..=MAX_CHANNELS`.
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self> {
        Self::new_with_value(width, height, channels, 0.0)
    }

    /// Create a new field with every sample of every channel set to `value`
    pub fn new_with_value(width: u32, height: u32, channels: u32, value: f32) -> Result<Self> {
        let len = check_shape(width, height, channels)?;
        Ok(Field {
            width,
            height,
            channels,
            data: vec![value; len],
        })
    }

    /// Create a field from raw interleaved data
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is invalid or the data length does not
    /// equal `width * height * channels`.
    pub fn from_data(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Result<Self> {
        let expected = check_shape(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{}x{} = {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Field {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a single-channel field from 8-bit grayscale bytes
    pub fn from_gray8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        Self::from_data(width, height, 1, bytes.iter().map(|&b| b as f32).collect())
    }

    /// Create a 3-channel field from packed 8-bit RGB bytes
    pub fn from_rgb8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        Self::from_data(width, height, 3, bytes.iter().map(|&b| b as f32).collect())
    }

    /// Create a single-channel field by evaluating `f(x, y)` at every sample
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        let len = check_shape(width, height, 1)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Field {
            width,
            height,
            channels: 1,
            data,
        })
    }

    /// Get the width in samples
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in samples
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Get the dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the rectangle covering the whole field
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Get the raw interleaved sample data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    fn check_coords(&self, x: u32, y: u32, channel: u32) -> Result<usize> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return Err(Error::IndexOutOfBounds {
                index: self.index(x, y) + channel as usize,
                len: self.data.len(),
            });
        }
        Ok(self.index(x, y) + channel as usize)
    }

    /// Get one channel of the sample at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates or channel are out
    /// of range.
    pub fn get_sample(&self, x: u32, y: u32, channel: u32) -> Result<f32> {
        let idx = self.check_coords(x, y, channel)?;
        Ok(self.data[idx])
    }

    /// Set one channel of the sample at (x, y)
    pub fn set_sample(&mut self, x: u32, y: u32, channel: u32, value: f32) -> Result<()> {
        let idx = self.check_coords(x, y, channel)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Get all channels of the sample at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<&[f32]> {
        let idx = self.check_coords(x, y, 0)?;
        Ok(&self.data[idx..idx + self.channels as usize])
    }

    /// Get one row of interleaved samples
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[f32] {
        assert!(y < self.height, "row {} out of range", y);
        let stride = self.width as usize * self.channels as usize;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Set every sample inside `rect` to `values` (one value per channel)
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle lies outside the field or the
    /// number of values does not match the channel count.
    pub fn fill_rect(&mut self, rect: Rect, values: &[f32]) -> Result<()> {
        self.check_rect(rect)?;
        if values.len() != self.channels as usize {
            return Err(Error::InvalidParameter(format!(
                "expected {} channel values, got {}",
                self.channels,
                values.len()
            )));
        }
        let nc = self.channels as usize;
        for y in rect.y..rect.y + rect.h {
            let start = self.index(rect.x, y);
            let end = start + rect.w as usize * nc;
            for px in self.data[start..end].chunks_exact_mut(nc) {
                px.copy_from_slice(values);
            }
        }
        Ok(())
    }

    fn check_rect(&self, rect: Rect) -> Result<()> {
        if !self.bounds().contains_rect(&rect) {
            return Err(Error::RectOutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Borrow a rectangular window of the field
    ///
    /// # Errors
    ///
    /// Returns `Error::RectOutOfBounds` if `rect` does not lie inside the
    /// field, and `Error::InvalidDimension` if it is empty.
    pub fn view(&self, rect: Rect) -> Result<FieldView<'_>> {
        self.check_rect(rect)?;
        if rect.is_empty() {
            return Err(Error::InvalidDimension {
                width: rect.w,
                height: rect.h,
            });
        }
        Ok(FieldView { field: self, rect })
    }
}

/// A read-only rectangular window onto a [`Field`]
///
/// Always non-empty and inside its field.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    field: &'a Field,
    rect: Rect,
}

impl<'a> FieldView<'a> {
    /// The underlying field
    #[inline]
    pub fn field(&self) -> &'a Field {
        self.field
    }

    /// The window bounds in field coordinates
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.w
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.h
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.field.channels
    }

    /// Number of samples (per channel) in the window
    #[inline]
    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    /// Get one channel of the sample at (x, y), relative to the window origin
    pub fn get_sample(&self, x: u32, y: u32, channel: u32) -> Result<f32> {
        if x >= self.rect.w || y >= self.rect.h {
            return Err(Error::IndexOutOfBounds {
                index: y as usize * self.rect.w as usize + x as usize,
                len: self.rect.area() as usize,
            });
        }
        self.field
            .get_sample(self.rect.x + x, self.rect.y + y, channel)
    }

    /// Iterate over the rows of the window as interleaved sample slices
    pub fn rows(self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let field = self.field;
        let rect = self.rect;
        let nc = field.channels as usize;
        (rect.y..rect.y + rect.h).map(move |y| {
            let start = field.index(rect.x, y);
            &field.data[start..start + rect.w as usize * nc]
        })
    }

    /// Iterate over every value of one channel in row-major order
    pub fn samples(self, channel: u32) -> impl Iterator<Item = f32> + 'a {
        let nc = self.field.channels as usize;
        let c = channel as usize;
        self.rows()
            .flat_map(move |row| row.chunks_exact(nc).map(move |px| px[c]))
    }

    /// Check whether every sample in every channel is identical
    ///
    /// This is an exact comparison; it is the test behind zero-variance
    /// homogeneity and never suffers from floating-point cancellation.
    pub fn is_uniform(&self) -> bool {
        let nc = self.field.channels as usize;
        let mut rows = self.rows();
        let Some(first_row) = rows.next() else {
            return true;
        };
        let first = &first_row[..nc];
        first_row.chunks_exact(nc).all(|px| px == first)
            && rows.all(|row| row.chunks_exact(nc).all(|px| px == first))
    }

    /// Compute per-channel mean and population standard deviation
    pub fn stats(&self) -> RegionStats {
        RegionStats::from_view(self)
    }
}
