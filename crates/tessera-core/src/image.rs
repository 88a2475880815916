//! RGB image container
//!
//! [`RgbImage`] holds 8-bit, three-channel pixel data in a fixed
//! [`ChannelOrder`]. Rows are stored contiguously with no padding, so
//! pixel `(x, y)` starts at byte `3 * (y * width + x)`.
//!
//! # Ownership model
//!
//! `RgbImage` uses `Arc` for cheap cloning (shared ownership) and is never
//! modified in place. To build or modify pixel data, convert to
//! [`RgbImageMut`] via [`RgbImage::try_into_mut`] or [`RgbImage::to_mut`],
//! then convert back with `Into<RgbImage>`.

use crate::color::Color;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Byte order of the three channels of every pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelOrder {
    /// Red, green, blue
    #[default]
    Rgb,
    /// Blue, green, red
    Bgr,
}

impl ChannelOrder {
    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ChannelOrder::Rgb => "rgb",
            ChannelOrder::Bgr => "bgr",
        }
    }
}

#[derive(Debug, Clone)]
struct ImageData {
    width: u32,
    height: u32,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl ImageData {
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        3 * (y as usize * self.width as usize + x as usize)
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Color {
        let i = self.offset(x, y);
        Color([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput { width, height });
    }
    Ok(width as usize * height as usize * 3)
}

/// Immutable, shareable RGB image.
///
/// # Examples
///
/// ```
/// use tessera_core::{ChannelOrder, Color, RgbImage};
///
/// let img = RgbImage::filled(4, 3, ChannelOrder::Rgb, Color::gray(128)).unwrap();
/// assert_eq!(img.width(), 4);
/// assert_eq!(img.pixel(3, 2), Color::gray(128));
/// ```
#[derive(Debug, Clone)]
pub struct RgbImage {
    inner: Arc<ImageData>,
}

impl RgbImage {
    /// Create a black image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if width or height is 0.
    pub fn new(width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        Self::filled(width, height, order, Color::BLACK)
    }

    /// Create an image with every pixel set to `color`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if width or height is 0.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, color: Color) -> Result<Self> {
        let len = check_dimensions(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 3 {
            data.extend_from_slice(&color.0);
        }
        Ok(RgbImage {
            inner: Arc::new(ImageData {
                width,
                height,
                order,
                data,
            }),
        })
    }

    /// Wrap an interleaved byte buffer.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Dimensions in pixels (both > 0)
    /// * `order` - Channel order of `data`
    /// * `data` - `width * height * 3` bytes, row-major
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a zero dimension and
    /// [`Error::DataLengthMismatch`] when `data` has the wrong length.
    pub fn from_raw(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Result<Self> {
        let expected = check_dimensions(width, height)?;
        if data.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(RgbImage {
            inner: Arc::new(ImageData {
                width,
                height,
                order,
                data,
            }),
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, order: ChannelOrder, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Color,
    {
        let len = check_dimensions(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).0);
            }
        }
        Self::from_raw(width, height, order, data)
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.inner.width as usize * self.inner.height as usize
    }

    /// Channel order of the stored bytes.
    #[inline]
    pub fn order(&self) -> ChannelOrder {
        self.inner.order
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = 3 * self.inner.width as usize;
        let start = y as usize * stride;
        &self.inner.data[start..start + stride]
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.inner.pixel(x, y)
    }

    /// Pixel at `(x, y)`, or an error when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
        self.inner.check_bounds(x, y)?;
        Ok(self.inner.pixel(x, y))
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Color> + '_ {
        self.inner
            .data
            .chunks_exact(3)
            .map(|c| Color([c[0], c[1], c[2]]))
    }

    /// Check whether two images share width and height.
    pub fn sizes_equal(&self, other: &RgbImage) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Fail with [`Error::DimensionMismatch`] unless the size is `(width, height)`.
    pub fn ensure_size(&self, width: u32, height: u32) -> Result<()> {
        if self.dimensions() != (width, height) {
            return Err(Error::DimensionMismatch {
                expected: (width, height),
                actual: self.dimensions(),
            });
        }
        Ok(())
    }

    /// Fail with [`Error::ChannelOrderMismatch`] unless the order is `order`.
    pub fn ensure_order(&self, order: ChannelOrder) -> Result<()> {
        if self.order() != order {
            return Err(Error::ChannelOrderMismatch {
                expected: order,
                actual: self.order(),
            });
        }
        Ok(())
    }

    /// Return the image in `order`, swapping red and blue when needed.
    ///
    /// Shares the buffer when the order already matches.
    pub fn to_order(&self, order: ChannelOrder) -> RgbImage {
        if order == self.order() {
            return self.clone();
        }
        let mut data = self.inner.data.clone();
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        RgbImage {
            inner: Arc::new(ImageData {
                width: self.inner.width,
                height: self.inner.height,
                order,
                data,
            }),
        }
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<RgbImageMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Ok(RgbImageMut { inner }),
            Err(inner) => Err(RgbImage { inner }),
        }
    }

    /// Create a mutable copy of this image.
    pub fn to_mut(&self) -> RgbImageMut {
        RgbImageMut {
            inner: (*self.inner).clone(),
        }
    }

    /// Number of references sharing the pixel buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl PartialEq for RgbImage {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && self.order() == other.order()
            && self.data() == other.data()
    }
}

impl Eq for RgbImage {}

/// Mutable RGB image.
///
/// Convert back to an immutable [`RgbImage`] using `Into<RgbImage>`.
#[derive(Debug)]
pub struct RgbImageMut {
    inner: ImageData,
}

impl RgbImageMut {
    /// Create a mutable image filled with `color`.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, color: Color) -> Result<Self> {
        RgbImage::filled(width, height, order, color).map(|img| img.to_mut())
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Channel order of the stored bytes.
    #[inline]
    pub fn order(&self) -> ChannelOrder {
        self.inner.order
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Mutable raw interleaved bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.inner.pixel(x, y)
    }

    /// Set the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        self.inner.check_bounds(x, y)?;
        self.set_pixel_unchecked(x, y, color);
        Ok(())
    }

    /// Set the pixel at `(x, y)` without a bounds check on the coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the pixel lies past the end of the buffer.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, color: Color) {
        let i = self.inner.offset(x, y);
        self.inner.data[i..i + 3].copy_from_slice(&color.0);
    }

    /// Fill the whole image with `color`.
    pub fn fill(&mut self, color: Color) {
        for px in self.inner.data.chunks_exact_mut(3) {
            px.copy_from_slice(&color.0);
        }
    }

    /// Fill the rectangle `[x, x + w) x [y, y + h)`, clipped to the image.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        let x_end = x.saturating_add(w).min(self.inner.width);
        let y_end = y.saturating_add(h).min(self.inner.height);
        for yy in y..y_end {
            for xx in x..x_end {
                self.set_pixel_unchecked(xx, yy, color);
            }
        }
    }

    /// Copy `src` with its top-left corner at `(x, y)`, clipped to this image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelOrderMismatch`] if the orders differ.
    pub fn paste(&mut self, src: &RgbImage, x: u32, y: u32) -> Result<()> {
        src.ensure_order(self.order())?;
        if x >= self.inner.width || y >= self.inner.height {
            return Ok(());
        }
        let copy_w = src.width().min(self.inner.width - x) as usize;
        let copy_h = src.height().min(self.inner.height - y);
        for sy in 0..copy_h {
            let src_row = &src.row(sy)[..3 * copy_w];
            let dst = self.inner.offset(x, y + sy);
            self.inner.data[dst..dst + 3 * copy_w].copy_from_slice(src_row);
        }
        Ok(())
    }
}

impl From<RgbImageMut> for RgbImage {
    fn from(image: RgbImageMut) -> Self {
        RgbImage {
            inner: Arc::new(image.inner),
        }
    }
}
