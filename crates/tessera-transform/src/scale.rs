//! Image scaling operations
//!
//! Provides resampling to an exact size and an aspect-preserving resize
//! that pads the result into a fixed canvas:
//! - Sampling (nearest neighbour)
//! - Linear (bilinear, pixel centres aligned)

use crate::{TransformError, TransformResult};
use tessera_core::{Color, RgbImage, RgbImageMut};

// =============================================================================
// Constants
// =============================================================================

/// Default resize target, width and height
pub const DEFAULT_TARGET_SIZE: u32 = 1024;

/// Default padding color (white in either channel order)
pub const DEFAULT_PAD_COLOR: Color = Color::WHITE;

/// Resampling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMethod {
    /// Nearest-neighbor sampling (fastest, pixelated results)
    Sampling,
    /// Bilinear interpolation
    #[default]
    Linear,
}

/// Scale an image to an exact size with bilinear interpolation.
///
/// # Arguments
/// * `image` - Input image
/// * `width` - Target width (> 0)
/// * `height` - Target height (> 0)
pub fn scale_to_size(image: &RgbImage, width: u32, height: u32) -> TransformResult<RgbImage> {
    scale_to_size_with(image, width, height, ScaleMethod::Linear)
}

/// Scale an image to an exact size with the given method.
///
/// # Errors
///
/// Returns [`TransformError::InvalidParameters`] for a zero target size.
pub fn scale_to_size_with(
    image: &RgbImage,
    width: u32,
    height: u32,
    method: ScaleMethod,
) -> TransformResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidParameters(format!(
            "target size must be positive, got {width}x{height}"
        )));
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let xs = taps(image.width(), width);
    let ys = taps(image.height(), height);
    let mut out = RgbImageMut::filled(width, height, image.order(), Color::BLACK)?;
    let sw = image.width() as usize;
    let src = image.data();
    let dst = out.data_mut();

    for (y, &(y0, y1, fy)) in ys.iter().enumerate() {
        let row0 = &src[y0 * sw * 3..(y0 + 1) * sw * 3];
        let row1 = &src[y1 * sw * 3..(y1 + 1) * sw * 3];
        let out_row = &mut dst[y * width as usize * 3..(y + 1) * width as usize * 3];
        for (x, &(x0, x1, fx)) in xs.iter().enumerate() {
            for c in 0..3 {
                out_row[x * 3 + c] = match method {
                    ScaleMethod::Sampling => {
                        let row = if fy < 0.5 { row0 } else { row1 };
                        let sx = if fx < 0.5 { x0 } else { x1 };
                        row[sx * 3 + c]
                    }
                    ScaleMethod::Linear => {
                        let top = lerp(row0[x0 * 3 + c], row0[x1 * 3 + c], fx);
                        let bottom = lerp(row1[x0 * 3 + c], row1[x1 * 3 + c], fx);
                        (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8
                    }
                };
            }
        }
    }

    tracing::trace!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        ?method,
        "scaled image"
    );
    Ok(out.into())
}

fn lerp(a: u8, b: u8, t: f32) -> f32 {
    let a = f32::from(a);
    a + (f32::from(b) - a) * t
}

/// Source taps `(i0, i1, frac)` for each destination index, with pixel
/// centres aligned and edges clamped.
fn taps(src_len: u32, dst_len: u32) -> Vec<(usize, usize, f32)> {
    let ratio = src_len as f32 / dst_len as f32;
    let last = (src_len - 1) as f32;
    (0..dst_len)
        .map(|i| {
            let s = ((i as f32 + 0.5) * ratio - 0.5).clamp(0.0, last);
            let i0 = s.floor() as usize;
            let i1 = (i0 + 1).min(src_len as usize - 1);
            (i0, i1, s - i0 as f32)
        })
        .collect()
}

// =============================================================================
// Resize with padding
// =============================================================================

/// Placement of a scaled image inside a padded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadGeometry {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Compute the scaled size and padding for fitting `src` into `target`.
///
/// The scale ratio is `min(target_w / src_w, target_h / src_h)` and the
/// scaled size is truncated. Padding is split with the top and left edges
/// getting `delta / 2` and the bottom and right edges the remainder.
pub fn pad_geometry(
    src_width: u32,
    src_height: u32,
    target_width: u32,
    target_height: u32,
) -> TransformResult<PadGeometry> {
    if src_width == 0 || src_height == 0 || target_width == 0 || target_height == 0 {
        return Err(TransformError::InvalidParameters(format!(
            "cannot fit {src_width}x{src_height} into {target_width}x{target_height}"
        )));
    }
    let (sw, sh) = (u64::from(src_width), u64::from(src_height));
    let (tw, th) = (u64::from(target_width), u64::from(target_height));

    // Integer arithmetic keeps the limiting side exact
    let (scaled_width, scaled_height) = if tw * sh <= th * sw {
        (target_width, ((sh * tw / sw) as u32).max(1))
    } else {
        (((sw * th / sh) as u32).max(1), target_height)
    };

    let dw = target_width - scaled_width;
    let dh = target_height - scaled_height;
    Ok(PadGeometry {
        scaled_width,
        scaled_height,
        top: dh / 2,
        bottom: dh - dh / 2,
        left: dw / 2,
        right: dw - dw / 2,
    })
}

/// Options for [`resize_with_options`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
    /// Padding color, in the image's channel order
    pub pad_color: Color,
    pub method: ScaleMethod,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_SIZE,
            height: DEFAULT_TARGET_SIZE,
            pad_color: DEFAULT_PAD_COLOR,
            method: ScaleMethod::Linear,
        }
    }
}

impl ResizeOptions {
    /// Set the target size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the padding color
    pub fn with_pad_color(mut self, pad_color: Color) -> Self {
        self.pad_color = pad_color;
        self
    }

    /// Set the resampling method
    pub fn with_method(mut self, method: ScaleMethod) -> Self {
        self.method = method;
        self
    }

    /// Check that the target size is positive.
    pub fn validate(&self) -> TransformResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TransformError::InvalidParameters(format!(
                "target size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Fit an image into `width x height` keeping its aspect ratio, padding
/// the remaining area with `pad`.
///
/// # Example
///
/// ```no_run
/// use tessera_core::Color;
/// use tessera_transform::resize_with_pad;
///
/// let img = tessera_io::read_image("photo.jpg").unwrap();
/// let square = resize_with_pad(&img, 1024, 1024, Color::WHITE).unwrap();
/// assert_eq!(square.dimensions(), (1024, 1024));
/// ```
pub fn resize_with_pad(
    image: &RgbImage,
    width: u32,
    height: u32,
    pad: Color,
) -> TransformResult<RgbImage> {
    resize_with_options(
        image,
        &ResizeOptions::default()
            .with_size(width, height)
            .with_pad_color(pad),
    )
}

/// [`resize_with_pad`] with full options.
pub fn resize_with_options(image: &RgbImage, options: &ResizeOptions) -> TransformResult<RgbImage> {
    options.validate()?;
    let geom = pad_geometry(image.width(), image.height(), options.width, options.height)?;
    let scaled = scale_to_size_with(image, geom.scaled_width, geom.scaled_height, options.method)?;
    let mut canvas = RgbImageMut::filled(options.width, options.height, image.order(), options.pad_color)?;
    canvas.paste(&scaled, geom.left, geom.top)?;
    tracing::debug!(
        from_width = image.width(),
        from_height = image.height(),
        width = options.width,
        height = options.height,
        scaled_width = geom.scaled_width,
        scaled_height = geom.scaled_height,
        "resized with padding"
    );
    Ok(canvas.into())
}
