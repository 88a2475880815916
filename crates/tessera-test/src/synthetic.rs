//! Synthetic test images
//!
//! Deterministic fixtures for tests that must not depend on image files.

use crate::TestResult;
use tessera_core::{ChannelOrder, Color, RgbImage};

/// Uniform image.
pub fn solid(width: u32, height: u32, color: Color) -> TestResult<RgbImage> {
    Ok(RgbImage::filled(width, height, ChannelOrder::Rgb, color)?)
}

/// Checkerboard of `cell` x `cell` squares alternating `a` and `b`,
/// starting with `a` at the top-left.
pub fn checkerboard(width: u32, height: u32, cell: u32, a: Color, b: Color) -> TestResult<RgbImage> {
    let cell = cell.max(1);
    Ok(RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, y| {
        if (x / cell + y / cell) % 2 == 0 { a } else { b }
    })?)
}

/// Equal-width vertical bands, one per color, left to right.
pub fn vertical_bands(width: u32, height: u32, colors: &[Color]) -> TestResult<RgbImage> {
    let n = colors.len().max(1) as u32;
    Ok(RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, _| {
        let band = ((x * n) / width).min(n - 1) as usize;
        colors.get(band).copied().unwrap_or(Color::BLACK)
    })?)
}

/// Red ramp left to right, green ramp top to bottom, constant blue.
pub fn gradient(width: u32, height: u32) -> TestResult<RgbImage> {
    Ok(RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, y| {
        let r = (x * 255 / width.saturating_sub(1).max(1)).min(255) as u8;
        let g = (y * 255 / height.saturating_sub(1).max(1)).min(255) as u8;
        Color::new(r, g, 96)
    })?)
}

/// Uniform rectangular blocks of `block` x `block` pixels, colored from
/// `colors` in row-major block order (cycled).
pub fn blocks(width: u32, height: u32, block: u32, colors: &[Color]) -> TestResult<RgbImage> {
    let block = block.max(1);
    let per_row = width.div_ceil(block);
    Ok(RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, y| {
        if colors.is_empty() {
            return Color::BLACK;
        }
        let idx = ((y / block) * per_row + x / block) as usize;
        colors[idx % colors.len()]
    })?)
}

/// The fallback "natural" image used when a test image file is missing:
/// a blocky, gently shaded scene.
pub fn scene(width: u32, height: u32) -> TestResult<RgbImage> {
    Ok(RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, y| {
        let sky = y < height / 3;
        let sun = {
            let dx = x as i64 - (width as i64 * 3 / 4);
            let dy = y as i64 - (height as i64 / 6);
            dx * dx + dy * dy < (height as i64 / 10).pow(2)
        };
        if sun {
            Color::new(250, 220, 60)
        } else if sky {
            Color::new(90, 150, (200 + y * 40 / height.max(1)).min(255) as u8)
        } else if x < width / 2 {
            Color::new(40, (120 + x * 30 / width.max(1)) as u8, 50)
        } else {
            Color::new(130, 100, 70)
        }
    })?)
}
