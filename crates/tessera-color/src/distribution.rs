//! Color coverage counting
//!
//! For each palette color, counts the pixels whose every channel lies
//! within a tolerance band around that color. Colors are counted
//! independently: a pixel near two palette colors is counted for both,
//! and a pixel near none is counted for neither, so the counts need not
//! sum to the pixel total.

use crate::palette::Palette;
use crate::ColorResult;
use tessera_core::{ChannelOrder, Color, Mask, RgbImage};

/// Default per-channel tolerance
pub const DEFAULT_TOLERANCE: u32 = 10;

/// Pixel counts per palette color.
///
/// Holds one entry per input color, in input order. Coinciding colors
/// are not merged, so the same color can appear more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCountMap {
    order: ChannelOrder,
    entries: Vec<(Color, u64)>,
}

impl ColorCountMap {
    /// Channel order of the keys.
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Entries in input order.
    pub fn entries(&self) -> &[(Color, u64)] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of the first entry whose key equals `color`.
    pub fn get(&self, color: Color) -> Option<u64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == color)
            .map(|&(_, n)| n)
    }

    /// Entries sorted by descending count; ties keep input order.
    pub fn sorted_by_count(&self) -> Vec<(Color, u64)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    /// The `n` entries with the largest counts.
    pub fn top(&self, n: usize) -> Vec<(Color, u64)> {
        let mut sorted = self.sorted_by_count();
        sorted.truncate(n);
        sorted
    }
}

/// Count pixels within `tolerance` of each palette color.
///
/// # Errors
///
/// Returns a core `ChannelOrderMismatch` error if the palette and image
/// use different channel orders.
///
/// # Example
///
/// ```
/// use tessera_color::distribution::distribution;
/// use tessera_color::palette::Palette;
/// use tessera_core::{ChannelOrder, Color, RgbImage};
///
/// let img = RgbImage::filled(4, 4, ChannelOrder::Rgb, Color::gray(100)).unwrap();
/// let palette = Palette::from_colors(ChannelOrder::Rgb, &[Color::gray(100), Color::gray(200)]);
/// let counts = distribution(&img, &palette, 0).unwrap();
/// assert_eq!(counts.get(Color::gray(100)), Some(16));
/// assert_eq!(counts.get(Color::gray(200)), Some(0));
/// ```
pub fn distribution(image: &RgbImage, palette: &Palette, tolerance: u32) -> ColorResult<ColorCountMap> {
    image.ensure_order(palette.order())?;
    Ok(color_distribution(image, &palette.colors(), tolerance))
}

/// Count pixels within `tolerance` of each color in `colors`.
///
/// The colors are taken to be in the image's channel order.
pub fn color_distribution(image: &RgbImage, colors: &[Color], tolerance: u32) -> ColorCountMap {
    let mut counts = vec![0u64; colors.len()];
    for px in image.pixels() {
        for (count, &c) in counts.iter_mut().zip(colors) {
            if px.within(c, tolerance) {
                *count += 1;
            }
        }
    }
    tracing::debug!(colors = colors.len(), tolerance, "color distribution counted");
    ColorCountMap {
        order: image.order(),
        entries: colors.iter().copied().zip(counts).collect(),
    }
}

/// Mask of pixels within `tolerance` of `color`, with its population.
pub fn color_mask(image: &RgbImage, color: Color, tolerance: u32) -> ColorResult<(u64, Mask)> {
    let bits: Vec<bool> = image.pixels().map(|px| px.within(color, tolerance)).collect();
    let count = bits.iter().filter(|&&b| b).count() as u64;
    let mask = Mask::from_raw(image.width(), image.height(), bits)?;
    Ok((count, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorError;

    #[test]
    fn test_solid_image_tolerance_zero() {
        let c = Color::new(10, 20, 30);
        let img = RgbImage::filled(7, 5, ChannelOrder::Rgb, c).unwrap();
        let counts = color_distribution(&img, &[c, Color::new(10, 20, 31)], 0);
        assert_eq!(counts.entries()[0], (c, 35));
        assert_eq!(counts.entries()[1].1, 0);
    }

    #[test]
    fn test_band_is_inclusive_per_channel() {
        let img = RgbImage::from_fn(3, 1, ChannelOrder::Rgb, |x, _| match x {
            0 => Color::new(100, 100, 100),
            1 => Color::new(110, 90, 100),
            _ => Color::new(111, 100, 100),
        })
        .unwrap();
        let counts = color_distribution(&img, &[Color::gray(100)], DEFAULT_TOLERANCE);
        assert_eq!(counts.get(Color::gray(100)), Some(2));
    }

    #[test]
    fn test_double_counting_and_duplicates_kept() {
        let img = RgbImage::filled(2, 2, ChannelOrder::Rgb, Color::gray(100)).unwrap();
        let colors = [Color::gray(95), Color::gray(105), Color::gray(95)];
        let counts = color_distribution(&img, &colors, 5);
        assert_eq!(counts.len(), 3);
        // Every pixel is counted for all three entries
        assert!(counts.entries().iter().all(|&(_, n)| n == 4));
    }

    #[test]
    fn test_uncounted_pixels() {
        let img = RgbImage::filled(2, 2, ChannelOrder::Rgb, Color::gray(0)).unwrap();
        let counts = color_distribution(&img, &[Color::gray(200)], 10);
        assert_eq!(counts.get(Color::gray(200)), Some(0));
        assert_eq!(counts.get(Color::gray(1)), None);
    }

    #[test]
    fn test_palette_order_checked() {
        let img = RgbImage::filled(2, 2, ChannelOrder::Rgb, Color::gray(0)).unwrap();
        let palette = Palette::from_colors(ChannelOrder::Bgr, &[Color::gray(0)]);
        assert!(matches!(
            distribution(&img, &palette, 0),
            Err(ColorError::Core(tessera_core::Error::ChannelOrderMismatch { .. }))
        ));
    }

    #[test]
    fn test_color_mask() {
        let img = RgbImage::from_fn(4, 1, ChannelOrder::Rgb, |x, _| Color::gray((x * 10) as u8))
            .unwrap();
        let (count, mask) = color_mask(&img, Color::gray(10), 10).unwrap();
        assert_eq!(count, 3);
        assert!(mask.get(0, 0) && mask.get(2, 0) && !mask.get(3, 0));
    }

    #[test]
    fn test_sorted_and_top() {
        let img = RgbImage::from_fn(4, 1, ChannelOrder::Rgb, |x, _| {
            if x == 0 { Color::WHITE } else { Color::BLACK }
        })
        .unwrap();
        let counts = color_distribution(&img, &[Color::WHITE, Color::BLACK], 0);
        assert_eq!(counts.top(1), vec![(Color::BLACK, 3)]);
        assert_eq!(counts.sorted_by_count()[1], (Color::WHITE, 1));
    }
}
