//! Region summaries
//!
//! Functions that turn a label map back into pixels: per-segment mean
//! colors, mean-recolored images and segment boundary overlays.

use crate::error::SuperpixelResult;
use tessera_core::{Color, LabelMap, Mask, RgbImage};

/// Pixel count and mean color of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentStats {
    pub label: u32,
    pub pixel_count: u64,
    /// Per-channel mean, rounded half-up, in the image's channel order
    pub mean: Color,
}

/// Compute statistics for every segment, indexed by label.
///
/// # Errors
///
/// Returns a dimension mismatch error if `image` and `label_map` differ
/// in size.
pub fn segment_stats(image: &RgbImage, label_map: &LabelMap) -> SuperpixelResult<Vec<SegmentStats>> {
    image.ensure_size(label_map.width(), label_map.height())?;

    let n = label_map.segment_count() as usize;
    let mut sums = vec![[0u64; 3]; n];
    let mut counts = vec![0u64; n];
    for (px, &label) in image.data().chunks_exact(3).zip(label_map.labels()) {
        let s = &mut sums[label as usize];
        s[0] += u64::from(px[0]);
        s[1] += u64::from(px[1]);
        s[2] += u64::from(px[2]);
        counts[label as usize] += 1;
    }

    Ok(sums
        .iter()
        .zip(&counts)
        .enumerate()
        .map(|(label, (s, &count))| {
            // Dense labels guarantee count > 0
            let mean = |sum: u64| ((sum * 2 + count) / (count * 2)) as u8;
            SegmentStats {
                label: label as u32,
                pixel_count: count,
                mean: Color::new(mean(s[0]), mean(s[1]), mean(s[2])),
            }
        })
        .collect())
}

/// Replace every segment by its mean color.
///
/// The input is left untouched; the result has the same size and channel
/// order.
///
/// # Errors
///
/// Returns a dimension mismatch error if `image` and `label_map` differ
/// in size.
///
/// # Example
///
/// ```no_run
/// use tessera_superpixel::{SlicOptions, recolor, segment};
///
/// let img = tessera_io::read_image("photo.jpg").unwrap();
/// let labels = segment(&img, &SlicOptions::for_image(img.width(), img.height())).unwrap();
/// let mosaic = recolor(&img, &labels).unwrap();
/// ```
pub fn recolor(image: &RgbImage, label_map: &LabelMap) -> SuperpixelResult<RgbImage> {
    let stats = segment_stats(image, label_map)?;
    let recolored = RgbImage::from_fn(image.width(), image.height(), image.order(), |x, y| {
        stats[label_map.label(x, y) as usize].mean
    })?;
    tracing::trace!(segments = stats.len(), "recolored image");
    Ok(recolored)
}

/// Mark pixels that have a 4-neighbour with a different label.
pub fn boundary_mask(label_map: &LabelMap) -> SuperpixelResult<Mask> {
    let (width, height) = label_map.dimensions();
    let mut mask = Mask::new(width, height)?;
    for y in 0..height {
        for x in 0..width {
            if label_map.is_boundary(x, y) {
                mask.set(x, y, true);
            }
        }
    }
    Ok(mask)
}

/// Default boundary marker: pure green in the given channel order.
pub fn boundary_color(order: tessera_core::ChannelOrder) -> Color {
    Color::from_rgb(0, 255, 0, order)
}

/// Paint `color` over the pixels set in `mask`.
///
/// # Errors
///
/// Returns a dimension mismatch error if `image` and `mask` differ in size.
pub fn overlay_boundaries(image: &RgbImage, mask: &Mask, color: Color) -> SuperpixelResult<RgbImage> {
    image.ensure_size(mask.width(), mask.height())?;
    let mut out = image.to_mut();
    for (px, _) in out
        .data_mut()
        .chunks_exact_mut(3)
        .zip(mask.bits())
        .filter(|&(_, &set)| set)
    {
        px.copy_from_slice(&color.0);
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ChannelOrder;

    fn striped() -> (RgbImage, LabelMap) {
        // Left two columns: 10 and 13 alternating; right column: 200
        let img = RgbImage::from_fn(3, 2, ChannelOrder::Rgb, |x, y| match (x, y) {
            (2, _) => Color::gray(200),
            (_, 0) => Color::new(10, 0, 1),
            _ => Color::new(13, 0, 2),
        })
        .unwrap();
        let map = LabelMap::from_raw(3, 2, vec![0, 0, 1, 0, 0, 1]).unwrap();
        (img, map)
    }

    #[test]
    fn test_segment_stats_round_half_up() {
        let (img, map) = striped();
        let stats = segment_stats(&img, &map).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].pixel_count, 4);
        // (10+10+13+13)/4 = 11.5 -> 12, (1+1+2+2)/4 = 1.5 -> 2
        assert_eq!(stats[0].mean, Color::new(12, 0, 2));
        assert_eq!(stats[1].mean, Color::gray(200));
    }

    #[test]
    fn test_recolor_uniform_segments() {
        let (img, map) = striped();
        let out = recolor(&img, &map).unwrap();
        assert_eq!(out.dimensions(), img.dimensions());
        assert_eq!(out.pixel(0, 0), out.pixel(1, 1));
        assert_eq!(out.pixel(2, 1), Color::gray(200));
        // Input untouched
        assert_eq!(img.pixel(0, 0), Color::new(10, 0, 1));
    }

    #[test]
    fn test_dimension_mismatch() {
        let (img, _) = striped();
        let map = LabelMap::from_raw(2, 2, vec![0; 4]).unwrap();
        assert!(recolor(&img, &map).is_err());
        assert!(segment_stats(&img, &map).is_err());
    }

    #[test]
    fn test_boundary_overlay() {
        let (img, map) = striped();
        let mask = boundary_mask(&map).unwrap();
        assert_eq!(mask.bits(), &[false, true, true, false, true, true]);

        let green = boundary_color(ChannelOrder::Bgr);
        assert_eq!(green, Color::new(0, 255, 0));
        let out = overlay_boundaries(&img, &mask, green).unwrap();
        assert_eq!(out.pixel(1, 0), green);
        assert_eq!(out.pixel(0, 0), img.pixel(0, 0));
    }
}
