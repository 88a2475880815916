//! Serializable palette summaries
//!
//! Presentation-side view of a palette extraction joined with its color
//! distribution, ready to be printed or dumped as JSON.

use serde::Serialize;
use tessera_color::{ColorCountMap, PaletteExtraction};

/// One palette color with its coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorReport {
    /// `#RRGGBB`
    pub hex: String,
    pub rgb: [u8; 3],
    /// Pixels assigned to this color by clustering
    pub cluster_pixels: u64,
    /// Pixels within the tolerance band
    pub band_pixels: u64,
    /// `band_pixels` as a fraction of the image
    pub share: f64,
}

/// Palette of one image, most frequent color first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteReport {
    pub width: u32,
    pub height: u32,
    pub tolerance: u32,
    pub iterations: u32,
    pub converged: bool,
    pub colors: Vec<ColorReport>,
}

impl PaletteReport {
    /// Join an extraction with its distribution and keep the `top` colors
    /// by clustered pixel count.
    pub fn new(
        extraction: &PaletteExtraction,
        counts: &ColorCountMap,
        tolerance: u32,
        top: usize,
    ) -> Self {
        let (width, height) = extraction.quantized.dimensions();
        let total = (u64::from(width) * u64::from(height)).max(1) as f64;
        let order = extraction.palette.order();

        let colors = extraction
            .palette
            .top(top)
            .into_iter()
            .map(|entry| {
                let band_pixels = counts.get(entry.color).unwrap_or(0);
                let (r, g, b) = entry.color.to_rgb(order);
                ColorReport {
                    hex: entry.color.to_hex(order),
                    rgb: [r, g, b],
                    cluster_pixels: entry.count,
                    band_pixels,
                    share: band_pixels as f64 / total,
                }
            })
            .collect();

        Self {
            width,
            height,
            tolerance,
            iterations: extraction.iterations,
            converged: extraction.converged,
            colors,
        }
    }
}
