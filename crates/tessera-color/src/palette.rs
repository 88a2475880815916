//! Palette extraction by k-means clustering
//!
//! Reduces an image to a fixed number of representative colors. Pixel
//! colors are clustered in RGB space with Lloyd's algorithm seeded by
//! k-means++; positions are ignored.
//!
//! Clustering runs on the distinct colors of the image, each weighted by
//! its pixel count. This gives exactly the same centroids as clustering
//! every pixel, at a fraction of the cost for typical photographs.

use crate::{ColorError, ColorResult};
use rand::{RngExt, SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use tessera_core::{ChannelOrder, Color, RgbImage};

// =============================================================================
// Constants
// =============================================================================

/// Default number of palette colors
pub const DEFAULT_PALETTE_SIZE: u32 = 10;

/// Default seed for k-means++ initialisation
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Default cap on Lloyd iterations
pub const DEFAULT_MAX_ITERATIONS: u32 = 300;

/// Default relative convergence tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

// =============================================================================
// Options
// =============================================================================

/// Options for palette extraction
#[derive(Debug, Clone)]
pub struct PaletteOptions {
    /// Number of palette colors (k). Must be > 0.
    pub palette_size: u32,

    /// Seed for the k-means++ initialisation. Identical seeds give
    /// identical palettes.
    pub random_seed: u64,

    /// Maximum number of Lloyd iterations. Must be > 0.
    pub max_iterations: u32,

    /// Convergence tolerance, relative to the mean per-channel variance
    /// of the image. Iteration stops once the summed squared centroid
    /// shift falls to or below `tolerance * variance`.
    pub tolerance: f64,

    /// Run the assignment step on the rayon thread pool. Has no effect
    /// unless the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            random_seed: DEFAULT_RANDOM_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl PaletteOptions {
    /// Set the palette size
    pub fn with_palette_size(mut self, palette_size: u32) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable or disable parallel assignment
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidConfiguration`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> ColorResult<()> {
        if self.palette_size == 0 {
            return Err(ColorError::InvalidConfiguration {
                parameter: "palette_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(ColorError::InvalidConfiguration {
                parameter: "max_iterations",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ColorError::InvalidConfiguration {
                parameter: "tolerance",
                reason: format!("must be finite and non-negative, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// One palette color with the number of pixels assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: Color,
    pub count: u64,
}

/// Ordered list of representative colors.
///
/// Entries keep cluster order. Colors are stored in the channel order
/// of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    order: ChannelOrder,
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Build a palette from entries in `order`.
    pub fn new(order: ChannelOrder, entries: Vec<PaletteEntry>) -> Self {
        Self { order, entries }
    }

    /// Build a palette of bare colors with zero counts.
    pub fn from_colors(order: ChannelOrder, colors: &[Color]) -> Self {
        Self::new(
            order,
            colors
                .iter()
                .map(|&color| PaletteEntry { color, count: 0 })
                .collect(),
        )
    }

    /// Channel order of the palette colors.
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in cluster order.
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Colors in cluster order.
    pub fn colors(&self) -> Vec<Color> {
        self.entries.iter().map(|e| e.color).collect()
    }

    /// Sum of all entry counts.
    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries sorted by descending count; ties keep cluster order.
    pub fn sorted_by_count(&self) -> Vec<PaletteEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    /// The `n` most frequent entries.
    pub fn top(&self, n: usize) -> Vec<PaletteEntry> {
        let mut sorted = self.sorted_by_count();
        sorted.truncate(n);
        sorted
    }
}

/// Output of [`extract_palette`].
#[derive(Debug, Clone)]
pub struct PaletteExtraction {
    /// Exactly `palette_size` entries
    pub palette: Palette,
    /// Input with every pixel replaced by its palette color
    pub quantized: RgbImage,
    /// Sum of squared distances from pixels to their centroids
    pub inertia: f64,
    /// Lloyd iterations performed
    pub iterations: u32,
    /// Whether the tolerance or a stable assignment ended the loop
    pub converged: bool,
}

// =============================================================================
// Main API
// =============================================================================

/// Extract a palette and quantized image by k-means clustering.
///
/// # Arguments
///
/// * `image` - Input image (any channel order; the palette uses the same order)
/// * `options` - Clustering parameters
///
/// # Returns
///
/// A palette with exactly `palette_size` entries even when the image has
/// fewer distinct colors (duplicate colors are allowed), and the quantized
/// image.
///
/// # Example
///
/// ```no_run
/// use tessera_color::palette::{PaletteOptions, extract_palette};
/// use tessera_core::{ChannelOrder, Color, RgbImage};
///
/// let img = RgbImage::filled(8, 8, ChannelOrder::Rgb, Color::gray(50)).unwrap();
/// let result = extract_palette(&img, &PaletteOptions::default().with_palette_size(3)).unwrap();
/// assert_eq!(result.palette.len(), 3);
/// ```
pub fn extract_palette(image: &RgbImage, options: &PaletteOptions) -> ColorResult<PaletteExtraction> {
    options.validate()?;

    let points = WeightedPoints::from_image(image);
    let k = options.palette_size as usize;
    let mut rng = StdRng::seed_from_u64(options.random_seed);

    let mut centers = kmeans_plus_plus(&points, k, &mut rng);
    let tol = options.tolerance * points.mean_variance();

    let mut assignment: Vec<(u32, f64)> = Vec::new();
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=options.max_iterations {
        iterations = iter;
        let next = assign(&points.colors, &centers, options.parallel);
        let changed = if assignment.is_empty() {
            next.len()
        } else {
            next.iter()
                .zip(assignment.iter())
                .filter(|(a, b)| a.0 != b.0)
                .count()
        };
        assignment = next;

        let new_centers = update_centers(&points, &assignment, &centers);
        let shift: f64 = centers
            .iter()
            .zip(new_centers.iter())
            .map(|(a, b)| sq_dist(a, b))
            .sum();
        centers = new_centers;

        tracing::debug!(iteration = iter, changed, shift, "k-means iteration");

        if changed == 0 || shift <= tol {
            converged = true;
            break;
        }
    }

    // Final assignment against the final centroids
    let assignment = assign(&points.colors, &centers, options.parallel);
    let inertia: f64 = assignment
        .iter()
        .zip(points.weights.iter())
        .map(|(&(_, d), &w)| d * w)
        .sum();

    let colors: Vec<Color> = centers.iter().map(center_color).collect();
    let mut counts = vec![0u64; k];
    for (&(label, _), &w) in assignment.iter().zip(points.weights.iter()) {
        counts[label as usize] += w as u64;
    }

    let mut data = Vec::with_capacity(image.data().len());
    for &idx in &points.pixel_index {
        let label = assignment[idx as usize].0 as usize;
        data.extend_from_slice(&colors[label].0);
    }
    let quantized = RgbImage::from_raw(image.width(), image.height(), image.order(), data)?;

    tracing::debug!(
        k,
        distinct = points.colors.len(),
        iterations,
        converged,
        inertia,
        "palette extracted"
    );

    let entries = colors
        .into_iter()
        .zip(counts)
        .map(|(color, count)| PaletteEntry { color, count })
        .collect();

    Ok(PaletteExtraction {
        palette: Palette::new(image.order(), entries),
        quantized,
        inertia,
        iterations,
        converged,
    })
}

/// Extract a palette with default iteration settings.
pub fn extract_palette_simple(
    image: &RgbImage,
    palette_size: u32,
    random_seed: u64,
) -> ColorResult<PaletteExtraction> {
    let options = PaletteOptions::default()
        .with_palette_size(palette_size)
        .with_random_seed(random_seed);
    extract_palette(image, &options)
}

// =============================================================================
// Internals
// =============================================================================

/// Distinct image colors with pixel-count weights.
struct WeightedPoints {
    colors: Vec<[f64; 3]>,
    weights: Vec<f64>,
    /// For every pixel, the index of its distinct color
    pixel_index: Vec<u32>,
}

impl WeightedPoints {
    fn from_image(image: &RgbImage) -> Self {
        let mut index: HashMap<Color, u32> = HashMap::new();
        let mut colors = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut pixel_index = Vec::with_capacity(image.pixel_count());

        for c in image.pixels() {
            let idx = *index.entry(c).or_insert_with(|| {
                colors.push([f64::from(c.0[0]), f64::from(c.0[1]), f64::from(c.0[2])]);
                weights.push(0.0);
                (colors.len() - 1) as u32
            });
            weights[idx as usize] += 1.0;
            pixel_index.push(idx);
        }

        Self {
            colors,
            weights,
            pixel_index,
        }
    }

    fn mean_variance(&self) -> f64 {
        let total: f64 = self.weights.iter().sum();
        let mut var = 0.0;
        for ch in 0..3 {
            let mean = self
                .colors
                .iter()
                .zip(&self.weights)
                .map(|(c, w)| c[ch] * w)
                .sum::<f64>()
                / total;
            var += self
                .colors
                .iter()
                .zip(&self.weights)
                .map(|(c, w)| (c[ch] - mean).powi(2) * w)
                .sum::<f64>()
                / total;
        }
        var / 3.0
    }
}

#[inline]
fn sq_dist(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Integer palette color of a centroid; fractions are truncated.
fn center_color(c: &[f64; 3]) -> Color {
    let t = |v: f64| v.floor().clamp(0.0, 255.0) as u8;
    Color::new(t(c[0]), t(c[1]), t(c[2]))
}

/// Index and squared distance of the nearest center; ties go to the lowest index.
#[inline]
fn nearest(point: &[f64; 3], centers: &[[f64; 3]]) -> (u32, f64) {
    let mut best = (0u32, f64::INFINITY);
    for (i, c) in centers.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best.1 {
            best = (i as u32, d);
        }
    }
    best
}

fn assign(points: &[[f64; 3]], centers: &[[f64; 3]], parallel: bool) -> Vec<(u32, f64)> {
    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;
        return points.par_iter().map(|p| nearest(p, centers)).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    points.iter().map(|p| nearest(p, centers)).collect()
}

/// Sample an index with probability proportional to `weights`.
fn sample_weighted(weights: &[f64], total: f64, rng: &mut StdRng) -> usize {
    let mut target = rng.random::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return i;
        }
        target -= w;
    }
    // Rounding can leave target just past the end
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

/// k-means++ seeding over weighted points.
///
/// When every point already coincides with a chosen center the next
/// center is drawn by weight alone, producing a duplicate.
fn kmeans_plus_plus(points: &WeightedPoints, k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let total_weight: f64 = points.weights.iter().sum();
    let first = sample_weighted(&points.weights, total_weight, rng);
    let mut centers = vec![points.colors[first]];
    let mut min_d: Vec<f64> = points
        .colors
        .iter()
        .map(|p| sq_dist(p, &points.colors[first]))
        .collect();

    while centers.len() < k {
        let scores: Vec<f64> = min_d
            .iter()
            .zip(&points.weights)
            .map(|(d, w)| d * w)
            .collect();
        let total: f64 = scores.iter().sum();
        let pick = if total > 0.0 {
            sample_weighted(&scores, total, rng)
        } else {
            sample_weighted(&points.weights, total_weight, rng)
        };
        let c = points.colors[pick];
        for (d, p) in min_d.iter_mut().zip(&points.colors) {
            *d = d.min(sq_dist(p, &c));
        }
        centers.push(c);
    }
    centers
}

/// Weighted mean of each cluster.
///
/// An empty cluster is moved onto the point farthest from its current
/// center, if any point is not already sitting on one; otherwise it keeps
/// its previous position.
fn update_centers(
    points: &WeightedPoints,
    assignment: &[(u32, f64)],
    previous: &[[f64; 3]],
) -> Vec<[f64; 3]> {
    let k = previous.len();
    let mut sums = vec![[0.0f64; 3]; k];
    let mut weights = vec![0.0f64; k];
    for ((&(label, _), p), &w) in assignment.iter().zip(&points.colors).zip(&points.weights) {
        let s = &mut sums[label as usize];
        s[0] += p[0] * w;
        s[1] += p[1] * w;
        s[2] += p[2] * w;
        weights[label as usize] += w;
    }

    let mut centers: Vec<[f64; 3]> = (0..k)
        .map(|j| {
            if weights[j] > 0.0 {
                let w = weights[j];
                [sums[j][0] / w, sums[j][1] / w, sums[j][2] / w]
            } else {
                previous[j]
            }
        })
        .collect();

    let mut far: Vec<usize> = (0..assignment.len())
        .filter(|&i| assignment[i].1 > 0.0)
        .collect();
    // Farthest first; stable on index for determinism
    far.sort_by(|&a, &b| assignment[b].1.total_cmp(&assignment[a].1));
    let mut far = far.into_iter();

    for j in 0..k {
        if weights[j] > 0.0 {
            continue;
        }
        if let Some(i) = far.next() {
            tracing::trace!(cluster = j, point = i, "relocating empty cluster");
            centers[j] = points.colors[i];
        }
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(a: Color, b: Color) -> RgbImage {
        RgbImage::from_fn(4, 4, ChannelOrder::Rgb, |x, y| {
            if (x + y) % 2 == 0 { a } else { b }
        })
        .unwrap()
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let base = PaletteOptions::default();
        for (opts, name) in [
            (base.clone().with_palette_size(0), "palette_size"),
            (base.clone().with_max_iterations(0), "max_iterations"),
            (base.clone().with_tolerance(-1.0), "tolerance"),
            (base.clone().with_tolerance(f64::NAN), "tolerance"),
        ] {
            match opts.validate() {
                Err(ColorError::InvalidConfiguration { parameter, .. }) => {
                    assert_eq!(parameter, name)
                }
                other => panic!("expected InvalidConfiguration, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_checkerboard_recovered_exactly() {
        let a = Color::new(200, 30, 30);
        let b = Color::new(20, 40, 220);
        let img = checkerboard(a, b);
        let result = extract_palette_simple(&img, 2, 42).unwrap();

        let mut colors = result.palette.colors();
        colors.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(colors, expected);
        assert_eq!(result.quantized, img);
        assert_eq!(result.palette.total_count(), 16);
        assert!(result.converged);
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_exactly_k_with_fewer_distinct_colors() {
        let img = RgbImage::filled(5, 5, ChannelOrder::Rgb, Color::gray(77)).unwrap();
        let result = extract_palette_simple(&img, 4, 1).unwrap();
        assert_eq!(result.palette.len(), 4);
        assert!(
            result
                .palette
                .colors()
                .iter()
                .all(|&c| c == Color::gray(77))
        );
        assert_eq!(result.quantized, img);
        assert_eq!(result.palette.total_count(), 25);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let img = RgbImage::from_fn(16, 16, ChannelOrder::Rgb, |x, y| {
            Color::new((x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8)
        })
        .unwrap();
        let r1 = extract_palette_simple(&img, 5, 7).unwrap();
        let r2 = extract_palette_simple(&img, 5, 7).unwrap();
        assert_eq!(r1.palette, r2.palette);
        assert_eq!(r1.quantized, r2.quantized);
    }

    #[test]
    fn test_bgr_palette_keeps_order() {
        let img = checkerboard(Color::new(1, 2, 3), Color::new(250, 250, 250))
            .to_order(ChannelOrder::Bgr);
        let result = extract_palette_simple(&img, 2, 42).unwrap();
        assert_eq!(result.palette.order(), ChannelOrder::Bgr);
        assert!(result.palette.colors().contains(&Color::new(3, 2, 1)));
        assert_eq!(result.quantized.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn test_sorted_by_count_and_top() {
        let palette = Palette::new(
            ChannelOrder::Rgb,
            vec![
                PaletteEntry {
                    color: Color::gray(1),
                    count: 5,
                },
                PaletteEntry {
                    color: Color::gray(2),
                    count: 9,
                },
                PaletteEntry {
                    color: Color::gray(3),
                    count: 5,
                },
            ],
        );
        let sorted = palette.sorted_by_count();
        assert_eq!(sorted[0].color, Color::gray(2));
        assert_eq!(sorted[1].color, Color::gray(1));
        assert_eq!(sorted[2].color, Color::gray(3));
        assert_eq!(palette.top(1).len(), 1);
        assert_eq!(palette.top(10).len(), 3);
    }

    #[test]
    fn test_counts_partition_pixels() {
        let img = RgbImage::from_fn(10, 10, ChannelOrder::Rgb, |x, _| {
            if x < 3 {
                Color::new(255, 0, 0)
            } else if x < 7 {
                Color::new(0, 255, 0)
            } else {
                Color::new(0, 0, 255)
            }
        })
        .unwrap();
        let result = extract_palette_simple(&img, 3, 42).unwrap();
        let mut counts: Vec<u64> = result.palette.entries().iter().map(|e| e.count).collect();
        counts.sort();
        assert_eq!(counts, vec![30, 30, 40]);
    }

    #[test]
    fn test_centroid_fractions_truncated() {
        // Channel means 0.5, 100.75 and 10.5
        let pixels = [
            Color::new(0, 100, 10),
            Color::new(1, 101, 11),
            Color::new(0, 101, 10),
            Color::new(1, 101, 11),
        ];
        let img = RgbImage::from_fn(4, 1, ChannelOrder::Rgb, |x, _| pixels[x as usize]).unwrap();
        let result = extract_palette_simple(&img, 1, 42).unwrap();
        assert_eq!(result.palette.colors(), vec![Color::new(0, 100, 10)]);
        assert!(result.quantized.pixels().all(|c| c == Color::new(0, 100, 10)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let img = RgbImage::from_fn(97, 61, ChannelOrder::Rgb, |x, y| {
            Color::new((x * 255 / 96) as u8, (y * 255 / 60) as u8, ((x + y) * 3 % 256) as u8)
        })
        .unwrap();
        let options = PaletteOptions::default().with_palette_size(6);
        let seq = extract_palette(&img, &options.clone().with_parallel(false)).unwrap();
        let par = extract_palette(&img, &options.with_parallel(true)).unwrap();
        assert_eq!(seq.palette, par.palette);
        assert_eq!(seq.quantized, par.quantized);
        assert_eq!(seq.iterations, par.iterations);
    }
}
