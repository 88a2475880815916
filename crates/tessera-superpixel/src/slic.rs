//! SLIC superpixel clustering
//!
//! Simple Linear Iterative Clustering groups pixels by a combined color
//! and spatial distance. The algorithm proceeds in 4 phases:
//! 1. **Seed**: Place centers on a grid of spacing S, optionally nudged
//!    off edges
//! 2. **Assign**: Each pixel joins the nearest center whose `2S x 2S`
//!    window contains it
//! 3. **Update**: Centers move to the mean position and color of their
//!    pixels; empty clusters are dropped
//! 4. **Enforce**: Stray fragments are absorbed so that every segment is
//!    4-connected, then similar neighbours are optionally merged
//!
//! Phases 2 and 3 repeat until a pass changes no label or the iteration
//! cap is reached.

use crate::connectivity::{enforce_connectivity, merge_similar};
use crate::error::SuperpixelResult;
use crate::options::{ClusteringVariant, SlicOptions};
use crate::seeds::{Seed, gradient_map, grid_seeds, manifold_seeds, perturb};
use std::sync::atomic::{AtomicBool, Ordering};
use tessera_color::{Lab, image_to_lab};
use tessera_core::{LabelMap, RgbImage};

// =============================================================================
// Constants
// =============================================================================

/// Initial squared color spread of every cluster in the zero-parameter
/// variant (a color distance of 10).
const INITIAL_COLOR_SPREAD: f32 = 100.0;

/// Floor on the squared color spread, keeping uniform clusters finite.
const MIN_COLOR_SPREAD: f32 = 1.0;

// =============================================================================
// Results
// =============================================================================

/// Label map plus bookkeeping from one clustering run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Dense, 4-connected labelling
    pub label_map: LabelMap,
    /// Number of seeds placed before iterating
    pub seed_count: usize,
    /// Assignment/update passes performed
    pub iterations: u32,
    /// A pass finished without changing any label
    pub converged: bool,
    /// Iteration stopped early on request
    pub cancelled: bool,
}

// =============================================================================
// Main API
// =============================================================================

/// Partition an image into superpixels.
///
/// # Arguments
///
/// * `image` - Input image (either channel order)
/// * `options` - Clustering parameters
///
/// # Returns
///
/// A dense label map in which every segment is 4-connected.
///
/// # Errors
///
/// Returns [`crate::SuperpixelError::InvalidConfiguration`] for invalid
/// options, before any computation.
///
/// # Example
///
/// ```no_run
/// use tessera_core::{ChannelOrder, Color, RgbImage};
/// use tessera_superpixel::{SlicOptions, segment};
///
/// let img = RgbImage::filled(100, 100, ChannelOrder::Rgb, Color::gray(128)).unwrap();
/// let labels = segment(&img, &SlicOptions::default().with_region_size(25)).unwrap();
/// assert_eq!(labels.segment_count(), 1);
/// ```
pub fn segment(image: &RgbImage, options: &SlicOptions) -> SuperpixelResult<LabelMap> {
    Ok(segment_detailed(image, options)?.label_map)
}

/// Partition an image into superpixels, reporting iteration details.
pub fn segment_detailed(image: &RgbImage, options: &SlicOptions) -> SuperpixelResult<Segmentation> {
    segment_cancellable(image, options, &AtomicBool::new(false))
}

/// Partition an image into superpixels with cooperative cancellation.
///
/// `cancel` is polled after each completed pass. Once it reads `true` the
/// loop stops and the current labelling still goes through connectivity
/// enforcement, so the result is always a valid label map.
pub fn segment_cancellable(
    image: &RgbImage,
    options: &SlicOptions,
    cancel: &AtomicBool,
) -> SuperpixelResult<Segmentation> {
    options.validate()?;

    let (width, height) = image.dimensions();
    let lab = image_to_lab(image);
    let ctx = Context {
        lab: &lab,
        width: width as usize,
        height: height as usize,
        variant: options.variant,
        compactness: options.compactness,
        bucket: options.region_size as f32,
        parallel: options.parallel,
    };

    let seeds = place_seeds(&ctx, options);
    let seed_count = seeds.len();
    let mut labels = initial_labels(&seeds, ctx.width, ctx.height);
    let mut centers: Vec<Center> = seeds
        .iter()
        .map(|s| Center {
            x: s.x as f32,
            y: s.y as f32,
            color: lab[s.y as usize * ctx.width + s.x as usize],
            step: s.step,
            color_spread: INITIAL_COLOR_SPREAD,
        })
        .collect();

    tracing::debug!(
        width,
        height,
        variant = %options.variant,
        region_size = options.region_size,
        seeds = seed_count,
        "starting superpixel clustering"
    );

    let mut scratch = vec![0u32; labels.len()];
    let mut iterations = 0;
    let mut converged = false;
    let mut cancelled = false;

    for iter in 1..=options.max_iterations {
        let index = CenterIndex::build(&centers, &ctx);
        let changed = assign_all(&ctx, &centers, &index, &labels, &mut scratch);
        std::mem::swap(&mut labels, &mut scratch);
        iterations = iter;

        centers = update_centers(&ctx, &centers, &mut labels);
        tracing::debug!(iteration = iter, changed, clusters = centers.len(), "clustering pass");

        if changed == 0 {
            converged = true;
            break;
        }
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            tracing::debug!(iteration = iter, "clustering cancelled");
            break;
        }
    }

    let connected = enforce_connectivity(&labels, ctx.width, ctx.height);
    let mut label_map = LabelMap::from_sparse(width, height, &connected)?;
    if let Some(threshold) = options.merge_threshold {
        label_map = merge_similar(image, &label_map, threshold)?;
    }

    tracing::debug!(
        segments = label_map.segment_count(),
        iterations,
        converged,
        "superpixel clustering finished"
    );

    Ok(Segmentation {
        label_map,
        seed_count,
        iterations,
        converged,
        cancelled,
    })
}

// =============================================================================
// Internals
// =============================================================================

/// Read-only state shared by every pass.
struct Context<'a> {
    lab: &'a [Lab],
    width: usize,
    height: usize,
    variant: ClusteringVariant,
    compactness: f32,
    /// Bucket edge for the center index (the grid spacing S)
    bucket: f32,
    parallel: bool,
}

#[derive(Debug, Clone, Copy)]
struct Center {
    x: f32,
    y: f32,
    color: Lab,
    /// Spatial normaliser; manifold sub-seeds use half the grid spacing
    step: f32,
    /// Largest squared color distance seen in the cluster (zero-parameter only)
    color_spread: f32,
}

fn place_seeds(ctx: &Context<'_>, options: &SlicOptions) -> Vec<Seed> {
    let (w, h) = (ctx.width as u32, ctx.height as u32);
    let needs_gradient =
        options.perturb_seeds || options.variant == ClusteringVariant::ManifoldSeeded;
    let gradient = if needs_gradient {
        gradient_map(ctx.lab, ctx.width, ctx.height)
    } else {
        Vec::new()
    };

    let mut seeds = match options.variant {
        ClusteringVariant::ManifoldSeeded => {
            manifold_seeds(&gradient, w, h, options.region_size, options.compactness)
        }
        _ => grid_seeds(w, h, options.region_size),
    };
    if options.perturb_seeds {
        perturb(&mut seeds, &gradient, w, h);
    }
    seeds
}

fn initial_labels(seeds: &[Seed], width: usize, height: usize) -> Vec<u32> {
    let mut labels = vec![0u32; width * height];
    for (k, seed) in seeds.iter().enumerate() {
        let c = seed.cell;
        for y in c.y0 as usize..c.y1 as usize {
            labels[y * width + c.x0 as usize..y * width + c.x1 as usize].fill(k as u32);
        }
    }
    labels
}

/// Centers bucketed on an S-spaced grid.
///
/// A center within S of a pixel (per axis) always lies in the pixel's
/// bucket or one of its 8 neighbours.
struct CenterIndex {
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<u32>>,
}

impl CenterIndex {
    fn build(centers: &[Center], ctx: &Context<'_>) -> Self {
        let cols = (ctx.width as f32 / ctx.bucket).ceil().max(1.0) as usize;
        let rows = (ctx.height as f32 / ctx.bucket).ceil().max(1.0) as usize;
        let mut buckets = vec![Vec::new(); cols * rows];
        for (k, c) in centers.iter().enumerate() {
            let bx = ((c.x / ctx.bucket) as usize).min(cols - 1);
            let by = ((c.y / ctx.bucket) as usize).min(rows - 1);
            buckets[by * cols + bx].push(k as u32);
        }
        Self {
            cols,
            rows,
            buckets,
        }
    }

    fn candidates(&self, bx: usize, by: usize) -> impl Iterator<Item = u32> + '_ {
        let x0 = bx.saturating_sub(1);
        let x1 = (bx + 1).min(self.cols - 1);
        let y0 = by.saturating_sub(1);
        let y1 = (by + 1).min(self.rows - 1);
        (y0..=y1).flat_map(move |y| {
            (x0..=x1).flat_map(move |x| self.buckets[y * self.cols + x].iter().copied())
        })
    }
}

/// Assign one row; returns the number of pixels whose label changed.
fn assign_row(
    ctx: &Context<'_>,
    centers: &[Center],
    index: &CenterIndex,
    y: usize,
    prev: &[u32],
    out: &mut [u32],
) -> usize {
    let m2 = ctx.compactness * ctx.compactness;
    let by = ((y as f32 / ctx.bucket) as usize).min(index.rows - 1);
    let fy = y as f32;
    let mut changed = 0;

    for x in 0..ctx.width {
        let bx = ((x as f32 / ctx.bucket) as usize).min(index.cols - 1);
        let fx = x as f32;
        let color = ctx.lab[y * ctx.width + x];
        let mut best: Option<(f32, u32)> = None;

        for k in index.candidates(bx, by) {
            let c = &centers[k as usize];
            let dx = fx - c.x;
            let dy = fy - c.y;
            // Every center searches a 2S x 2S window, whatever its scale
            if dx.abs() > ctx.bucket || dy.abs() > ctx.bucket {
                continue;
            }
            let dc = color.distance_squared(c.color);
            let ds = (dx * dx + dy * dy) / (c.step * c.step);
            let d = match ctx.variant {
                ClusteringVariant::ZeroParameter => dc / c.color_spread + ds,
                ClusteringVariant::Standard | ClusteringVariant::ManifoldSeeded => dc + ds * m2,
            };
            let better = match best {
                None => true,
                Some((bd, bk)) => d < bd || (d == bd && k < bk),
            };
            if better {
                best = Some((d, k));
            }
        }

        let label = best.map_or(prev[x], |(_, k)| k);
        if label != prev[x] {
            changed += 1;
        }
        out[x] = label;
    }
    changed
}

/// Assignment phase over all rows. Rows only read shared center state
/// and write their own slice of `next`.
fn assign_all(
    ctx: &Context<'_>,
    centers: &[Center],
    index: &CenterIndex,
    prev: &[u32],
    next: &mut [u32],
) -> usize {
    #[cfg(feature = "parallel")]
    if ctx.parallel {
        use rayon::prelude::*;
        return next
            .par_chunks_mut(ctx.width)
            .zip(prev.par_chunks(ctx.width))
            .enumerate()
            .map(|(y, (out, prev_row))| assign_row(ctx, centers, index, y, prev_row, out))
            .sum();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = ctx.parallel;

    next.chunks_mut(ctx.width)
        .zip(prev.chunks(ctx.width))
        .enumerate()
        .map(|(y, (out, prev_row))| assign_row(ctx, centers, index, y, prev_row, out))
        .sum()
}

/// Update phase: recompute centers as member means, drop empty clusters
/// and renumber `labels` to match the surviving centers.
fn update_centers(ctx: &Context<'_>, centers: &[Center], labels: &mut [u32]) -> Vec<Center> {
    let k = centers.len();
    // x, y, L, a, b, count
    let mut sums = vec![[0.0f64; 6]; k];
    let mut spread = vec![0.0f32; k];

    for (i, &label) in labels.iter().enumerate() {
        let l = label as usize;
        let color = ctx.lab[i];
        let s = &mut sums[l];
        s[0] += (i % ctx.width) as f64;
        s[1] += (i / ctx.width) as f64;
        s[2] += f64::from(color.l);
        s[3] += f64::from(color.a);
        s[4] += f64::from(color.b);
        s[5] += 1.0;
        let d = color.distance_squared(centers[l].color);
        if d > spread[l] {
            spread[l] = d;
        }
    }

    let mut remap = vec![u32::MAX; k];
    let mut updated = Vec::with_capacity(k);
    for (old, s) in sums.iter().enumerate() {
        let n = s[5];
        if n == 0.0 {
            tracing::trace!(cluster = old, "dropping empty cluster");
            continue;
        }
        remap[old] = updated.len() as u32;
        updated.push(Center {
            x: (s[0] / n) as f32,
            y: (s[1] / n) as f32,
            color: Lab::new((s[2] / n) as f32, (s[3] / n) as f32, (s[4] / n) as f32),
            step: centers[old].step,
            color_spread: spread[old].max(MIN_COLOR_SPREAD),
        });
    }

    if updated.len() != k {
        for label in labels.iter_mut() {
            *label = remap[*label as usize];
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuperpixelError;
    use tessera_core::{ChannelOrder, Color};

    fn two_halves(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, ChannelOrder::Rgb, |x, _| {
            if x < width / 2 {
                Color::new(220, 30, 30)
            } else {
                Color::new(30, 30, 220)
            }
        })
        .unwrap()
    }

    #[test]
    fn test_uniform_gray_single_segment() {
        let img = RgbImage::filled(100, 100, ChannelOrder::Rgb, Color::gray(128)).unwrap();
        let options = SlicOptions::default()
            .with_region_size(25)
            .with_compactness(10.0)
            .with_max_iterations(10);
        let result = segment_detailed(&img, &options).unwrap();
        assert_eq!(result.seed_count, 16);
        assert_eq!(result.label_map.segment_count(), 1);
    }

    #[test]
    fn test_uniform_gray_without_merge_keeps_grid() {
        let img = RgbImage::filled(100, 100, ChannelOrder::Rgb, Color::gray(128)).unwrap();
        let options = SlicOptions::default()
            .with_region_size(25)
            .with_merge_threshold(None);
        for variant in [ClusteringVariant::Standard, ClusteringVariant::ZeroParameter] {
            let map = segment(&img, &options.clone().with_variant(variant)).unwrap();
            assert_eq!(map.segment_count(), 16, "variant {variant}");
            assert!(map.is_four_connected());
        }
    }

    #[test]
    fn test_image_smaller_than_region() {
        let img = RgbImage::filled(7, 5, ChannelOrder::Rgb, Color::gray(3)).unwrap();
        let result = segment_detailed(&img, &SlicOptions::default().with_region_size(50)).unwrap();
        assert_eq!(result.seed_count, 1);
        assert_eq!(result.label_map.segment_count(), 1);
    }

    #[test]
    fn test_two_halves_split_on_color_edge() {
        let img = two_halves(40, 20);
        let options = SlicOptions::default()
            .with_region_size(10)
            .with_variant(ClusteringVariant::Standard);
        let map = segment(&img, &options).unwrap();
        assert_eq!(map.segment_count(), 2);
        assert_ne!(map.label(0, 0), map.label(39, 19));
        for y in 0..20 {
            assert_eq!(map.label(19, y), map.label(0, 0));
            assert_eq!(map.label(20, y), map.label(39, 0));
        }
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let img = two_halves(8, 8);
        let err = segment(&img, &SlicOptions::default().with_region_size(0)).unwrap_err();
        assert!(matches!(
            err,
            SuperpixelError::InvalidConfiguration {
                parameter: "region_size",
                ..
            }
        ));
    }

    #[test]
    fn test_deterministic() {
        let img = RgbImage::from_fn(48, 36, ChannelOrder::Rgb, |x, y| {
            Color::new((x * 5) as u8, (y * 7) as u8, ((x * y) % 256) as u8)
        })
        .unwrap();
        let options = SlicOptions::default()
            .with_region_size(8)
            .with_merge_threshold(None);
        let a = segment(&img, &options).unwrap();
        let b = segment(&img, &options).unwrap();
        assert_eq!(a, b);
        assert!(a.is_four_connected());
    }

    #[test]
    fn test_cancel_still_yields_valid_map() {
        let img = RgbImage::from_fn(40, 40, ChannelOrder::Rgb, |x, y| {
            Color::new((x * 6) as u8, (y * 6) as u8, 90)
        })
        .unwrap();
        let cancel = AtomicBool::new(true);
        let options = SlicOptions::default()
            .with_region_size(10)
            .with_max_iterations(10)
            .with_merge_threshold(None);
        let result = segment_cancellable(&img, &options, &cancel).unwrap();
        assert_eq!(result.iterations, 1);
        assert!(result.cancelled || result.converged);
        assert!(result.label_map.is_four_connected());
    }

    #[test]
    fn test_manifold_variant_runs() {
        let img = two_halves(32, 32);
        let options = SlicOptions::default()
            .with_region_size(8)
            .with_variant(ClusteringVariant::ManifoldSeeded);
        let result = segment_detailed(&img, &options).unwrap();
        assert!(result.seed_count >= 16);
        assert_eq!(result.label_map.segment_count(), 2);
    }

    #[test]
    fn test_bgr_matches_rgb() {
        let img = RgbImage::from_fn(30, 30, ChannelOrder::Rgb, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Color::new(250, 200, 10)
            } else {
                Color::new(10, 60, 200)
            }
        })
        .unwrap();
        let options = SlicOptions::default().with_region_size(10);
        let rgb = segment(&img, &options).unwrap();
        let bgr = segment(&img.to_order(ChannelOrder::Bgr), &options).unwrap();
        assert_eq!(rgb, bgr);
    }

    #[test]
    fn test_half_scale_center_keeps_full_window() {
        let img = RgbImage::filled(8, 1, ChannelOrder::Rgb, Color::gray(90)).unwrap();
        let lab = image_to_lab(&img);
        let ctx = Context {
            lab: &lab,
            width: 8,
            height: 1,
            variant: ClusteringVariant::ManifoldSeeded,
            compactness: 10.0,
            bucket: 8.0,
            parallel: false,
        };
        let centers = [Center {
            x: 0.0,
            y: 0.0,
            color: lab[0],
            step: 4.0,
            color_spread: INITIAL_COLOR_SPREAD,
        }];
        let index = CenterIndex::build(&centers, &ctx);
        let prev = [1u32; 8];
        let mut out = [9u32; 8];
        let changed = assign_row(&ctx, &centers, &index, 0, &prev, &mut out);
        // x = 6 lies beyond the half-scale step but within S
        assert_eq!(out, [0u32; 8]);
        assert_eq!(changed, 8);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let img = RgbImage::from_fn(97, 61, ChannelOrder::Rgb, |x, y| {
            Color::new((x * 255 / 96) as u8, (y * 255 / 60) as u8, ((x + y) * 3 % 256) as u8)
        })
        .unwrap();
        for variant in ClusteringVariant::ALL {
            let options = SlicOptions::default()
                .with_region_size(12)
                .with_max_iterations(10)
                .with_variant(variant);
            let seq = segment_detailed(&img, &options.clone().with_parallel(false)).unwrap();
            let par = segment_detailed(&img, &options.with_parallel(true)).unwrap();
            assert_eq!(seq.label_map, par.label_map, "variant {variant}");
            assert_eq!(seq.iterations, par.iterations, "variant {variant}");
            assert!(par.label_map.is_four_connected());
        }
    }
}
