//! Parameter sweeps
//!
//! A [`SlicSweep`] describes the cross product of a few option axes over a
//! base [`SlicOptions`]. Points are produced lazily by mixed-radix
//! indexing, so a sweep can be iterated any number of times and any point
//! can be fetched directly by index.
//!
//! Axis order, slowest to fastest: region size, compactness, iterations,
//! variant.

use crate::error::{SweepError, SweepResult};
use crate::grid::GridCell;
use std::cmp::Ordering;
use std::fmt;
use tessera_core::RgbImage;
use tessera_superpixel::{ClusteringVariant, SlicOptions, recolor, segment};

/// One option axis of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepAxis {
    RegionSize,
    Compactness,
    Iterations,
    Variant,
}

impl SweepAxis {
    /// All axes, slowest varying first.
    pub const ALL: [SweepAxis; 4] = [
        SweepAxis::RegionSize,
        SweepAxis::Compactness,
        SweepAxis::Iterations,
        SweepAxis::Variant,
    ];

    /// Short name used in labels and file names.
    pub fn name(self) -> &'static str {
        match self {
            SweepAxis::RegionSize => "region",
            SweepAxis::Compactness => "ruler",
            SweepAxis::Iterations => "iter",
            SweepAxis::Variant => "variant",
        }
    }

    /// Format the value of this axis in `options`.
    pub fn value_label(self, options: &SlicOptions) -> String {
        match self {
            SweepAxis::RegionSize => options.region_size.to_string(),
            SweepAxis::Compactness => options.compactness.to_string(),
            SweepAxis::Iterations => options.max_iterations.to_string(),
            SweepAxis::Variant => options.variant.to_string(),
        }
    }

    fn same(self, a: &SlicOptions, b: &SlicOptions) -> bool {
        self.cmp_values(a, b) == Ordering::Equal
    }

    fn cmp_values(self, a: &SlicOptions, b: &SlicOptions) -> Ordering {
        match self {
            SweepAxis::RegionSize => a.region_size.cmp(&b.region_size),
            SweepAxis::Compactness => a.compactness.total_cmp(&b.compactness),
            SweepAxis::Iterations => a.max_iterations.cmp(&b.max_iterations),
            SweepAxis::Variant => variant_rank(a.variant).cmp(&variant_rank(b.variant)),
        }
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn variant_rank(v: ClusteringVariant) -> usize {
    ClusteringVariant::ALL
        .iter()
        .position(|&x| x == v)
        .unwrap_or(ClusteringVariant::ALL.len())
}

/// A single parameter combination of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Position in iteration order
    pub index: usize,
    pub options: SlicOptions,
}

impl SweepPoint {
    /// Human readable summary, e.g. `slico region=30 ruler=10 iter=10`.
    pub fn label(&self) -> String {
        let o = &self.options;
        format!(
            "{} {}={} {}={} {}={}",
            o.variant,
            SweepAxis::RegionSize.name(),
            o.region_size,
            SweepAxis::Compactness.name(),
            o.compactness,
            SweepAxis::Iterations.name(),
            o.max_iterations
        )
    }
}

/// Cross product of SLIC option axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicSweep {
    pub region_sizes: Vec<u32>,
    pub compactness: Vec<f32>,
    pub iterations: Vec<u32>,
    pub variants: Vec<ClusteringVariant>,
    /// Source of every option that is not swept
    pub base: SlicOptions,
}

impl SlicSweep {
    /// A sweep with a single point: `base` itself.
    pub fn new(base: SlicOptions) -> Self {
        Self {
            region_sizes: vec![base.region_size],
            compactness: vec![base.compactness],
            iterations: vec![base.max_iterations],
            variants: vec![base.variant],
            base,
        }
    }

    /// The experiment grid: 5 region sizes, 4 compactness values,
    /// 3 iteration caps and every variant (180 points).
    pub fn experiment() -> Self {
        Self::new(SlicOptions::default())
            .with_region_sizes([10, 30, 60, 100, 150])
            .with_compactness([5.0, 10.0, 20.0, 40.0])
            .with_iterations([5, 10, 20])
            .with_variants(ClusteringVariant::ALL)
    }

    /// Set the region size axis
    pub fn with_region_sizes(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.region_sizes = values.into_iter().collect();
        self
    }

    /// Set the compactness axis
    pub fn with_compactness(mut self, values: impl IntoIterator<Item = f32>) -> Self {
        self.compactness = values.into_iter().collect();
        self
    }

    /// Set the iteration cap axis
    pub fn with_iterations(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.iterations = values.into_iter().collect();
        self
    }

    /// Set the variant axis
    pub fn with_variants(mut self, values: impl IntoIterator<Item = ClusteringVariant>) -> Self {
        self.variants = values.into_iter().collect();
        self
    }

    fn radices(&self) -> [usize; 4] {
        [
            self.region_sizes.len(),
            self.compactness.len(),
            self.iterations.len(),
            self.variants.len(),
        ]
    }

    /// Number of points.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidConfiguration`] if the product of the
    /// axis lengths overflows.
    pub fn len(&self) -> SweepResult<usize> {
        self.radices()
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| SweepError::InvalidConfiguration {
                parameter: "sweep",
                reason: "number of combinations overflows usize".to_string(),
            })
    }

    /// True when some axis has no values.
    pub fn is_empty(&self) -> bool {
        self.radices().contains(&0)
    }

    /// Check every axis value against [`SlicOptions::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::EmptyInput`] for an empty axis, the
    /// superpixel validation error for a bad value, or an overflow error
    /// from [`SlicSweep::len`].
    pub fn validate(&self) -> SweepResult<()> {
        if self.is_empty() {
            return Err(SweepError::EmptyInput("sweep axis without values"));
        }
        self.len()?;
        self.base.validate()?;
        for &region_size in &self.region_sizes {
            self.base.clone().with_region_size(region_size).validate()?;
        }
        for &compactness in &self.compactness {
            self.base.clone().with_compactness(compactness).validate()?;
        }
        for &iterations in &self.iterations {
            self.base.clone().with_max_iterations(iterations).validate()?;
        }
        Ok(())
    }

    /// Point at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<SweepPoint> {
        if index >= self.len().ok()? {
            return None;
        }
        let [_, nc, ni, nv] = self.radices();
        let mut rest = index;
        let v = rest % nv;
        rest /= nv;
        let i = rest % ni;
        rest /= ni;
        let c = rest % nc;
        rest /= nc;
        let r = rest;

        let options = self
            .base
            .clone()
            .with_region_size(self.region_sizes[r])
            .with_compactness(self.compactness[c])
            .with_max_iterations(self.iterations[i])
            .with_variant(self.variants[v]);
        Some(SweepPoint { index, options })
    }

    /// Lazily iterate over every point.
    ///
    /// # Errors
    ///
    /// Fails like [`SlicSweep::len`].
    pub fn iter(&self) -> SweepResult<SweepIter<'_>> {
        let len = self.len()?;
        Ok(SweepIter {
            sweep: self,
            next: 0,
            len,
        })
    }
}

/// Iterator over the points of a [`SlicSweep`].
#[derive(Debug, Clone)]
pub struct SweepIter<'a> {
    sweep: &'a SlicSweep,
    next: usize,
    len: usize,
}

impl Iterator for SweepIter<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<SweepPoint> {
        if self.next >= self.len {
            return None;
        }
        let point = self.sweep.get(self.next);
        self.next += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.next;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for SweepIter<'_> {}

/// Keep the points that agree with `reference` on every axis except
/// `axis`, sorted along `axis`.
///
/// This is the usual way to pick the cells of a one-parameter comparison
/// grid out of a full sweep.
pub fn select_varying(
    points: &[SweepPoint],
    reference: &SlicOptions,
    axis: SweepAxis,
) -> Vec<SweepPoint> {
    let mut selected: Vec<SweepPoint> = points
        .iter()
        .filter(|p| {
            SweepAxis::ALL
                .iter()
                .filter(|&&other| other != axis)
                .all(|other| other.same(&p.options, reference))
        })
        .cloned()
        .collect();
    selected.sort_by(|a, b| axis.cmp_values(&a.options, &b.options));
    selected
}

/// Segment `image` with the point's options and return the
/// mean-recolored result as a labelled grid cell.
pub fn render_point(image: &RgbImage, point: &SweepPoint) -> SweepResult<GridCell> {
    let labels = segment(image, &point.options)?;
    let recolored = recolor(image, &labels)?;
    tracing::debug!(
        index = point.index,
        segments = labels.segment_count(),
        "rendered sweep point"
    );
    Ok(GridCell::new(recolored, point.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SlicSweep {
        SlicSweep::new(SlicOptions::default())
            .with_region_sizes([10, 20])
            .with_compactness([5.0, 10.0, 20.0])
            .with_iterations([10])
            .with_variants([ClusteringVariant::Standard, ClusteringVariant::ZeroParameter])
    }

    #[test]
    fn test_len_and_experiment() {
        assert_eq!(small().len().unwrap(), 12);
        assert_eq!(SlicSweep::experiment().len().unwrap(), 180);
        assert_eq!(SlicSweep::new(SlicOptions::default()).len().unwrap(), 1);
    }

    #[test]
    fn test_overflow_rejected() {
        let mut sweep = small();
        sweep.region_sizes = vec![1; 1 << 20];
        sweep.compactness = vec![1.0; 1 << 20];
        sweep.iterations = vec![1; 1 << 20];
        sweep.variants = vec![ClusteringVariant::Standard; 1 << 20];
        assert!(matches!(
            sweep.len(),
            Err(SweepError::InvalidConfiguration { .. })
        ));
        assert!(sweep.iter().is_err());
    }

    #[test]
    fn test_mixed_radix_order() {
        let sweep = small();
        let points: Vec<SweepPoint> = sweep.iter().unwrap().collect();
        assert_eq!(points.len(), 12);
        // Variant varies fastest, region size slowest
        assert_eq!(points[0].options.variant, ClusteringVariant::Standard);
        assert_eq!(points[1].options.variant, ClusteringVariant::ZeroParameter);
        assert_eq!(points[2].options.compactness, 10.0);
        assert_eq!(points[6].options.region_size, 20);
        assert_eq!(points[11].options.compactness, 20.0);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(sweep.get(i).as_ref(), Some(p));
        }
        assert!(sweep.get(12).is_none());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let sweep = small();
        let first: Vec<_> = sweep.iter().unwrap().collect();
        let second: Vec<_> = sweep.iter().unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(sweep.iter().unwrap().len(), 12);
    }

    #[test]
    fn test_validate() {
        assert!(small().validate().is_ok());
        assert!(matches!(
            small().with_region_sizes([10, 0]).validate(),
            Err(SweepError::Superpixel(_))
        ));
        assert!(matches!(
            small().with_iterations([]).validate(),
            Err(SweepError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_select_varying() {
        let sweep = SlicSweep::experiment();
        let points: Vec<_> = sweep.iter().unwrap().collect();
        let reference = SlicOptions::default()
            .with_compactness(10.0)
            .with_max_iterations(10)
            .with_variant(ClusteringVariant::ZeroParameter);

        let by_region = select_varying(&points, &reference, SweepAxis::RegionSize);
        let sizes: Vec<u32> = by_region.iter().map(|p| p.options.region_size).collect();
        assert_eq!(sizes, vec![10, 30, 60, 100, 150]);

        let reference = reference.with_region_size(30);
        let by_ruler = select_varying(&points, &reference, SweepAxis::Compactness);
        assert_eq!(by_ruler.len(), 4);
        assert!(by_ruler.iter().all(|p| p.options.region_size == 30));

        let by_variant = select_varying(&points, &reference, SweepAxis::Variant);
        let names: Vec<&str> = by_variant.iter().map(|p| p.options.variant.name()).collect();
        assert_eq!(names, vec!["slic", "slico", "mslic"]);
    }

    #[test]
    fn test_point_label() {
        let point = small().get(1).unwrap();
        assert_eq!(point.label(), "slico region=10 ruler=5 iter=10");
    }
}
