//! Superpixel clustering options
//!
//! [`SlicOptions`] carries every knob of the clusterer and validates them
//! before any pixel is touched. [`SizeClass`] picks iteration and
//! compactness presets from the image dimensions.

use crate::error::{SuperpixelError, SuperpixelResult};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Constants
// =============================================================================

/// Default seed spacing in pixels
pub const DEFAULT_REGION_SIZE: u32 = 10;

/// Default spatial weight
pub const DEFAULT_COMPACTNESS: f32 = 10.0;

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default merge threshold: merge adjacent segments with identical means
pub const DEFAULT_MERGE_THRESHOLD: f32 = 0.0;

/// Images with both sides below this are [`SizeClass::Small`]
pub const SMALL_IMAGE_LIMIT: u32 = 750;

/// Images with either side above this are [`SizeClass::Large`]
pub const LARGE_IMAGE_LIMIT: u32 = 2000;

// =============================================================================
// Clustering variant
// =============================================================================

/// Distance metric and seeding policy of the clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClusteringVariant {
    /// Fixed compactness: `D = d_lab^2 + (d_xy / S)^2 * m^2`
    Standard,
    /// Adaptive per-cluster color normalisation; compactness is unused
    #[default]
    ZeroParameter,
    /// Extra seeds in cells where the color manifold is dense
    ManifoldSeeded,
}

impl ClusteringVariant {
    /// All variants, in declaration order.
    pub const ALL: [ClusteringVariant; 3] = [
        ClusteringVariant::Standard,
        ClusteringVariant::ZeroParameter,
        ClusteringVariant::ManifoldSeeded,
    ];

    /// Short lowercase name ("slic", "slico", "mslic").
    pub fn name(self) -> &'static str {
        match self {
            ClusteringVariant::Standard => "slic",
            ClusteringVariant::ZeroParameter => "slico",
            ClusteringVariant::ManifoldSeeded => "mslic",
        }
    }
}

impl fmt::Display for ClusteringVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClusteringVariant {
    type Err = SuperpixelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slic" | "standard" => Ok(ClusteringVariant::Standard),
            "slico" | "zero" | "zero-parameter" => Ok(ClusteringVariant::ZeroParameter),
            "mslic" | "manifold" | "manifold-seeded" => Ok(ClusteringVariant::ManifoldSeeded),
            other => Err(SuperpixelError::InvalidConfiguration {
                parameter: "variant",
                reason: format!("unknown variant {other:?}"),
            }),
        }
    }
}

// =============================================================================
// Size classes
// =============================================================================

/// Coarse image size bucket used to choose presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Both sides below 750 px
    Small,
    /// Neither small nor large
    Medium,
    /// Either side above 2000 px
    Large,
}

impl SizeClass {
    /// Classify an image by its dimensions.
    pub fn of(width: u32, height: u32) -> Self {
        if width < SMALL_IMAGE_LIMIT && height < SMALL_IMAGE_LIMIT {
            SizeClass::Small
        } else if width > LARGE_IMAGE_LIMIT || height > LARGE_IMAGE_LIMIT {
            SizeClass::Large
        } else {
            SizeClass::Medium
        }
    }

    /// Preset iteration count.
    pub fn max_iterations(self) -> u32 {
        match self {
            SizeClass::Small => 15,
            SizeClass::Medium => 17,
            SizeClass::Large => 20,
        }
    }

    /// Preset compactness.
    pub fn compactness(self) -> f32 {
        match self {
            SizeClass::Small => 25.0,
            SizeClass::Medium => 30.0,
            SizeClass::Large => 35.0,
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options for superpixel clustering
///
/// # Guidelines
///
/// | goal                     | region_size | compactness |
/// |--------------------------|-------------|-------------|
/// | fine texture detail      | 10-20       | 5-10        |
/// | balanced                 | 30-60       | 10-20       |
/// | large, regular cells     | 100-150     | 20-40       |
#[derive(Debug, Clone, PartialEq)]
pub struct SlicOptions {
    /// Seed grid spacing S in pixels. Each center searches a
    /// `2S x 2S` window. Must be > 0.
    pub region_size: u32,

    /// Weight m of spatial against color distance. Larger values give
    /// more compact, regular cells. Must be finite and > 0.
    pub compactness: f32,

    /// Cap on refinement passes. Must be > 0.
    pub max_iterations: u32,

    /// Distance metric and seeding policy
    pub variant: ClusteringVariant,

    /// Move each seed to the lowest-gradient pixel of its 3x3 neighbourhood
    pub perturb_seeds: bool,

    /// After connectivity enforcement, merge adjacent segments whose
    /// rounded mean colors lie within this Euclidean RGB distance.
    /// `None` disables merging.
    pub merge_threshold: Option<f32>,

    /// Run the assignment step on the rayon thread pool. Has no effect
    /// unless the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for SlicOptions {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            compactness: DEFAULT_COMPACTNESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            variant: ClusteringVariant::default(),
            perturb_seeds: true,
            merge_threshold: Some(DEFAULT_MERGE_THRESHOLD),
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl SlicOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets for an image of the given size.
    ///
    /// Uses the zero-parameter variant with the iteration count and
    /// compactness of the image's [`SizeClass`].
    pub fn for_image(width: u32, height: u32) -> Self {
        let class = SizeClass::of(width, height);
        Self {
            compactness: class.compactness(),
            max_iterations: class.max_iterations(),
            variant: ClusteringVariant::ZeroParameter,
            ..Self::default()
        }
    }

    /// Set the seed spacing
    pub fn with_region_size(mut self, region_size: u32) -> Self {
        self.region_size = region_size;
        self
    }

    /// Set the compactness
    pub fn with_compactness(mut self, compactness: f32) -> Self {
        self.compactness = compactness;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the clustering variant
    pub fn with_variant(mut self, variant: ClusteringVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Enable or disable seed perturbation
    pub fn with_perturb_seeds(mut self, perturb_seeds: bool) -> Self {
        self.perturb_seeds = perturb_seeds;
        self
    }

    /// Set or disable the merge threshold
    pub fn with_merge_threshold(mut self, merge_threshold: Option<f32>) -> Self {
        self.merge_threshold = merge_threshold;
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
    /// Returns [`SuperpixelError::InvalidConfiguration`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> SuperpixelResult<()> {
        if self.region_size == 0 {
            return Err(SuperpixelError::InvalidConfiguration {
                parameter: "region_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.compactness.is_finite() || self.compactness <= 0.0 {
            return Err(SuperpixelError::InvalidConfiguration {
                parameter: "compactness",
                reason: format!("must be finite and greater than 0, got {}", self.compactness),
            });
        }
        if self.max_iterations == 0 {
            return Err(SuperpixelError::InvalidConfiguration {
                parameter: "max_iterations",
                reason: "must be greater than 0".to_string(),
            });
        }
        if let Some(t) = self.merge_threshold
            && (!t.is_finite() || t < 0.0)
        {
            return Err(SuperpixelError::InvalidConfiguration {
                parameter: "merge_threshold",
                reason: format!("must be finite and non-negative, got {t}"),
            });
        }
        Ok(())
    }
}
