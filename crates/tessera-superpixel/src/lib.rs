//! Tessera Superpixel - SLIC-family superpixel segmentation
//!
//! This crate partitions images into compact, color-coherent regions:
//!
//! - **Clustering** ([`slic`]): standard, zero-parameter and manifold-seeded
//!   SLIC with optional rayon-parallel assignment
//! - **Options** ([`options`]): validated parameters and size-class presets
//! - **Seeding** ([`seeds`]): seed grid geometry
//! - **Region summaries** ([`summarize`]): mean colors, recoloring and
//!   boundary overlays
//!
//! Every label map produced here is dense and 4-connected.

mod connectivity;
pub mod error;
pub mod options;
pub mod seeds;
pub mod slic;
pub mod summarize;

// Re-export core types
pub use tessera_core;

// Re-export error types
pub use error::{SuperpixelError, SuperpixelResult};

// Re-export options
pub use options::{
    ClusteringVariant, DEFAULT_COMPACTNESS, DEFAULT_MAX_ITERATIONS, DEFAULT_MERGE_THRESHOLD,
    DEFAULT_REGION_SIZE, SizeClass, SlicOptions,
};

// Re-export clustering
pub use seeds::{grid_dimensions, grid_seed_count};
pub use slic::{Segmentation, segment, segment_cancellable, segment_detailed};

// Re-export region summaries
pub use summarize::{
    SegmentStats, boundary_color, boundary_mask, overlay_boundaries, recolor, segment_stats,
};
