//! Tessera - Superpixel segmentation and palette analysis
//!
//! # Overview
//!
//! Tessera partitions images into compact, color-coherent superpixels and
//! summarises their color content:
//!
//! - SLIC, zero-parameter SLIC and manifold-seeded SLIC clustering
//! - Mean-color recoloring and segment boundary overlays
//! - k-means palette extraction and per-color pixel coverage
//! - Parameter sweeps laid out as comparison grids
//! - PNG, JPEG and PNM I/O and resize-with-padding preprocessing
//!
//! # Example
//!
//! ```
//! use tessera::{ChannelOrder, Color, RgbImage};
//! use tessera::superpixel::{SlicOptions, segment};
//!
//! let img = RgbImage::filled(100, 100, ChannelOrder::Rgb, Color::gray(128)).unwrap();
//! let labels = segment(&img, &SlicOptions::default().with_region_size(25)).unwrap();
//! assert_eq!(labels.segment_count(), 1);
//! ```

pub mod report;

// Re-export core types (primary data structures used everywhere)
pub use tessera_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use tessera_color as color;
pub use tessera_io as io;
pub use tessera_superpixel as superpixel;
pub use tessera_sweep as sweep;
pub use tessera_transform as transform;

pub use report::{ColorReport, PaletteReport};
