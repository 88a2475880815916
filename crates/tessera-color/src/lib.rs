//! Tessera Color - Color analysis for superpixel segmentation
//!
//! This crate provides color conversion and palette analysis:
//!
//! - **Color space conversion** ([`colorspace`]): sRGB -> XYZ -> CIE L*a*b*
//! - **Palette extraction** ([`palette`]): k-means quantization to a fixed palette
//! - **Color distribution** ([`distribution`]): per-color pixel coverage within a tolerance band

pub mod colorspace;
pub mod distribution;
pub mod error;
pub mod palette;

// Re-export core types
pub use tessera_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

// Re-export color space types and functions
pub use colorspace::{Lab, Xyz, color_to_lab, image_to_lab, rgb_to_lab, rgb_to_xyz, xyz_to_lab};

// Re-export palette extraction
pub use palette::{
    // Types
    Palette,
    PaletteEntry,
    PaletteExtraction,
    PaletteOptions,
    // Functions
    extract_palette,
    extract_palette_simple,
};

// Re-export distribution counting
pub use distribution::{ColorCountMap, color_distribution, color_mask, distribution};
