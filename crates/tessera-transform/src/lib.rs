//! Tessera Transform - Geometric transformations
//!
//! This crate prepares images for analysis:
//!
//! - **Scaling** ([`scale`]): nearest-neighbour and bilinear resampling to
//!   an exact size
//! - **Resize with padding** ([`scale::resize_with_pad`]): aspect-preserving
//!   fit into a fixed canvas

pub mod error;
pub mod scale;

// Re-export core types
pub use tessera_core;

// Re-export error types
pub use error::{TransformError, TransformResult};

// Re-export scaling
pub use scale::{
    DEFAULT_PAD_COLOR, DEFAULT_TARGET_SIZE, PadGeometry, ResizeOptions, ScaleMethod,
    pad_geometry, resize_with_options, resize_with_pad, scale_to_size, scale_to_size_with,
};
