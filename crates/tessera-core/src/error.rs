//! Error types for tessera-core
//!
//! Provides a unified error type for the data model. Every crate in the
//! workspace wraps this type in its own error enum via `#[from]`.

use crate::image::ChannelOrder;
use thiserror::Error;

/// Tessera core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Image or label map with no pixels
    #[error("empty input: {width}x{height} has no pixels")]
    EmptyInput { width: u32, height: u32 },

    /// A configuration parameter is out of range
    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    /// Raw buffer does not match the declared dimensions
    #[error("data length mismatch: expected {expected} values, got {actual}")]
    DataLengthMismatch { expected: usize, actual: usize },

    /// Pixel coordinates outside the image
    #[error("pixel ({x}, {y}) out of bounds for {width}x{height}")]
    IndexOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Two inputs that must share dimensions do not
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Two inputs that must share a channel order do not
    #[error("channel order mismatch: expected {expected:?}, got {actual:?}")]
    ChannelOrderMismatch {
        expected: ChannelOrder,
        actual: ChannelOrder,
    },

    /// Label buffer violates the dense labelling invariant
    #[error("invalid labels: {0}")]
    InvalidLabels(String),
}

/// Result type alias for tessera-core operations
pub type Result<T> = std::result::Result<T, Error>;
