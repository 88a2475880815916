//! Error types for tessera-superpixel

use thiserror::Error;

/// Errors that can occur during superpixel segmentation
#[derive(Debug, Error)]
pub enum SuperpixelError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// A configuration parameter is out of range
    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },
}

/// Result type for superpixel operations
pub type SuperpixelResult<T> = Result<T, SuperpixelError>;
