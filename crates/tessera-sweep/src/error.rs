//! Error types for tessera-sweep

use thiserror::Error;

/// Errors that can occur while running sweeps or building grids
#[derive(Debug, Error)]
pub enum SweepError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// Superpixel clustering error
    #[error("superpixel error: {0}")]
    Superpixel(#[from] tessera_superpixel::SuperpixelError),

    /// A configuration parameter is out of range
    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    /// Nothing to lay out or sweep over
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
}

/// Result type for sweep operations
pub type SweepResult<T> = Result<T, SweepError>;
