//! Error types for tessera-color

use thiserror::Error;

/// Errors that can occur during color processing operations
#[derive(Debug, Error)]
pub enum ColorError {
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

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
