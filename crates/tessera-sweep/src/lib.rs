//! Tessera Sweep - Parameter sweeps and comparison grids
//!
//! This crate supports side-by-side comparison of clustering settings:
//!
//! - **Sweeps** ([`sweep`]): lazy cross products of SLIC option axes and
//!   selection of one-parameter slices
//! - **Grids** ([`grid`]): packing labelled result images onto one canvas

pub mod error;
pub mod grid;
pub mod sweep;

// Re-export core types
pub use tessera_core;

// Re-export error types
pub use error::{SweepError, SweepResult};

// Re-export grid layout
pub use grid::{
    CellPlacement, GridCanvas, GridCell, GridLayout, GridOptions, HEADER_LINE_HEIGHT,
    HEADER_PADDING, build_grid, header_height,
};

// Re-export sweeps
pub use sweep::{SlicSweep, SweepAxis, SweepIter, SweepPoint, render_point, select_varying};
