//! Comparison grids
//!
//! Packs labelled result images into one canvas, either as a single row
//! or as a row-major tiling with a fixed column count. Every cell gets a
//! slot as large as the largest cell; cells sit at the top-left of their
//! slot. An optional header band on top is reserved for title lines.
//!
//! No text is drawn. The title and cell labels are returned with the
//! canvas so that presentation code can render them.

use crate::error::{SweepError, SweepResult};
use tessera_core::{Color, RgbImage, RgbImageMut};

// =============================================================================
// Constants
// =============================================================================

/// Fixed part of the header band height
pub const HEADER_PADDING: u32 = 20;

/// Header band height per title line
pub const HEADER_LINE_HEIGHT: u32 = 30;

/// Header band height for `lines` title lines (0 without a title).
pub fn header_height(lines: usize) -> u32 {
    if lines == 0 {
        0
    } else {
        HEADER_PADDING + HEADER_LINE_HEIGHT * lines as u32
    }
}

// =============================================================================
// Types
// =============================================================================

/// Cell arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridLayout {
    /// All cells in one row
    #[default]
    Linear,
    /// Row-major with at most `columns` cells per row
    Tiled { columns: u32 },
}

/// A pre-rendered image and its caption.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub image: RgbImage,
    pub label: String,
}

impl GridCell {
    pub fn new(image: RgbImage, label: impl Into<String>) -> Self {
        Self {
            image,
            label: label.into(),
        }
    }
}

/// Options for [`build_grid`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridOptions {
    pub layout: GridLayout,
    /// Title lines; each adds [`HEADER_LINE_HEIGHT`] to the header band
    pub title: Vec<String>,
    /// Fill for the header band and unused slot area
    pub background: Color,
}

impl GridOptions {
    /// Single-row layout
    pub fn linear() -> Self {
        Self::default()
    }

    /// Row-major layout with `columns` cells per row
    pub fn tiled(columns: u32) -> Self {
        Self {
            layout: GridLayout::Tiled { columns },
            ..Self::default()
        }
    }

    /// Set the title lines
    pub fn with_title<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.title = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the background color
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Check the layout.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidConfiguration`] for a tiled layout
    /// with zero columns.
    pub fn validate(&self) -> SweepResult<()> {
        if self.layout == (GridLayout::Tiled { columns: 0 }) {
            return Err(SweepError::InvalidConfiguration {
                parameter: "columns",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Where one cell landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPlacement {
    /// Index into the input cell list
    pub index: usize,
    pub column: u32,
    pub row: u32,
    /// Left edge in cell-area coordinates (below the header)
    pub x: u32,
    /// Top edge in cell-area coordinates (below the header)
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub label: String,
}

/// A finished grid.
#[derive(Debug, Clone)]
pub struct GridCanvas {
    pub image: RgbImage,
    pub header_height: u32,
    pub title: Vec<String>,
    pub placements: Vec<CellPlacement>,
}

impl GridCanvas {
    /// Top-left corner of a placement in canvas coordinates.
    pub fn canvas_origin(&self, placement: &CellPlacement) -> (u32, u32) {
        (placement.x, placement.y + self.header_height)
    }
}

// =============================================================================
// Layout
// =============================================================================

fn overflow(what: &str) -> SweepError {
    SweepError::InvalidConfiguration {
        parameter: "layout",
        reason: format!("{what} exceeds u32"),
    }
}

/// Lay out `cells` on one canvas.
///
/// # Arguments
///
/// * `cells` - Cells in display order; callers sort them beforehand
/// * `options` - Layout, title and background
///
/// # Errors
///
/// * [`SweepError::EmptyInput`] when `cells` is empty
/// * [`SweepError::InvalidConfiguration`] for zero columns or a canvas
///   too large to address
/// * [`tessera_core::Error::ChannelOrderMismatch`] when cells mix channel orders
///
/// # Example
///
/// ```no_run
/// use tessera_sweep::{GridCell, GridOptions, build_grid};
///
/// # let cells: Vec<GridCell> = Vec::new();
/// let grid = build_grid(&cells, &GridOptions::tiled(3).with_title(["region size"])).unwrap();
/// tessera_io::write_image_auto(&grid.image, "grid.png").unwrap();
/// ```
pub fn build_grid(cells: &[GridCell], options: &GridOptions) -> SweepResult<GridCanvas> {
    options.validate()?;
    let first = cells.first().ok_or(SweepError::EmptyInput("no grid cells"))?;
    let order = first.image.order();
    for cell in cells {
        cell.image.ensure_order(order)?;
    }

    let n = cells.len() as u32;
    let columns = match options.layout {
        GridLayout::Linear => n,
        GridLayout::Tiled { columns } => columns.min(n),
    };
    let rows = n.div_ceil(columns);

    let slot_w = cells.iter().map(|c| c.image.width()).max().unwrap_or(1);
    let slot_h = cells.iter().map(|c| c.image.height()).max().unwrap_or(1);
    let header = header_height(options.title.len());

    let width = slot_w.checked_mul(columns).ok_or_else(|| overflow("canvas width"))?;
    let height = slot_h
        .checked_mul(rows)
        .and_then(|h| h.checked_add(header))
        .ok_or_else(|| overflow("canvas height"))?;

    let mut canvas = RgbImageMut::filled(width, height, order, options.background)?;
    let mut placements = Vec::with_capacity(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        let column = index as u32 % columns;
        let row = index as u32 / columns;
        let x = column * slot_w;
        let y = row * slot_h;
        canvas.paste(&cell.image, x, y + header)?;
        placements.push(CellPlacement {
            index,
            column,
            row,
            x,
            y,
            width: cell.image.width(),
            height: cell.image.height(),
            label: cell.label.clone(),
        });
    }

    tracing::debug!(
        cells = cells.len(),
        columns,
        rows,
        width,
        height,
        "built comparison grid"
    );

    Ok(GridCanvas {
        image: canvas.into(),
        header_height: header,
        title: options.title.clone(),
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ChannelOrder;

    fn cell(w: u32, h: u32, v: u8) -> GridCell {
        GridCell::new(
            RgbImage::filled(w, h, ChannelOrder::Rgb, Color::gray(v)).unwrap(),
            format!("cell {v}"),
        )
    }

    #[test]
    fn test_header_height() {
        assert_eq!(header_height(0), 0);
        assert_eq!(header_height(1), 50);
        assert_eq!(header_height(2), 80);
    }

    #[test]
    fn test_tiled_five_cells() {
        let cells: Vec<GridCell> = (1..=5).map(|v| cell(50, 50, v * 40)).collect();
        let grid = build_grid(&cells, &GridOptions::tiled(3).with_title(["ruler 10"])).unwrap();
        assert_eq!(grid.image.dimensions(), (150, 150));
        assert_eq!(grid.header_height, 50);

        let p = &grid.placements[4];
        assert_eq!((p.column, p.row, p.x, p.y), (1, 1, 50, 50));
        assert_eq!(grid.canvas_origin(p), (50, 100));
        assert_eq!(grid.image.pixel(60, 110), Color::gray(200));
        // Unused slot and header keep the background
        assert_eq!(grid.image.pixel(120, 120), Color::BLACK);
        assert_eq!(grid.image.pixel(0, 0), Color::BLACK);
    }

    #[test]
    fn test_linear_uses_max_cell_size() {
        let cells = vec![cell(30, 20, 10), cell(40, 10, 20)];
        let grid = build_grid(&cells, &GridOptions::linear()).unwrap();
        assert_eq!(grid.image.dimensions(), (80, 20));
        assert_eq!(grid.header_height, 0);
        assert_eq!(grid.placements[1].x, 40);
        assert_eq!(grid.placements[1].label, "cell 20");
    }

    #[test]
    fn test_columns_clamped_to_cell_count() {
        let cells = vec![cell(10, 10, 1), cell(10, 10, 2)];
        let grid = build_grid(&cells, &GridOptions::tiled(8)).unwrap();
        assert_eq!(grid.image.dimensions(), (20, 10));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            build_grid(&[], &GridOptions::linear()),
            Err(SweepError::EmptyInput(_))
        ));
        assert!(matches!(
            build_grid(&[cell(4, 4, 1)], &GridOptions::tiled(0)),
            Err(SweepError::InvalidConfiguration { parameter: "columns", .. })
        ));
        let bgr = GridCell::new(
            RgbImage::filled(4, 4, ChannelOrder::Bgr, Color::BLACK).unwrap(),
            "bgr",
        );
        assert!(matches!(
            build_grid(&[cell(4, 4, 1), bgr], &GridOptions::linear()),
            Err(SweepError::Core(tessera_core::Error::ChannelOrderMismatch { .. }))
        ));
    }
}
