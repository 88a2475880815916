//! Seed placement
//!
//! Seeds sit on a regular grid of spacing `S`. Every seed owns one grid
//! cell, which also provides the initial labelling. The last row and
//! column of cells absorb whatever is left of the image, so cells tile
//! the image exactly.

use tessera_color::Lab;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRect {
    fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Split into four quadrants; the right and bottom halves take the odd pixel.
    fn quadrants(&self) -> [CellRect; 4] {
        let mx = self.x0 + self.width() / 2;
        let my = self.y0 + self.height() / 2;
        [
            CellRect { x0: self.x0, y0: self.y0, x1: mx, y1: my },
            CellRect { x0: mx, y0: self.y0, x1: self.x1, y1: my },
            CellRect { x0: self.x0, y0: my, x1: mx, y1: self.y1 },
            CellRect { x0: mx, y0: my, x1: self.x1, y1: self.y1 },
        ]
    }
}

/// Initial cluster center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Seed {
    pub x: u32,
    pub y: u32,
    /// Spatial scale of this seed's cluster
    pub step: f32,
    /// Pixels initially labelled with this seed
    pub cell: CellRect,
}

/// Number of seed columns and rows: `(ceil(W/S), ceil(H/S))`.
///
/// Images smaller than `S` in a dimension get one seed along it.
pub fn grid_dimensions(width: u32, height: u32, region_size: u32) -> (u32, u32) {
    let s = region_size.max(1);
    (width.div_ceil(s).max(1), height.div_ceil(s).max(1))
}

/// Number of seeds on the regular grid.
pub fn grid_seed_count(width: u32, height: u32, region_size: u32) -> usize {
    let (nx, ny) = grid_dimensions(width, height, region_size);
    nx as usize * ny as usize
}

fn grid_cells(width: u32, height: u32, step: u32) -> Vec<CellRect> {
    let (nx, ny) = grid_dimensions(width, height, step);
    let mut cells = Vec::with_capacity(nx as usize * ny as usize);
    for gy in 0..ny {
        for gx in 0..nx {
            cells.push(CellRect {
                x0: gx * step,
                y0: gy * step,
                x1: ((gx + 1) * step).min(width),
                y1: ((gy + 1) * step).min(height),
            });
        }
    }
    cells
}

/// Regular grid of seeds at `min(i*S + S/2, W-1)`.
pub(crate) fn grid_seeds(width: u32, height: u32, step: u32) -> Vec<Seed> {
    let half = step / 2;
    grid_cells(width, height, step)
        .into_iter()
        .map(|cell| Seed {
            x: (cell.x0 + half).min(width - 1),
            y: (cell.y0 + half).min(height - 1),
            step: step as f32,
            cell,
        })
        .collect()
}

/// Squared L*a*b* gradient magnitude at every pixel.
///
/// Central differences, with the border pixel standing in for its
/// missing neighbour.
pub(crate) fn gradient_map(lab: &[Lab], width: usize, height: usize) -> Vec<f32> {
    let mut grad = vec![0.0f32; lab.len()];
    for y in 0..height {
        let up = y.saturating_sub(1);
        let down = (y + 1).min(height - 1);
        for x in 0..width {
            let left = x.saturating_sub(1);
            let right = (x + 1).min(width - 1);
            grad[y * width + x] = lab[y * width + right].distance_squared(lab[y * width + left])
                + lab[down * width + x].distance_squared(lab[up * width + x]);
        }
    }
    grad
}

/// Move each seed to the lowest-gradient pixel of its 3x3 neighbourhood.
///
/// A seed only moves for a strictly lower gradient; ties keep the
/// earliest position in row-major order.
pub(crate) fn perturb(seeds: &mut [Seed], gradient: &[f32], width: u32, height: u32) {
    let w = width as usize;
    for seed in seeds.iter_mut() {
        let (sx, sy) = (seed.x, seed.y);
        let mut best = (sx, sy);
        let mut best_g = gradient[sy as usize * w + sx as usize];
        for ny in sy.saturating_sub(1)..=(sy + 1).min(height - 1) {
            for nx in sx.saturating_sub(1)..=(sx + 1).min(width - 1) {
                let g = gradient[ny as usize * w + nx as usize];
                if g < best_g {
                    best_g = g;
                    best = (nx, ny);
                }
            }
        }
        seed.x = best.0;
        seed.y = best.1;
    }
}

/// Grid seeds with extra density where the color manifold is crowded.
///
/// The manifold area of a cell is the sum over its pixels of
/// `sqrt(1 + |grad|^2 / m^2)`. Cells whose area exceeds twice the mean
/// are split into four quadrant seeds with spatial scale `S/2`.
pub(crate) fn manifold_seeds(
    gradient: &[f32],
    width: u32,
    height: u32,
    step: u32,
    compactness: f32,
) -> Vec<Seed> {
    let w = width as usize;
    let m2 = compactness * compactness;
    let cells = grid_cells(width, height, step);

    let areas: Vec<f32> = cells
        .iter()
        .map(|cell| {
            let mut area = 0.0f32;
            for y in cell.y0..cell.y1 {
                for x in cell.x0..cell.x1 {
                    area += (1.0 + gradient[y as usize * w + x as usize] / m2).sqrt();
                }
            }
            area
        })
        .collect();
    let mean = areas.iter().sum::<f32>() / areas.len() as f32;

    let center_of = |cell: &CellRect| (cell.x0 + cell.width() / 2, cell.y0 + cell.height() / 2);

    let mut seeds = Vec::with_capacity(cells.len());
    let mut split = 0usize;
    for (cell, &area) in cells.iter().zip(&areas) {
        if area > 2.0 * mean && cell.width() >= 2 && cell.height() >= 2 {
            split += 1;
            let sub_step = (step as f32 / 2.0).max(1.0);
            for quad in cell.quadrants() {
                let (x, y) = center_of(&quad);
                seeds.push(Seed {
                    x,
                    y,
                    step: sub_step,
                    cell: quad,
                });
            }
        } else {
            let (x, y) = center_of(cell);
            seeds.push(Seed {
                x,
                y,
                step: step as f32,
                cell: *cell,
            });
        }
    }
    tracing::trace!(cells = cells.len(), split, "manifold seeding");
    seeds
}
