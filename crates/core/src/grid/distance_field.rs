//! Geodesic distance transform over an elevation surface
//!
//! Multi-source Dijkstra wavefront on the 2.5D surface described by an
//! [`ElevationGrid`]. The cost of a step between neighbouring samples is the
//! slope-adjusted length `sqrt(planar² + (z_scale·Δz)²)`, so iso-distance
//! lines bend around hills the way a walker on the ground would.
//!
//! Source samples are seeded with their planar distance to the source line
//! rather than zero. Wider neighbourhoods add longer steps, which brings the
//! flat-terrain metric within about 1.3% of Euclidean at radius 3. A long
//! step is only taken when every sample it crosses has data.
//!
//! # Determinism
//!
//! Queue entries with equal distance pop in ascending cell index order and
//! neighbours are relaxed in a fixed order, so identical inputs always give
//! identical fields.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Contains, Polygon};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::marching_squares::{extract_isolines, Contour};
use super::ElevationGrid;
use crate::core_types::{f64_total_cmp, Point};
use crate::geometry::polyline::VERTEX_EPSILON;
use crate::error::{IgnitionError, Result};

/// Distance and elevation stored for one grid sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldCell {
    /// Accumulated surface distance to the nearest source cell, `INFINITY`
    /// when unreachable
    pub distance: f64,
    /// Elevation of the sample, `NaN` for no-data
    pub elevation: f64,
}

/// Priority queue entry ordered as a min-heap on `(distance, index)`
#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance: f64,
    index: usize,
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest distance, then smallest index
        f64_total_cmp(other.distance, self.distance).then_with(|| other.index.cmp(&self.index))
    }
}

/// Settled geodesic distance field
#[derive(Debug, Clone)]
pub struct DistanceField {
    origin: Point,
    cell_size: f64,
    nx: usize,
    ny: usize,
    cells: Vec<FieldCell>,
    sources: usize,
}

impl DistanceField {
    /// Solve the field from a source polyline on the 8-neighbourhood.
    pub fn compute(grid: &ElevationGrid, source: &[Point]) -> Result<Self> {
        Self::compute_with_neighborhood(grid, source, 1)
    }

    /// Solve the field with a square neighbourhood of `radius` cells
    /// (1 gives the 8-neighbourhood, larger radii smooth the metric).
    pub fn compute_with_neighborhood(
        grid: &ElevationGrid,
        source: &[Point],
        radius: usize,
    ) -> Result<Self> {
        let radius = radius.max(1);
        let (nx, ny) = grid.dimensions();
        let elevations = grid.raw();
        let z_scale = grid.z_scale();

        let sources = source_cells(grid, source)?;

        let steps = neighbor_steps(radius, grid.cell_size());
        let mut distance = vec![f64::INFINITY; nx * ny];
        let mut heap = BinaryHeap::with_capacity(sources.len() * 4);
        for &index in &sources {
            let seed = distance_to_polyline(&grid.sample_position(index % nx, index / nx), source);
            distance[index] = seed;
            heap.push(QueueEntry {
                distance: seed,
                index,
            });
        }

        let mut settled = 0usize;
        while let Some(QueueEntry { distance: d, index }) = heap.pop() {
            if d > distance[index] {
                continue;
            }
            settled += 1;
            let ix = (index % nx) as isize;
            let iy = (index / nx) as isize;
            let z = elevations[index];

            for step in &steps {
                let jx = ix + step.dx;
                let jy = iy + step.dy;
                if jx < 0 || jy < 0 || jx >= nx as isize || jy >= ny as isize {
                    continue;
                }
                let neighbor = jy as usize * nx + jx as usize;
                let zn = elevations[neighbor];
                if zn.is_nan() {
                    continue;
                }
                // Intermediate samples stay inside the grid because both ends do
                let blocked = step.crossed.iter().any(|&(cx, cy)| {
                    elevations[(iy + cy) as usize * nx + (ix + cx) as usize].is_nan()
                });
                if blocked {
                    continue;
                }
                let dz = z_scale * (zn - z);
                let candidate = d + (step.planar_sq + dz * dz).sqrt();
                if candidate < distance[neighbor] {
                    distance[neighbor] = candidate;
                    heap.push(QueueEntry {
                        distance: candidate,
                        index: neighbor,
                    });
                }
            }
        }

        debug!(
            sources = sources.len(),
            settled,
            cells = nx * ny,
            radius,
            "Solved geodesic distance field"
        );

        let cells = distance
            .into_iter()
            .zip(elevations)
            .map(|(distance, &elevation)| FieldCell { distance, elevation })
            .collect();

        Ok(Self {
            origin: grid.origin(),
            cell_size: grid.cell_size(),
            nx,
            ny,
            cells,
            sources: sources.len(),
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Number of source cells the wavefront started from
    #[inline]
    pub fn source_count(&self) -> usize {
        self.sources
    }

    #[inline]
    pub fn cell(&self, ix: usize, iy: usize) -> Option<&FieldCell> {
        if ix >= self.nx || iy >= self.ny {
            return None;
        }
        self.cells.get(iy * self.nx + ix)
    }

    /// Distance at a sample, `None` outside the grid
    #[inline]
    pub fn distance(&self, ix: usize, iy: usize) -> Option<f64> {
        self.cell(ix, iy).map(|c| c.distance)
    }

    /// World position of a sample
    #[inline]
    pub fn sample_position(&self, ix: usize, iy: usize) -> Point {
        Point::new(
            self.origin.x + ix as f64 * self.cell_size,
            self.origin.y + iy as f64 * self.cell_size,
        )
    }

    /// Cells whose samples lie inside `polygon`
    fn cells_within<'a>(
        &'a self,
        polygon: &'a Polygon<f64>,
    ) -> impl Iterator<Item = &'a FieldCell> + 'a {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let p = self.sample_position(i % self.nx, i / self.nx);
            polygon.contains(&geo::Point::new(p.x, p.y)).then_some(cell)
        })
    }

    /// Number of samples inside `polygon` that the wavefront never reached
    pub fn unreachable_within(&self, polygon: &Polygon<f64>) -> usize {
        self.cells_within(polygon)
            .filter(|c| c.distance.is_infinite())
            .count()
    }

    /// Largest finite distance among samples inside `polygon`
    pub fn max_distance_within(&self, polygon: &Polygon<f64>) -> Option<f64> {
        self.cells_within(polygon)
            .map(|c| c.distance)
            .filter(|d| d.is_finite())
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Iso-distance polylines for each level, in world coordinates.
    ///
    /// Levels are extracted independently in parallel; the output keeps the
    /// order of `levels`.
    pub fn contours(&self, levels: &[f64]) -> Vec<Contour> {
        let values: Vec<f64> = self.cells.iter().map(|c| c.distance).collect();
        levels
            .par_iter()
            .map(|&level| {
                let lines = extract_isolines(&values, self.nx, self.ny, level)
                    .into_iter()
                    .map(|line| {
                        line.into_iter()
                            .map(|(gx, gy)| {
                                Point::new(
                                    self.origin.x + gx * self.cell_size,
                                    self.origin.y + gy * self.cell_size,
                                )
                            })
                            .collect()
                    })
                    .collect();
                Contour { level, lines }
            })
            .collect()
    }
}

/// Indices of non-no-data samples around the source polyline.
///
/// The polyline is walked at half-cell steps and each step marks the corners
/// of the grid cell it falls in, so samples on both sides of the line are
/// seeded.
fn source_cells(grid: &ElevationGrid, source: &[Point]) -> Result<Vec<usize>> {
    let (nx, ny) = grid.dimensions();
    let origin = grid.origin();
    let cell_size = grid.cell_size();
    let step = 0.5 * cell_size;
    let mut touched = false;
    let mut cells = Vec::new();

    let mut visit = |p: &Point| {
        if grid.nearest_sample(p).is_none() {
            return;
        }
        touched = true;
        let g = (*p - origin) / cell_size;
        for gy in [g.y.floor(), g.y.ceil()] {
            for gx in [g.x.floor(), g.x.ceil()] {
                if gx < 0.0 || gy < 0.0 || gx >= nx as f64 || gy >= ny as f64 {
                    continue;
                }
                let (ix, iy) = (gx as usize, gy as usize);
                if grid.elevation(ix, iy).is_some() {
                    cells.push(iy * nx + ix);
                }
            }
        }
    };

    match source {
        [] => {}
        [single] => visit(single),
        _ => {
            for w in source.windows(2) {
                let span = w[1] - w[0];
                let steps = (span.norm() / step).ceil().max(1.0) as usize;
                for k in 0..=steps {
                    visit(&(w[0] + span * (k as f64 / steps as f64)));
                }
            }
        }
    }

    if !touched {
        return Err(IgnitionError::coverage(
            "source line does not intersect the elevation grid extent",
        ));
    }
    cells.sort_unstable();
    cells.dedup();
    if cells.is_empty() {
        return Err(IgnitionError::coverage(
            "every grid cell along the source line is no-data",
        ));
    }
    Ok(cells)
}

/// Planar distance from `p` to the nearest point of `source`
fn distance_to_polyline(p: &Point, source: &[Point]) -> f64 {
    let p = *p;
    match source {
        [] => 0.0,
        [single] => (p - *single).norm(),
        _ => source
            .windows(2)
            .map(|w| {
                let span = w[1] - w[0];
                let len_sq = span.norm_squared();
                if len_sq < VERTEX_EPSILON * VERTEX_EPSILON {
                    return (p - w[0]).norm();
                }
                let t = ((p - w[0]).dot(&span) / len_sq).clamp(0.0, 1.0);
                (p - (w[0] + span * t)).norm()
            })
            .fold(f64::INFINITY, f64::min),
    }
}

/// One relaxation step of the neighbourhood
#[derive(Debug, Clone, PartialEq)]
struct Step {
    dx: isize,
    dy: isize,
    planar_sq: f64,
    /// Samples strictly between the two ends, relative to the start
    crossed: Vec<(isize, isize)>,
}

/// Neighbour steps in fixed row-major order
fn neighbor_steps(radius: usize, cell_size: f64) -> Vec<Step> {
    let r = radius as isize;
    let mut steps = Vec::with_capacity((2 * radius + 1).pow(2) - 1);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx == 0 && dy == 0 {
                continue;
            }
            let n = dx.abs().max(dy.abs());
            let mut crossed: Vec<(isize, isize)> = (1..n)
                .map(|k| {
                    let t = k as f64 / n as f64;
                    (
                        (dx as f64 * t).round() as isize,
                        (dy as f64 * t).round() as isize,
                    )
                })
                .collect();
            crossed.dedup();
            steps.push(Step {
                dx,
                dy,
                planar_sq: ((dx * dx + dy * dy) as f64) * cell_size * cell_size,
                crossed,
            });
        }
    }
    steps
}
