//! Terrain elevation grid consumed by contour-following techniques
//!
//! Holds an already-fetched Digital Elevation Model on a regular grid with
//! world-space placement, no-data handling and a topographic influence
//! multiplier. Fetching and caching elevation data is left to the caller.

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::core_types::Point;
use crate::error::{require_non_negative, require_positive, IgnitionError, Result};

/// Elevation samples on a regular grid co-registered with the burn unit's
/// projected coordinates
///
/// Sample `(ix, iy)` sits at `origin + (ix, iy) * cell_size`; rows increase
/// northward. `NaN` marks no-data samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    /// World position of sample (0, 0)
    pub(crate) origin: Point,
    /// Uniform spacing between samples in metres (both axes)
    pub(crate) cell_size: f64,
    /// Number of samples in X direction
    pub(crate) nx: usize,
    /// Number of samples in Y direction
    pub(crate) ny: usize,
    /// Elevation data in metres (row-major order: [iy * nx + ix])
    pub(crate) elevations: Vec<f64>,
    /// Multiplier applied to elevation differences when measuring distance
    pub(crate) z_scale: f64,
}

impl ElevationGrid {
    /// Create a grid from row-major samples (south row first).
    ///
    /// Non-finite samples are treated as no-data.
    pub fn new(
        origin: Point,
        cell_size: f64,
        nx: usize,
        ny: usize,
        elevations: Vec<f64>,
    ) -> Result<Self> {
        require_positive("cell_size", cell_size)?;
        check_shape(nx, ny, elevations.len())?;
        let elevations = elevations
            .into_iter()
            .map(|z| if z.is_finite() { z } else { f64::NAN })
            .collect();

        Ok(Self {
            origin,
            cell_size,
            nx,
            ny,
            elevations,
            z_scale: 1.0,
        })
    }

    /// Create flat terrain covering `width` x `height` metres from `origin`
    pub fn flat(
        origin: Point,
        width: f64,
        height: f64,
        cell_size: f64,
        elevation: f64,
    ) -> Result<Self> {
        require_positive("cell_size", cell_size)?;
        let nx = (width / cell_size).ceil() as usize + 1;
        let ny = (height / cell_size).ceil() as usize + 1;
        Self::new(origin, cell_size, nx, ny, vec![elevation; nx * ny])
    }

    /// Create terrain with a single Gaussian hill in the middle
    pub fn single_hill(
        origin: Point,
        width: f64,
        height: f64,
        cell_size: f64,
        base_elevation: f64,
        hill_height: f64,
        hill_radius: f64,
    ) -> Result<Self> {
        require_positive("cell_size", cell_size)?;
        require_positive("hill_radius", hill_radius)?;
        let nx = (width / cell_size).ceil() as usize + 1;
        let ny = (height / cell_size).ceil() as usize + 1;
        let center_x = width / 2.0;
        let center_y = height / 2.0;

        let mut elevations = Vec::with_capacity(nx * ny);
        for iy in 0..ny {
            for ix in 0..nx {
                let dx = ix as f64 * cell_size - center_x;
                let dy = iy as f64 * cell_size - center_y;
                let dist_sq = dx * dx + dy * dy;

                // Gaussian hill profile
                let height_factor = (-dist_sq / (hill_radius * hill_radius)).exp();
                elevations.push(base_elevation + hill_height * height_factor);
            }
        }

        Self::new(origin, cell_size, nx, ny, elevations)
    }

    /// Create a grid from a north-up raster whose first row is the northern edge.
    ///
    /// `upper_left` is the world position of the north-west sample and
    /// `nodata` an optional sentinel value mapped to no-data.
    pub fn from_north_up_raster(
        upper_left: Point,
        resolution: f64,
        nx: usize,
        ny: usize,
        rows_top_first: &[f64],
        nodata: Option<f64>,
    ) -> Result<Self> {
        check_shape(nx, ny, rows_top_first.len())?;
        let mut elevations = Vec::with_capacity(nx * ny);
        for row in rows_top_first.chunks(nx).rev() {
            elevations.extend(row.iter().map(|&z| match nodata {
                Some(sentinel) if z == sentinel => f64::NAN,
                _ => z,
            }));
        }
        let origin = Point::new(upper_left.x, upper_left.y - (ny - 1) as f64 * resolution);
        Self::new(origin, resolution, nx, ny, elevations)
    }

    /// Return a copy whose elevation differences are scaled by `z_scale`
    /// when measuring surface distance (0 gives planar distance)
    pub fn with_z_scale(mut self, z_scale: f64) -> Result<Self> {
        self.z_scale = require_non_negative("z_scale", z_scale)?;
        Ok(self)
    }

    /// Set a sample to no-data
    pub fn with_no_data(mut self, ix: usize, iy: usize) -> Self {
        if ix < self.nx && iy < self.ny {
            self.elevations[iy * self.nx + ix] = f64::NAN;
        }
        self
    }

    /// Grid dimensions `(nx, ny)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Spacing between samples
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Topographic influence multiplier
    #[inline]
    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    /// World position of sample (0, 0)
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Elevation at a sample, `None` for no-data or out-of-range indices
    #[inline]
    pub fn elevation(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.nx || iy >= self.ny {
            return None;
        }
        let z = self.elevations[iy * self.nx + ix];
        (!z.is_nan()).then_some(z)
    }

    /// Raw sample slice (row-major, `NaN` for no-data)
    pub(crate) fn raw(&self) -> &[f64] {
        &self.elevations
    }

    /// World position of a sample
    #[inline]
    pub fn sample_position(&self, ix: usize, iy: usize) -> Point {
        Point::new(
            self.origin.x + ix as f64 * self.cell_size,
            self.origin.y + iy as f64 * self.cell_size,
        )
    }

    /// Nearest sample to a world position, `None` when outside the grid extent
    pub fn nearest_sample(&self, p: &Point) -> Option<(usize, usize)> {
        let gx = ((p.x - self.origin.x) / self.cell_size).round();
        let gy = ((p.y - self.origin.y) / self.cell_size).round();
        if gx < 0.0 || gy < 0.0 || gx >= self.nx as f64 || gy >= self.ny as f64 {
            return None;
        }
        Some((gx as usize, gy as usize))
    }

    /// World-space extent covered by the samples
    pub fn extent(&self) -> Rect<f64> {
        let max = self.sample_position(self.nx - 1, self.ny - 1);
        Rect::new(
            coord! { x: self.origin.x, y: self.origin.y },
            coord! { x: max.x, y: max.y },
        )
    }
}

fn check_shape(nx: usize, ny: usize, samples: usize) -> Result<()> {
    if nx < 2 || ny < 2 {
        return Err(IgnitionError::constraint(
            "grid_dimensions",
            format!("need at least 2x2 samples, got {nx}x{ny}"),
        ));
    }
    if samples != nx * ny {
        return Err(IgnitionError::constraint(
            "elevations",
            format!("expected {} samples, got {}", nx * ny, samples),
        ));
    }
    Ok(())
}
