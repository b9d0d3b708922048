//! Burn unit boundary with its firing direction
//!
//! A [`BurnUnit`] is validated once at construction and never mutated. The
//! buffering operations used to carve out control lines and blacklines return
//! new units.

use std::sync::Arc;

use geo::orient::{Direction, Orient};
use geo::algorithm::buffer::{BufferStyle, LineCap};
use geo::{Area, BooleanOps, Buffer, Intersects, Line, LineString, MultiPolygon, Polygon};
use tracing::{debug, warn};

use super::{BoundarySegments, OrientedFrame};
use crate::core_types::{to_coord, Degrees, Point};
use crate::error::{require_non_negative, IgnitionError, PatternWarning, Result};
use crate::grid::ElevationGrid;

/// Areas below this are treated as empty
const AREA_EPSILON: f64 = 1e-9;

/// Boundary polygon, firing direction and optional terrain of one burn unit
#[derive(Debug, Clone)]
pub struct BurnUnit {
    polygon: Polygon<f64>,
    direction: Degrees,
    crs: Option<u32>,
    elevation: Option<Arc<ElevationGrid>>,
}

impl BurnUnit {
    /// Validate a boundary and create a unit.
    ///
    /// # Arguments
    /// * `polygon` - Boundary in projected planar coordinates (metres). Only the
    ///   exterior ring is used.
    /// * `direction` - Firing direction, degrees clockwise from north
    /// * `crs` - EPSG code of the projected coordinates, carried through to the pattern
    pub fn new(
        polygon: Polygon<f64>,
        direction: impl Into<Degrees>,
        crs: Option<u32>,
    ) -> Result<Self> {
        let polygon = validate_boundary(polygon)?;
        let direction = direction.into();
        if !direction.is_finite() {
            return Err(IgnitionError::constraint(
                "direction",
                format!("must be finite, got {}", *direction),
            ));
        }
        debug!(
            area = polygon.unsigned_area(),
            vertices = polygon.exterior().0.len() - 1,
            direction = *direction.normalized(),
            "Created burn unit"
        );
        Ok(Self {
            polygon,
            direction: direction.normalized(),
            crs,
            elevation: None,
        })
    }

    /// Create a unit from world `(x, y)` vertices of the exterior ring
    pub fn from_exterior(
        vertices: &[(f64, f64)],
        direction: impl Into<Degrees>,
        crs: Option<u32>,
    ) -> Result<Self> {
        let ring = LineString::from(vertices.to_vec());
        Self::new(Polygon::new(ring, vec![]), direction, crs)
    }

    /// Boundary polygon (exterior counter-clockwise)
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Firing direction in `[0, 360)`
    pub fn direction(&self) -> Degrees {
        self.direction
    }

    /// EPSG code of the coordinates, if known
    pub fn crs(&self) -> Option<u32> {
        self.crs
    }

    /// Elevation grid attached for contour following
    pub fn elevation(&self) -> Option<&ElevationGrid> {
        self.elevation.as_deref()
    }

    /// Boundary area in square metres
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// Firing-aligned frame of this unit
    pub fn frame(&self) -> OrientedFrame {
        // A validated polygon always has vertices, so the frame cannot fail
        OrientedFrame::new(&self.polygon, self.direction)
            .unwrap_or_else(|_| OrientedFrame::from_direction(self.direction))
    }

    /// Fore, aft, port and starboard boundary segments
    pub fn segments(&self) -> BoundarySegments {
        BoundarySegments::new(&self.polygon, &self.frame())
    }

    /// Copy with a different firing direction
    #[must_use]
    pub fn with_firing_direction(&self, direction: impl Into<Degrees>) -> Self {
        Self {
            direction: direction.into().normalized(),
            ..self.clone()
        }
    }

    /// Copy with an elevation grid attached
    #[must_use]
    pub fn with_elevation(&self, grid: impl Into<Arc<ElevationGrid>>) -> Self {
        Self {
            elevation: Some(grid.into()),
            ..self.clone()
        }
    }

    /// Copy shrunk inward by a control line of `width` metres.
    pub fn buffer_control_line(&self, width: f64) -> Result<Self> {
        self.shrunk(width).map(|(unit, _)| unit)
    }

    /// Copy with a band of `width` metres removed along the fore (downwind)
    /// segment, as left behind by a blackline.
    pub fn buffer_downfire(&self, width: f64) -> Result<Self> {
        require_non_negative("width", width)?;
        if width == 0.0 {
            return Ok(self.clone());
        }
        let fore: LineString<f64> = self.segments().fore.iter().map(to_coord).collect();
        let band = fore.buffer_with_style(BufferStyle::new(width).line_cap(LineCap::Square));
        let remaining = self.polygon.difference(&band);
        let (unit, _) = self.keep_largest(remaining, "downfire buffer")?;
        Ok(unit)
    }

    /// Copy with another unit's area subtracted.
    ///
    /// Fails with [`IgnitionError::GeometryDegenerate`] when the remainder
    /// encloses a hole, as when a unit is differenced with its own control
    /// line buffer. Burn unit boundaries have no interior rings.
    pub fn difference(&self, other: &BurnUnit) -> Result<Self> {
        let remaining = self.polygon.difference(&other.polygon);
        self.keep_largest(remaining, "difference").map(|(unit, _)| unit)
    }

    /// Inward buffer that also reports a multipart result
    pub(crate) fn shrunk(&self, width: f64) -> Result<(Self, Option<PatternWarning>)> {
        require_non_negative("offset", width)?;
        if width == 0.0 {
            return Ok((self.clone(), None));
        }
        let shrunk = self.polygon.buffer(-width);
        self.keep_largest(shrunk, "control line buffer")
    }

    fn keep_largest(
        &self,
        parts: MultiPolygon<f64>,
        operation: &'static str,
    ) -> Result<(Self, Option<PatternWarning>)> {
        let count = parts
            .0
            .iter()
            .filter(|p| p.unsigned_area() > AREA_EPSILON)
            .count();
        let largest = parts
            .0
            .into_iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
            .filter(|p| p.unsigned_area() > AREA_EPSILON)
            .ok_or_else(|| IgnitionError::degenerate(format!("{operation} left no area")))?;
        if largest.interiors().iter().any(|ring| ring.0.len() > 3) {
            return Err(IgnitionError::degenerate(format!(
                "{operation} leaves a hole; boundary must be simple"
            )));
        }

        let warning = (count > 1).then(|| {
            warn!(operation, parts = count, "Multipart result, keeping the largest part");
            PatternWarning::MultipartArea {
                operation,
                parts: count,
            }
        });

        let polygon = validate_boundary(Polygon::new(largest.exterior().clone(), vec![]))?;
        Ok((
            Self {
                polygon,
                ..self.clone()
            },
            warning,
        ))
    }
}

/// Check a boundary and normalise it to a counter-clockwise exterior ring
fn validate_boundary(polygon: Polygon<f64>) -> Result<Polygon<f64>> {
    let (exterior, _) = polygon.into_inner();
    if exterior.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(IgnitionError::degenerate("boundary has non-finite coordinates"));
    }

    let mut vertices: Vec<Point> = exterior.coords().map(|c| Point::new(c.x, c.y)).collect();
    super::polyline::dedup(&mut vertices);
    while vertices.len() > 1
        && (vertices[0] - vertices[vertices.len() - 1]).norm() < super::polyline::VERTEX_EPSILON
    {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(IgnitionError::degenerate(format!(
            "boundary needs at least 3 distinct vertices, got {}",
            vertices.len()
        )));
    }

    let ring = LineString::from(vertices.iter().map(to_coord).collect::<Vec<_>>());
    let polygon = Polygon::new(ring, vec![]).orient(Direction::Default);
    if polygon.unsigned_area() <= AREA_EPSILON {
        return Err(IgnitionError::degenerate("boundary has zero area"));
    }
    if self_intersects(polygon.exterior()) {
        return Err(IgnitionError::degenerate("boundary ring self-intersects"));
    }
    Ok(polygon)
}

fn self_intersects(ring: &LineString<f64>) -> bool {
    let edges: Vec<Line<f64>> = ring.lines().collect();
    let n = edges.len();
    for i in 0..n {
        for j in (i + 2)..n {
            // First and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return true;
            }
        }
    }
    false
}
