//! Firing-aligned local coordinate frame
//!
//! Every technique lays out its lines in a frame where the firing direction
//! points along `+Y` and the boundary's lowest vertex sits at the origin, so
//! depths and spacings become plain axis-aligned offsets.
//!
//! # Convention
//!
//! World coordinates are projected metres with `x` east and `y` north. A
//! bearing `θ` (clockwise from north) has world direction `(sin θ, cos θ)`;
//! rotating that vector counter-clockwise by `θ` yields `(0, 1)`.

use geo::{MapCoords, MultiPolygon, Polygon};
use nalgebra::{Isometry2, Vector2};
use tracing::debug;

use crate::core_types::{to_coord, Degrees, Point, Vec2};
use crate::error::{IgnitionError, Result};

/// Rigid transform between world coordinates and the firing-aligned frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedFrame {
    direction: Degrees,
    isometry: Isometry2<f64>,
}

impl OrientedFrame {
    /// Build the frame for a boundary and firing bearing.
    ///
    /// The translation puts the minimum-Y vertex of the rotated boundary at the
    /// origin; ties between equally low vertices pick the smallest X.
    pub fn new(boundary: &Polygon<f64>, direction: Degrees) -> Result<Self> {
        let direction = direction.normalized();
        let rotation = Isometry2::rotation(direction.to_radians());

        let anchor = boundary
            .exterior()
            .coords()
            .map(|c| rotation.transform_point(&Point::new(c.x, c.y)))
            .min_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
            .ok_or_else(|| IgnitionError::degenerate("boundary has no vertices"))?;

        let isometry = Isometry2::new(-anchor.coords, direction.to_radians());
        debug!(
            direction = *direction,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "Built firing frame"
        );

        Ok(Self {
            direction,
            isometry,
        })
    }

    /// Frame with a given bearing and no translation.
    pub fn from_direction(direction: Degrees) -> Self {
        let direction = direction.normalized();
        Self {
            direction,
            isometry: Isometry2::new(Vector2::zeros(), direction.to_radians()),
        }
    }

    /// Firing bearing this frame is aligned to
    pub fn direction(&self) -> Degrees {
        self.direction
    }

    /// Unit vector of the firing direction in world coordinates
    pub fn world_direction(&self) -> Vec2 {
        let theta = self.direction.to_radians();
        Vec2::new(theta.sin(), theta.cos())
    }

    /// Map a world point into the local frame
    #[inline]
    pub fn to_local(&self, p: &Point) -> Point {
        self.isometry.transform_point(p)
    }

    /// Map a local point back into world coordinates
    #[inline]
    pub fn to_world(&self, p: &Point) -> Point {
        self.isometry.inverse_transform_point(p)
    }

    /// Map a world polygon into the local frame
    pub fn polygon_to_local(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        polygon.map_coords(|c| to_coord(&self.to_local(&Point::new(c.x, c.y))))
    }

    /// Map a local multipolygon back into world coordinates
    pub fn multi_polygon_to_world(&self, polygons: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        polygons.map_coords(|c| to_coord(&self.to_world(&Point::new(c.x, c.y))))
    }

    /// Map local polyline vertices back into world coordinates
    pub fn points_to_world(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.to_world(p)).collect()
    }

    /// Map world polyline vertices into the local frame
    pub fn points_to_local(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.to_local(p)).collect()
    }
}
