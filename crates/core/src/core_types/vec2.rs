//! Planar point and vector aliases plus the conversions to `geo` coordinates.

use geo::Coord;
use nalgebra::{Point2, Vector2};

/// Planar position in projected (metric) coordinates.
///
/// This is a simple alias for `nalgebra::Point2<f64>`, used for every ignition
/// waypoint and every vertex handed between the engine's stages.
pub type Point = Point2<f64>;

/// Planar displacement or direction.
pub type Vec2 = Vector2<f64>;

/// Convert an engine point into a `geo` coordinate
#[inline]
pub fn to_coord(p: &Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Convert a `geo` coordinate into an engine point
#[inline]
pub fn from_coord(c: Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}
