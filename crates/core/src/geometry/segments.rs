//! Boundary segments relative to the firing direction
//!
//! The exterior ring is cut at four anchors found in the firing frame: fore
//! (most downwind), aft (most upwind), port (leftmost) and starboard
//! (rightmost). Walking the counter-clockwise ring between anchors gives the
//! segments that perimeter techniques follow.

use std::cmp::Ordering;

use geo::Polygon;

use super::OrientedFrame;
use crate::core_types::Point;

/// Coordinate difference (metres) below which two anchor candidates tie
const ANCHOR_TOLERANCE: f64 = 1e-6;

/// Polylines of the boundary between its anchors, in world coordinates
///
/// Every segment follows the counter-clockwise ring order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySegments {
    /// Downwind side, from starboard to port
    pub fore: Vec<Point>,
    /// Upwind side including the flanks, from port to starboard
    pub aft: Vec<Point>,
    /// Left side, from fore to aft
    pub port: Vec<Point>,
    /// Right side, from aft to fore
    pub starboard: Vec<Point>,
    /// Closed exterior ring starting and ending at the fore anchor
    pub perimeter: Vec<Point>,
    /// Anchor vertices `[fore, aft, port, starboard]`
    pub anchors: [Point; 4],
}

impl BoundarySegments {
    /// Split a counter-clockwise polygon's exterior at its anchors.
    pub fn new(polygon: &Polygon<f64>, frame: &OrientedFrame) -> Self {
        let world: Vec<Point> = polygon
            .exterior()
            .coords()
            .map(|c| Point::new(c.x, c.y))
            .collect();
        // Drop the closing vertex
        let ring = &world[..world.len().saturating_sub(1)];
        if ring.is_empty() {
            return Self {
                fore: Vec::new(),
                aft: Vec::new(),
                port: Vec::new(),
                starboard: Vec::new(),
                perimeter: Vec::new(),
                anchors: [Point::origin(); 4],
            };
        }
        let local = frame.points_to_local(ring);

        // Ties: fore and starboard prefer the right/downwind vertex, aft the
        // leftmost and port the most downwind
        let fore = anchor(&local, |a, b| near_cmp(a.y, b.y).then(near_cmp(a.x, b.x)));
        let aft = anchor(&local, |a, b| near_cmp(b.y, a.y).then(near_cmp(b.x, a.x)));
        let port = anchor(&local, |a, b| near_cmp(b.x, a.x).then(near_cmp(a.y, b.y)));
        let starboard = anchor(&local, |a, b| near_cmp(a.x, b.x).then(near_cmp(a.y, b.y)));

        let chain = |from: usize, to: usize| ccw_chain(ring, from, to);
        let perimeter = (0..=ring.len()).map(|k| ring[(fore + k) % ring.len()]).collect();

        Self {
            fore: chain(starboard, port),
            aft: chain(port, starboard),
            port: chain(fore, aft),
            starboard: chain(aft, fore),
            perimeter,
            anchors: [ring[fore], ring[aft], ring[port], ring[starboard]],
        }
    }
}

/// Compare coordinates treating values within rounding noise as equal
fn near_cmp(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= ANCHOR_TOLERANCE {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Index of the maximum vertex under `cmp`
fn anchor(local: &[Point], cmp: impl Fn(&Point, &Point) -> Ordering) -> usize {
    local
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| cmp(a, b))
        .map_or(0, |(i, _)| i)
}

/// Vertices from `from` to `to` inclusive following ring order
fn ccw_chain(ring: &[Point], from: usize, to: usize) -> Vec<Point> {
    let n = ring.len();
    if n == 0 {
        return Vec::new();
    }
    let steps = (to + n - from) % n;
    (0..=steps).map(|k| ring[(from + k) % n]).collect()
}
