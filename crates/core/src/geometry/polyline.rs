//! Polyline helpers: arc length, interpolation and clipping.

use geo::{BooleanOps, LineString, MultiLineString, Polygon};

use crate::core_types::{from_coord, to_coord, Point, Vec2};

/// Distance below which two vertices are treated as the same point
pub const VERTEX_EPSILON: f64 = 1e-7;

/// Total length of a polyline
pub fn length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Running arc length at every vertex (first entry is 0)
pub fn cumulative_lengths(points: &[Point]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(points.len());
    out.push(0.0);
    for w in points.windows(2) {
        acc += (w[1] - w[0]).norm();
        out.push(acc);
    }
    out
}

/// Point at arc length `s` (clamped to the polyline)
///
/// `cumulative` must come from [`cumulative_lengths`] for the same vertices.
pub fn interpolate(points: &[Point], cumulative: &[f64], s: f64) -> Point {
    let Some(last) = points.last() else {
        return Point::origin();
    };
    if points.len() == 1 || s <= 0.0 {
        return points[0];
    }
    let total = cumulative[cumulative.len() - 1];
    if s >= total {
        return *last;
    }
    // First vertex strictly beyond s
    let idx = cumulative.partition_point(|&c| c <= s).max(1);
    let (a, b) = (points[idx - 1], points[idx]);
    let span = cumulative[idx] - cumulative[idx - 1];
    if span <= 0.0 {
        return b;
    }
    let t = (s - cumulative[idx - 1]) / span;
    a + (b - a) * t
}

/// Remove consecutive duplicate vertices
pub fn dedup(points: &mut Vec<Point>) {
    points.dedup_by(|b, a| (*b - *a).norm() < VERTEX_EPSILON);
}

/// Clip a polyline to the interior of a polygon.
///
/// Returned legs are oriented so that they advance along `heading`, ordered by
/// where they start along it, and legs that touch end-to-start are rejoined.
pub fn clip_to_polygon(line: &[Point], polygon: &Polygon<f64>, heading: Vec2) -> Vec<Vec<Point>> {
    if line.len() < 2 {
        return Vec::new();
    }
    let mls = MultiLineString::new(vec![LineString::from(
        line.iter().map(to_coord).collect::<Vec<_>>(),
    )]);
    let clipped = polygon.clip(&mls, false);

    let mut legs: Vec<Vec<Point>> = clipped
        .0
        .into_iter()
        .map(|ls| {
            let mut pts: Vec<Point> = ls.0.into_iter().map(from_coord).collect();
            dedup(&mut pts);
            pts
        })
        .filter(|pts| pts.len() >= 2 && length(pts) > VERTEX_EPSILON)
        .map(|pts| orient_along(pts, heading))
        .collect();

    legs.sort_by(|a, b| a[0].coords.dot(&heading).total_cmp(&b[0].coords.dot(&heading)));
    join_touching(legs)
}

/// Reverse a polyline if it runs against `heading`
pub fn orient_along(mut points: Vec<Point>, heading: Vec2) -> Vec<Point> {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if (last - first).dot(&heading) < 0.0 {
            points.reverse();
        }
    }
    points
}

fn join_touching(legs: Vec<Vec<Point>>) -> Vec<Vec<Point>> {
    let mut out: Vec<Vec<Point>> = Vec::with_capacity(legs.len());
    for leg in legs {
        match out.last_mut() {
            Some(prev) if prev.last().is_some_and(|p| (*p - leg[0]).norm() < 1e-6) => {
                prev.extend(leg.into_iter().skip(1));
            }
            _ => out.push(leg),
        }
    }
    out
}
