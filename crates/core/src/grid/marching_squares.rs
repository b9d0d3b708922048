//! Marching squares isoline extraction
//!
//! Extracts the polylines where a scalar field crosses a level. Crossings are
//! placed by linear interpolation along each cell edge and the per-cell
//! segments are stitched into polylines through the edges they share.

use rustc_hash::FxHashMap;

use crate::core_types::Point;

/// Polylines of one iso-level in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Field value the lines trace
    pub level: f64,
    /// Disconnected pieces of the isoline
    pub lines: Vec<Vec<Point>>,
}

/// Grid edge identifier: horizontal edges run from `(x, y)` to `(x + 1, y)`,
/// vertical edges from `(x, y)` to `(x, y + 1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum EdgeKey {
    Horizontal(usize, usize),
    Vertical(usize, usize),
}

/// Extract isolines of `values` (row-major, `nx` x `ny`) at `level`.
///
/// Points are returned in fractional grid coordinates. Cells with a
/// non-finite corner produce no segments. Saddle cells are resolved by the
/// mean of the four corners.
pub fn extract_isolines(values: &[f64], nx: usize, ny: usize, level: f64) -> Vec<Vec<(f64, f64)>> {
    if nx < 2 || ny < 2 || values.len() < nx * ny {
        return Vec::new();
    }

    let mut crossings: FxHashMap<EdgeKey, (f64, f64)> = FxHashMap::default();
    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();

    for y in 0..ny - 1 {
        for x in 0..nx - 1 {
            // Corners counter-clockwise from the lower left
            let v00 = values[y * nx + x];
            let v10 = values[y * nx + x + 1];
            let v11 = values[(y + 1) * nx + x + 1];
            let v01 = values[(y + 1) * nx + x];
            if !(v00.is_finite() && v10.is_finite() && v11.is_finite() && v01.is_finite()) {
                continue;
            }

            let case = u8::from(v00 >= level)
                | (u8::from(v10 >= level) << 1)
                | (u8::from(v11 >= level) << 2)
                | (u8::from(v01 >= level) << 3);
            if case == 0 || case == 15 {
                continue;
            }

            let bottom = EdgeKey::Horizontal(x, y);
            let right = EdgeKey::Vertical(x + 1, y);
            let top = EdgeKey::Horizontal(x, y + 1);
            let left = EdgeKey::Vertical(x, y);

            let mut emit = |a: EdgeKey, b: EdgeKey| {
                for key in [a, b] {
                    crossings
                        .entry(key)
                        .or_insert_with(|| edge_crossing(key, values, nx, level));
                }
                segments.push((a, b));
            };

            let centre_high = 0.25 * (v00 + v10 + v11 + v01) >= level;
            match case {
                1 | 14 => emit(left, bottom),
                2 | 13 => emit(bottom, right),
                3 | 12 => emit(left, right),
                4 | 11 => emit(right, top),
                6 | 9 => emit(bottom, top),
                7 | 8 => emit(left, top),
                // Saddles: lower-left and upper-right high
                5 if centre_high => {
                    emit(bottom, right);
                    emit(top, left);
                }
                5 => {
                    emit(left, bottom);
                    emit(right, top);
                }
                // Saddles: lower-right and upper-left high
                10 if centre_high => {
                    emit(left, bottom);
                    emit(right, top);
                }
                10 => {
                    emit(bottom, right);
                    emit(top, left);
                }
                _ => {}
            }
        }
    }

    stitch(&segments)
        .into_iter()
        .map(|chain| {
            chain
                .into_iter()
                .filter_map(|key| crossings.get(&key).copied())
                .collect()
        })
        .collect()
}

/// Interpolated crossing point of `level` along a grid edge
fn edge_crossing(key: EdgeKey, values: &[f64], nx: usize, level: f64) -> (f64, f64) {
    let (a, b, origin, along_x) = match key {
        EdgeKey::Horizontal(x, y) => (values[y * nx + x], values[y * nx + x + 1], (x, y), true),
        EdgeKey::Vertical(x, y) => (values[y * nx + x], values[(y + 1) * nx + x], (x, y), false),
    };
    let t = if (b - a).abs() > f64::EPSILON {
        ((level - a) / (b - a)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let (x, y) = (origin.0 as f64, origin.1 as f64);
    if along_x {
        (x + t, y)
    } else {
        (x, y + t)
    }
}

/// Join segments sharing an edge into chains of edge keys.
///
/// Open chains are traced from their free ends first, then closed loops.
fn stitch(segments: &[(EdgeKey, EdgeKey)]) -> Vec<Vec<EdgeKey>> {
    let mut incident: FxHashMap<EdgeKey, Vec<usize>> = FxHashMap::default();
    for (i, &(a, b)) in segments.iter().enumerate() {
        incident.entry(a).or_default().push(i);
        incident.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    let degree = |key: &EdgeKey| incident.get(key).map_or(0, Vec::len);

    // Open chains, in segment order for determinism
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let (a, b) = segments[i];
        let start = if degree(&a) == 1 {
            a
        } else if degree(&b) == 1 {
            b
        } else {
            continue;
        };
        chains.push(trace(segments, &incident, &mut used, i, start));
    }

    // Remaining segments form closed loops
    for i in 0..segments.len() {
        if !used[i] {
            let start = segments[i].0;
            chains.push(trace(segments, &incident, &mut used, i, start));
        }
    }

    chains
}

fn trace(
    segments: &[(EdgeKey, EdgeKey)],
    incident: &FxHashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
    first: usize,
    start: EdgeKey,
) -> Vec<EdgeKey> {
    let mut chain = vec![start];
    let mut key = start;
    let mut segment = first;
    loop {
        used[segment] = true;
        let (a, b) = segments[segment];
        let next = if a == key { b } else { a };
        chain.push(next);

        let Some(&following) = incident
            .get(&next)
            .and_then(|list| list.iter().find(|&&s| !used[s]))
        else {
            break;
        };
        key = next;
        segment = following;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Distance from the centre of a `n` x `n` grid
    fn radial(n: usize) -> Vec<f64> {
        let c = (n - 1) as f64 / 2.0;
        let mut v = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                v.push(((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt());
            }
        }
        v
    }

    #[test]
    fn test_circle_is_one_closed_loop() {
        let lines = extract_isolines(&radial(21), 21, 21, 5.0);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.first(), line.last());
        for &(x, y) in line {
            let r = ((x - 10.0).powi(2) + (y - 10.0).powi(2)).sqrt();
            assert!((r - 5.0).abs() < 0.2, "radius {r}");
        }
    }

    #[test]
    fn test_linear_ramp_gives_interpolated_straight_line() {
        // value = x, level 2.25 crosses every row at x = 2.25
        let nx = 6;
        let ny = 4;
        let values: Vec<f64> = (0..ny).flat_map(|_| (0..nx).map(|x| x as f64)).collect();
        let lines = extract_isolines(&values, nx, ny, 2.25);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), ny);
        for &(x, _) in &lines[0] {
            assert_relative_eq!(x, 2.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_infinite_corners_are_skipped() {
        let nx = 6;
        let ny = 4;
        let mut values: Vec<f64> = (0..ny).flat_map(|_| (0..nx).map(|x| x as f64)).collect();
        values[nx * 3 + 2] = f64::INFINITY;
        let lines = extract_isolines(&values, nx, ny, 2.25);
        let points: usize = lines.iter().map(Vec::len).sum();
        assert!(points < ny + 1);
        assert!(lines.iter().flatten().all(|&(x, _)| (x - 2.25).abs() < 1e-12));
    }

    #[test]
    fn test_saddle_uses_centre_mean() {
        // Row-major 2x2: lower-left and upper-right high
        let values = [1.0, 0.0, 0.0, 1.0];
        let connected = extract_isolines(&values, 2, 2, 0.5);
        assert_eq!(connected.len(), 2);
        // Centre high: the upper-left crossing pair cuts off the low corner
        assert!(connected.iter().any(|l| l.contains(&(0.0, 0.5)) && l.contains(&(0.5, 1.0))));

        let near = |a: (f64, f64), b: (f64, f64)| {
            (a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12
        };
        let isolated = extract_isolines(&values, 2, 2, 0.6);
        assert!(isolated.iter().any(|l| {
            l.iter().any(|&p| near(p, (0.0, 0.4))) && l.iter().any(|&p| near(p, (0.4, 0.0)))
        }));
    }
}
