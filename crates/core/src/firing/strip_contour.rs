//! Strip firing along terrain-following contours
//!
//! Heats and lanes are assigned exactly as in strip firing, but instead of a
//! straight line each igniter walks the iso-distance contour at its lane
//! centre. Distances are geodesic over the elevation grid, measured from the
//! aft (upwind) edge of the unit's oriented bounding box, so on flat terrain
//! the contours reduce to strip lines.

use std::borrow::Cow;

use geo::{BoundingRect, Intersects};
use tracing::{debug, warn};

use super::config::StripContourConfig;
use super::strip::serpentine;
use super::{lane_widths, Plan};
use crate::core_types::{Point, Vec2};
use crate::error::{IgnitionError, PatternWarning, Result};
use crate::geometry::polyline::clip_to_polygon;
use crate::geometry::BurnUnit;
use crate::grid::{DistanceField, ElevationGrid};
use crate::pattern::Heat;
use crate::personnel::IgnitionCrew;

pub(crate) fn plan(
    unit: &BurnUnit,
    crew: &IgnitionCrew,
    config: &StripContourConfig,
) -> Result<Plan> {
    let grid = unit
        .elevation()
        .ok_or_else(|| IgnitionError::coverage("contour following needs an elevation grid"))?;
    if !grid.extent().intersects(unit.polygon()) {
        return Err(IgnitionError::coverage(
            "elevation grid does not overlap the burn unit",
        ));
    }
    let grid: Cow<'_, ElevationGrid> = match config.z_scale {
        Some(z_scale) => Cow::Owned(grid.clone().with_z_scale(z_scale)?),
        None => Cow::Borrowed(grid),
    };

    let frame = unit.frame();
    let local = frame.polygon_to_local(unit.polygon());
    let bounds = local
        .bounding_rect()
        .ok_or_else(|| IgnitionError::degenerate("firing area has no extent"))?;

    // Aft edge of the oriented bounding box
    let source = frame.points_to_world(&[
        Point::new(bounds.min().x, bounds.min().y),
        Point::new(bounds.max().x, bounds.min().y),
    ]);
    let field = DistanceField::compute_with_neighborhood(&grid, &source, config.neighborhood)?;

    let mut plan = Plan::new(crew.clone(), config.strip.timing);
    plan.spacing = config.strip.spacing;

    let unreachable = field.unreachable_within(unit.polygon());
    if unreachable > 0 {
        warn!(unreachable, "Firing area has grid cells the source line cannot reach");
        plan.warnings.push(PatternWarning::UnreachableCells { count: unreachable });
    }

    // Walk at least the straight-line depth so missing terrain shows up as
    // dropped heats rather than a shorter pattern
    let limit = field
        .max_distance_within(unit.polygon())
        .unwrap_or(0.0)
        .max(bounds.height());

    let widths = lane_widths(crew.len(), config.strip.depth, config.strip.heat_depth());
    let thickness: f64 = widths.iter().sum();
    let heat_count = (limit / thickness).ceil().max(1.0) as usize;

    let mut levels = Vec::with_capacity(heat_count * widths.len());
    for k in 0..heat_count {
        let mut lo = k as f64 * thickness;
        for &width in &widths {
            levels.push(lo + 0.5 * width);
            lo += width;
        }
    }
    let contours = field.contours(&levels);

    let heats: Vec<Heat> = contours
        .chunks(widths.len())
        .enumerate()
        .map(|(k, lanes)| {
            let walk_sign = serpentine(config.strip.side.walk_sign(), k);
            let heading = Vec2::new(walk_sign, 0.0);
            let mut heat = Heat::new(k);
            for (i, contour) in lanes.iter().enumerate() {
                let mut legs: Vec<Vec<Point>> = contour
                    .lines
                    .iter()
                    .flat_map(|line| {
                        clip_to_polygon(&frame.points_to_local(line), &local, heading)
                    })
                    .collect();
                legs.sort_by(|a, b| {
                    a[0].coords
                        .dot(&heading)
                        .total_cmp(&b[0].coords.dot(&heading))
                });
                heat.assign(i, legs.iter().map(|leg| frame.points_to_world(leg)).collect());
            }
            heat
        })
        .collect();
    debug!(heats = heats.len(), levels = levels.len(), limit, "Traced contour heats");

    plan.push_heats(heats, "no contour of the heat's lanes lies on reachable terrain");
    if plan.heats.is_empty() {
        return Err(IgnitionError::coverage(
            "no heat could be traced on the elevation grid",
        ));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firing::config::StripConfig;
    use crate::personnel::Igniter;
    use approx::assert_relative_eq;

    fn square_on(grid: ElevationGrid) -> BurnUnit {
        BurnUnit::from_exterior(
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            0.0,
            None,
        )
        .unwrap()
        .with_elevation(grid)
    }

    fn flat() -> ElevationGrid {
        ElevationGrid::flat(Point::new(0.0, 0.0), 100.0, 100.0, 5.0, 200.0).unwrap()
    }

    fn config(depth: f64) -> StripContourConfig {
        StripContourConfig {
            strip: StripConfig {
                depth,
                ..StripConfig::default()
            },
            ..StripContourConfig::default()
        }
    }

    fn crew(n: usize) -> IgnitionCrew {
        IgnitionCrew::clone_igniter(Igniter::line(1.0).unwrap(), n).unwrap()
    }

    #[test]
    fn test_flat_terrain_matches_strip_lines() {
        let plan = plan(&square_on(flat()), &crew(1), &config(50.0)).unwrap();
        assert_eq!(plan.heats.len(), 2);
        assert!(plan.warnings.is_empty());
        for (k, heat) in plan.heats.iter().enumerate() {
            let leg = &heat.assignments[&0][0];
            for p in leg {
                assert_relative_eq!(p.y, 25.0 + 50.0 * k as f64, epsilon = 1e-9);
            }
        }
        // Serpentine: east to west first
        let first = &plan.heats[0].assignments[&0][0];
        assert!(first[0].x > first[first.len() - 1].x);
    }

    #[test]
    fn test_missing_grid_is_coverage_error() {
        let unit =
            BurnUnit::from_exterior(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], 0.0, None).unwrap();
        assert!(matches!(
            plan(&unit, &crew(1), &config(5.0)),
            Err(IgnitionError::GridCoverage { .. })
        ));

        let far = ElevationGrid::flat(Point::new(500.0, 500.0), 50.0, 50.0, 5.0, 0.0).unwrap();
        let err = plan(&unit.with_elevation(far), &crew(1), &config(5.0)).unwrap_err();
        assert!(err.to_string().contains("does not overlap"), "{err}");
    }

    #[test]
    fn test_no_data_band_drops_far_heats() {
        let (nx, _) = flat().dimensions();
        let grid = (0..nx).fold(flat(), |g, ix| g.with_no_data(ix, 10));
        let plan = plan(&square_on(grid), &crew(1), &config(50.0)).unwrap();
        assert_eq!(plan.heats.len(), 1);
        assert!(plan
            .warnings
            .iter()
            .any(|w| matches!(w, PatternWarning::UnreachableCells { .. })));
        assert!(plan
            .warnings
            .iter()
            .any(|w| matches!(w, PatternWarning::HeatDropped { heat: 1, .. })));
    }

    #[test]
    fn test_every_heat_dropped_is_an_error() {
        let (nx, _) = flat().dimensions();
        let grid = (0..nx).fold(flat(), |g, ix| g.with_no_data(ix, 1));
        assert!(matches!(
            plan(&square_on(grid), &crew(1), &config(50.0)),
            Err(IgnitionError::GridCoverage { .. })
        ));
    }

    #[test]
    fn test_hill_bends_contours() {
        let hill =
            ElevationGrid::single_hill(Point::new(0.0, 0.0), 100.0, 100.0, 2.0, 0.0, 40.0, 20.0)
                .unwrap();
        let plan = plan(&square_on(hill), &crew(1), &config(25.0)).unwrap();
        // Third heat traces distance 62.5, just past the summit
        let ys: Vec<f64> = plan.heats[2].assignments[&0]
            .iter()
            .flatten()
            .map(|p| p.y)
            .collect();
        let highest = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = ys.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(highest - lowest > 1.0, "contour spread {}", highest - lowest);
        assert!(lowest < 62.5);
    }
}
