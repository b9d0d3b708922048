//! Flank firing
//!
//! Igniters walk downwind along lines parallel to the firing direction,
//! stepping across the unit from the chosen side. Heats and lanes are laid
//! out as in strip firing but stacked across local X.

use geo::orient::{Direction, Orient};
use geo::{coord, BoundingRect, MapCoords, MultiPolygon, Polygon};
use tracing::debug;

use super::config::{FlankConfig, Side};
use super::{lane_widths, Plan};
use crate::core_types::Point;
use crate::error::{require_positive, IgnitionError, Result};
use crate::geometry::{BurnUnit, PolygonSplitter};
use crate::pattern::Heat;
use crate::personnel::IgnitionCrew;

/// Reflect a local-frame polygon across the Y axis, keeping it counter-clockwise
fn mirrored(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon
        .map_coords(|c| coord! { x: -c.x, y: c.y })
        .orient(Direction::Default)
}

fn mirrored_multi(polygons: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    polygons
        .map_coords(|c| coord! { x: -c.x, y: c.y })
        .orient(Direction::Default)
}

pub(crate) fn plan(unit: &BurnUnit, crew: &IgnitionCrew, config: &FlankConfig) -> Result<Plan> {
    let frame = unit.frame();
    let local = frame.polygon_to_local(unit.polygon());
    // Right flank first: work on the mirrored unit so bands start at +X
    let flip = config.side == Side::Right;
    let working = if flip { mirrored(&local) } else { local };
    let unflip = |leg: &[Point]| -> Vec<Point> {
        if flip {
            leg.iter().map(|p| Point::new(-p.x, p.y)).collect()
        } else {
            leg.to_vec()
        }
    };

    let bounds = working
        .bounding_rect()
        .ok_or_else(|| IgnitionError::degenerate("firing area has no extent"))?;
    let depth = match config.depth {
        Some(depth) => depth,
        None => require_positive("depth", bounds.width() / crew.len() as f64)?,
    };
    let heat_depth = config.heat_depth.unwrap_or(depth);
    let widths = lane_widths(crew.len(), depth, heat_depth);
    let splitter = PolygonSplitter::across(widths.iter().sum())?;

    let heats: Vec<Heat> = splitter
        .split(&working)
        .iter()
        .enumerate()
        .map(|(k, band)| {
            let mut heat = Heat::new(k);
            let area = if flip {
                mirrored_multi(&band.area)
            } else {
                band.area.clone()
            };
            heat.area = Some(frame.multi_polygon_to_world(&area));
            for (i, lane) in splitter.split_lanes(band, &widths).iter().enumerate() {
                let legs = splitter
                    .ignition_line(&working, lane, 1.0)
                    .iter()
                    .map(|leg| frame.points_to_world(&unflip(leg)))
                    .collect();
                heat.assign(i, legs);
            }
            heat
        })
        .collect();
    debug!(heats = heats.len(), depth, heat_depth, "Laid out flank heats");

    let mut plan = Plan::new(crew.clone(), config.timing);
    plan.spacing = config.spacing;
    plan.push_heats(heats, "no igniter lane crosses the unit");
    Ok(plan)
}
