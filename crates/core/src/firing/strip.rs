//! Strip-head firing
//!
//! The unit is cut across the firing direction into heats of
//! `(N - 1) * depth + heat_depth` metres, starting at the upwind-most point.
//! Each heat is cut again into one lane per igniter and igniter `i` walks the
//! centre line of lane `i`. Walking direction alternates every heat.

use tracing::debug;

use super::config::StripConfig;
use super::{lane_widths, Plan};
use crate::error::Result;
use crate::geometry::{BurnUnit, PolygonSplitter};
use crate::pattern::Heat;
use crate::personnel::IgnitionCrew;

/// Walking sign of heat `k` for a first-heat sign of `first`
pub(crate) fn serpentine(first: f64, k: usize) -> f64 {
    if k % 2 == 0 {
        first
    } else {
        -first
    }
}

pub(crate) fn plan(unit: &BurnUnit, crew: &IgnitionCrew, config: &StripConfig) -> Result<Plan> {
    let frame = unit.frame();
    let local = frame.polygon_to_local(unit.polygon());
    let widths = lane_widths(crew.len(), config.depth, config.heat_depth());
    let splitter = PolygonSplitter::new(widths.iter().sum())?;

    let heats: Vec<Heat> = splitter
        .split(&local)
        .iter()
        .enumerate()
        .map(|(k, band)| {
            let walk_sign = serpentine(config.side.walk_sign(), k);
            let mut heat = Heat::new(k);
            heat.area = Some(frame.multi_polygon_to_world(&band.area));
            for (i, lane) in splitter.split_lanes(band, &widths).iter().enumerate() {
                let legs = splitter
                    .ignition_line(&local, lane, walk_sign)
                    .iter()
                    .map(|leg| frame.points_to_world(leg))
                    .collect();
                heat.assign(i, legs);
            }
            heat
        })
        .collect();
    debug!(heats = heats.len(), igniters = crew.len(), "Laid out strip heats");

    let mut plan = Plan::new(crew.clone(), config.timing);
    plan.spacing = config.spacing;
    plan.push_heats(heats, "no igniter lane crosses the unit");
    Ok(plan)
}
