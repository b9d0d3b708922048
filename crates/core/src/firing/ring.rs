//! Ring firing
//!
//! Two igniters start together at the fore anchor of the (optionally
//! inward-buffered) unit and walk its port and starboard sides in opposite
//! directions until they meet at the aft anchor.

use geo::MultiPolygon;
use tracing::debug;

use super::config::RingConfig;
use super::{fit_crew, Plan};
use crate::error::Result;
use crate::geometry::BurnUnit;
use crate::pattern::Heat;
use crate::personnel::IgnitionCrew;

pub(crate) fn plan(unit: &BurnUnit, crew: &IgnitionCrew, config: &RingConfig) -> Result<Plan> {
    let (crew, crew_warning) = fit_crew("ring", crew, 2);
    let (ring, area_warning) = unit.shrunk(config.offset)?;
    let segments = ring.segments();

    let mut heat = Heat::new(0);
    heat.area = Some(MultiPolygon::new(vec![ring.polygon().clone()]));
    heat.assign(0, vec![segments.port.clone()]);
    let mut starboard = segments.starboard.clone();
    starboard.reverse();
    heat.assign(1, vec![starboard]);
    debug!(offset = config.offset, "Laid out ring");

    let mut plan = Plan::new(crew, config.timing);
    plan.warnings.extend(crew_warning);
    plan.warnings.extend(area_warning);
    plan.push_heats([heat], "firing area has no perimeter");
    Ok(plan)
}
