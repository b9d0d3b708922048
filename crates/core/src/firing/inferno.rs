//! Inferno (mass) ignition
//!
//! Every igniter is assigned the closed perimeter of the unit and every
//! waypoint is lit at the pattern start.

use geo::MultiPolygon;
use tracing::debug;

use super::config::InfernoConfig;
use super::Plan;
use crate::error::Result;
use crate::geometry::BurnUnit;
use crate::pattern::{Heat, TimingConfig, TimingMode};
use crate::personnel::IgnitionCrew;

pub(crate) fn plan(unit: &BurnUnit, crew: &IgnitionCrew, config: &InfernoConfig) -> Result<Plan> {
    let (inner, area_warning) = unit.shrunk(config.offset)?;
    let perimeter = inner.segments().perimeter;

    let mut heat = Heat::new(0);
    heat.area = Some(MultiPolygon::new(vec![inner.polygon().clone()]));
    for igniter in 0..crew.len() {
        heat.assign(igniter, vec![perimeter.clone()]);
    }
    debug!(igniters = crew.len(), vertices = perimeter.len(), "Laid out inferno");

    let mut plan = Plan::new(crew.clone(), TimingConfig::default());
    plan.mode = TimingMode::Instantaneous;
    plan.warnings.extend(area_warning);
    plan.push_heats([heat], "firing area has no perimeter");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firing::FiringTechnique;
    use crate::personnel::Igniter;

    #[test]
    fn test_every_igniter_lights_whole_perimeter_at_once() {
        let unit =
            BurnUnit::from_exterior(&[(0.0, 0.0), (80.0, 0.0), (40.0, 60.0)], 45.0, None).unwrap();
        let crew = IgnitionCrew::clone_igniter(Igniter::line(0.5).unwrap(), 3).unwrap();
        let report = FiringTechnique::Inferno(InfernoConfig::default())
            .generate_pattern(&unit, &crew)
            .unwrap();
        let pattern = report.pattern;
        assert_eq!(pattern.paths.len(), 3);
        assert!(pattern.waypoints().all(|(_, _, w)| w.time == 0.0));
        for path in &pattern.paths {
            let stroke = &path.strokes[0];
            assert_eq!(stroke.len(), 4);
            assert_eq!(stroke.first().map(|w| w.point), stroke.last().map(|w| w.point));
        }
    }
}
