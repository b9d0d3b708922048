//! Head and back firing along one boundary segment
//!
//! A single igniter follows either the upwind (aft) or downwind (fore)
//! segment of the unit. Segments run counter-clockwise, so clockwise traversal
//! reverses them.

use geo::MultiPolygon;
use tracing::debug;

use super::config::PerimeterConfig;
use super::{fit_crew, Plan};
use crate::error::Result;
use crate::geometry::BurnUnit;
use crate::pattern::Heat;
use crate::personnel::IgnitionCrew;

/// Boundary segment a perimeter technique follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    /// Upwind side, used by head firing
    Aft,
    /// Downwind side, used by back firing
    Fore,
}

impl Edge {
    fn technique(self) -> &'static str {
        match self {
            Edge::Aft => "head",
            Edge::Fore => "back",
        }
    }
}

pub(crate) fn plan(
    unit: &BurnUnit,
    crew: &IgnitionCrew,
    config: &PerimeterConfig,
    edge: Edge,
) -> Result<Plan> {
    let (crew, crew_warning) = fit_crew(edge.technique(), crew, 1);
    let (inner, area_warning) = unit.shrunk(config.offset)?;
    let segments = inner.segments();

    let mut line = match edge {
        Edge::Aft => segments.aft,
        Edge::Fore => segments.fore,
    };
    if config.clockwise {
        line.reverse();
    }

    let mut heat = Heat::new(0);
    heat.area = Some(MultiPolygon::new(vec![inner.polygon().clone()]));
    heat.assign(0, vec![line]);
    debug!(?edge, clockwise = config.clockwise, "Laid out perimeter segment");

    let mut plan = Plan::new(crew, config.timing);
    plan.warnings.extend(crew_warning);
    plan.warnings.extend(area_warning);
    plan.push_heats([heat], "boundary segment is empty");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Point;
    use crate::error::{CrewResolution, PatternWarning};
    use crate::personnel::Igniter;

    fn square() -> BurnUnit {
        BurnUnit::from_exterior(
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            0.0,
            None,
        )
        .unwrap()
    }

    fn crew(n: usize) -> IgnitionCrew {
        IgnitionCrew::clone_igniter(Igniter::line(1.0).unwrap(), n).unwrap()
    }

    #[test]
    fn test_back_follows_downwind_edge() {
        let plan = plan(&square(), &crew(1), &PerimeterConfig::default(), Edge::Fore).unwrap();
        let line = &plan.heats[0].assignments[&0][0];
        // Clockwise along the north edge: west to east
        assert_eq!(line.first(), Some(&Point::new(0.0, 100.0)));
        assert_eq!(line.last(), Some(&Point::new(100.0, 100.0)));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_head_counter_clockwise() {
        let config = PerimeterConfig {
            clockwise: false,
            ..PerimeterConfig::default()
        };
        let plan = plan(&square(), &crew(1), &config, Edge::Aft).unwrap();
        let line = &plan.heats[0].assignments[&0][0];
        assert_eq!(line.first(), Some(&Point::new(0.0, 100.0)));
        assert_eq!(line.last(), Some(&Point::new(100.0, 100.0)));
        assert!(line.contains(&Point::new(0.0, 0.0)));
        assert!(line.contains(&Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_larger_crew_is_truncated() {
        let plan = plan(&square(), &crew(3), &PerimeterConfig::default(), Edge::Aft).unwrap();
        assert_eq!(plan.crew.len(), 1);
        assert_eq!(plan.heats[0].assignments.len(), 1);
        assert!(matches!(
            plan.warnings[..],
            [PatternWarning::CrewSizeMismatch {
                technique: "head",
                expected: 1,
                actual: 3,
                resolution: CrewResolution::Truncated,
            }]
        ));
    }
}
