//! Firing techniques
//!
//! Each [`FiringTechnique`] variant lays out untimed heats over a
//! [`BurnUnit`] for an [`IgnitionCrew`]; the shared [`TemporalPropagator`]
//! then turns them into a timed [`Pattern`].
//!
//! Generation validates the technique's configuration first, resolves crew
//! size mismatches with a warning and reports every non-fatal problem in the
//! returned [`PatternReport`].

pub mod config;
mod flank;
mod inferno;
mod perimeter;
mod ring;
mod strip;
mod strip_contour;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IgnitionError, PatternWarning, Result};
use crate::geometry::BurnUnit;
use crate::pattern::{Heat, Pattern, TemporalPropagator, TimingConfig, TimingMode};
use crate::personnel::IgnitionCrew;

pub use config::{
    FlankConfig, InfernoConfig, PerimeterConfig, RingConfig, Side, StripConfig, StripContourConfig,
};

/// Closed set of supported firing techniques
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "technique", rename_all = "snake_case")]
pub enum FiringTechnique {
    /// Parallel lines perpendicular to the firing direction, heat by heat
    Strip(StripConfig),
    /// Strip firing along terrain-following iso-distance lines
    StripContour(StripContourConfig),
    /// Lines parallel to the firing direction walked downwind
    Flank(FlankConfig),
    /// Two igniters walking the perimeter in opposite directions
    Ring(RingConfig),
    /// One igniter along the upwind boundary
    Head(PerimeterConfig),
    /// One igniter along the downwind boundary
    Back(PerimeterConfig),
    /// Simultaneous ignition of the whole perimeter
    Inferno(InfernoConfig),
}

/// Generated pattern together with every non-fatal problem met on the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub pattern: Pattern,
    pub warnings: Vec<PatternWarning>,
}

/// Untimed output of a technique, ready for the propagator
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub heats: Vec<Heat>,
    /// Crew after any size fallback
    pub crew: IgnitionCrew,
    pub timing: TimingConfig,
    pub spacing: f64,
    pub mode: TimingMode,
    pub warnings: Vec<PatternWarning>,
}

impl Plan {
    pub fn new(crew: IgnitionCrew, timing: TimingConfig) -> Self {
        Self {
            heats: Vec::new(),
            crew,
            timing,
            spacing: 0.0,
            mode: TimingMode::Walking,
            warnings: Vec::new(),
        }
    }

    /// Append heats, dropping the ones without any line and renumbering the
    /// rest in order
    pub fn push_heats(&mut self, heats: impl IntoIterator<Item = Heat>, reason: &str) {
        for mut heat in heats {
            if heat.is_empty() {
                self.warnings.push(PatternWarning::HeatDropped {
                    heat: heat.index,
                    reason: reason.to_string(),
                });
                continue;
            }
            heat.index = self.heats.len();
            self.heats.push(heat);
        }
    }
}

impl FiringTechnique {
    /// Short lowercase name used in logs and warnings
    pub fn name(&self) -> &'static str {
        match self {
            Self::Strip(_) => "strip",
            Self::StripContour(_) => "strip_contour",
            Self::Flank(_) => "flank",
            Self::Ring(_) => "ring",
            Self::Head(_) => "head",
            Self::Back(_) => "back",
            Self::Inferno(_) => "inferno",
        }
    }

    /// Check the configuration as a unit
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Strip(config) => config.validate(),
            Self::StripContour(config) => config.validate(),
            Self::Flank(config) => config.validate(),
            Self::Ring(config) => config.validate(),
            Self::Head(config) | Self::Back(config) => config.validate(),
            Self::Inferno(config) => config.validate(),
        }
    }

    /// Lay out and time the ignition pattern of this technique.
    ///
    /// # Arguments
    /// * `unit` - Firing area with its firing direction
    /// * `crew` - Igniters in crew order
    ///
    /// # Errors
    /// Configuration problems, degenerate geometry and (for contour
    /// following) a grid that yields no heat at all.
    pub fn generate_pattern(&self, unit: &BurnUnit, crew: &IgnitionCrew) -> Result<PatternReport> {
        self.validate()?;
        if unit.area() <= 0.0 {
            return Err(IgnitionError::degenerate("firing area has no area"));
        }

        let plan = match self {
            Self::Strip(config) => strip::plan(unit, crew, config)?,
            Self::StripContour(config) => strip_contour::plan(unit, crew, config)?,
            Self::Flank(config) => flank::plan(unit, crew, config)?,
            Self::Ring(config) => ring::plan(unit, crew, config)?,
            Self::Head(config) => perimeter::plan(unit, crew, config, perimeter::Edge::Aft)?,
            Self::Back(config) => perimeter::plan(unit, crew, config, perimeter::Edge::Fore)?,
            Self::Inferno(config) => inferno::plan(unit, crew, config)?,
        };

        let pattern = TemporalPropagator::new(&plan.crew, plan.timing)
            .with_spacing(plan.spacing)
            .with_mode(plan.mode)
            .propagate(&plan.heats, unit.crs());

        let technique = self.name();
        for warning in &plan.warnings {
            warn!(technique, %warning, "Pattern warning");
        }
        info!(
            technique,
            heats = pattern.heat_count(),
            paths = pattern.paths.len(),
            elapsed = pattern.elapsed_time(),
            warnings = plan.warnings.len(),
            "Generated ignition pattern"
        );

        Ok(PatternReport {
            pattern,
            warnings: plan.warnings,
        })
    }

    /// Generate several alternative patterns for the same unit and crew in
    /// parallel. Results keep the order of `techniques`.
    pub fn generate_batch(
        unit: &BurnUnit,
        crew: &IgnitionCrew,
        techniques: &[FiringTechnique],
    ) -> Vec<Result<PatternReport>> {
        techniques
            .par_iter()
            .map(|technique| technique.generate_pattern(unit, crew))
            .collect()
    }
}

/// Crew of exactly `size` igniters, with the warning when it had to change
pub(crate) fn fit_crew(
    technique: &'static str,
    crew: &IgnitionCrew,
    size: usize,
) -> (IgnitionCrew, Option<PatternWarning>) {
    let (resized, resolution) = crew.resized(size);
    let warning = resolution.map(|resolution| PatternWarning::CrewSizeMismatch {
        technique,
        expected: size,
        actual: crew.len(),
        resolution,
    });
    (resized, warning)
}

/// Sizes of the per-igniter lanes of one heat: `depth` for every igniter but
/// the last, `heat_depth` for the last
pub(crate) fn lane_widths(igniters: usize, depth: f64, heat_depth: f64) -> Vec<f64> {
    let mut widths = vec![depth; igniters.saturating_sub(1)];
    widths.push(heat_depth);
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Point;
    use crate::personnel::Igniter;

    fn square() -> BurnUnit {
        BurnUnit::from_exterior(
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            0.0,
            Some(32611),
        )
        .unwrap()
    }

    #[test]
    fn test_technique_json_is_tagged() {
        let technique: FiringTechnique =
            serde_json::from_str(r#"{"technique": "strip", "depth": 50.0}"#).unwrap();
        match technique {
            FiringTechnique::Strip(config) => {
                assert_eq!(config.depth, 50.0);
                assert_eq!(config.side, Side::Right);
            }
            other => panic!("unexpected {other:?}"),
        }

        let ring: FiringTechnique = serde_json::from_str(r#"{"technique": "ring"}"#).unwrap();
        assert_eq!(ring.name(), "ring");

        let contour: FiringTechnique =
            serde_json::from_str(r#"{"technique": "strip_contour", "depth": 15.0, "z_scale": 2.0}"#)
                .unwrap();
        match contour {
            FiringTechnique::StripContour(config) => {
                assert_eq!(config.strip.depth, 15.0);
                assert_eq!(config.z_scale, Some(2.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_fails_before_geometry() {
        let crew = IgnitionCrew::clone_igniter(Igniter::line(1.0).unwrap(), 1).unwrap();
        let technique = FiringTechnique::Strip(StripConfig {
            depth: -5.0,
            ..StripConfig::default()
        });
        let err = technique.generate_pattern(&square(), &crew).unwrap_err();
        assert!(matches!(err, IgnitionError::ConstraintViolation { parameter: "depth", .. }));
    }

    #[test]
    fn test_batch_keeps_order() {
        let crew = IgnitionCrew::clone_igniter(Igniter::line(1.0).unwrap(), 2).unwrap();
        let techniques = [
            FiringTechnique::Ring(RingConfig::default()),
            FiringTechnique::Inferno(InfernoConfig::default()),
            FiringTechnique::Strip(StripConfig {
                depth: 0.0,
                ..StripConfig::default()
            }),
        ];
        let results = FiringTechnique::generate_batch(&square(), &crew, &techniques);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
        assert_eq!(results[0].as_ref().unwrap().pattern.crs, Some(32611));
    }

    #[test]
    fn test_push_heats_renumbers() {
        let crew = IgnitionCrew::clone_igniter(Igniter::line(1.0).unwrap(), 1).unwrap();
        let mut plan = Plan::new(crew, TimingConfig::default());
        let mut lit = Heat::new(2);
        lit.assign(0, vec![vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]]);
        plan.push_heats([Heat::new(0), Heat::new(1), lit], "no line");
        assert_eq!(plan.heats.len(), 1);
        assert_eq!(plan.heats[0].index, 0);
        assert_eq!(plan.warnings.len(), 2);
    }

    #[test]
    fn test_lane_widths() {
        assert_eq!(lane_widths(1, 10.0, 30.0), vec![30.0]);
        assert_eq!(lane_widths(3, 10.0, 30.0), vec![10.0, 10.0, 30.0]);
    }
}
