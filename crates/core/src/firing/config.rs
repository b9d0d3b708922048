//! Per-technique parameters with documented defaults
//!
//! Every config deserializes with missing fields filled from [`Default`] and
//! is checked as a unit by `validate()` before any geometry is touched.

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result};
use crate::pattern::TimingConfig;

/// Default distance between igniters and heats (m)
pub const DEFAULT_DEPTH: f64 = 20.0;

/// Default distance transform radius; keeps flat-terrain distances within
/// about 1.3% of Euclidean at any firing direction
pub const DEFAULT_NEIGHBORHOOD: usize = 3;

/// Side of the unit the first heat starts from, looking downwind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Start on the right (+X) and walk toward the left
    #[default]
    Right,
    /// Start on the left (-X) and walk toward the right
    Left,
}

impl Side {
    /// Sign of the local-X walking direction for a first heat starting here
    pub fn walk_sign(self) -> f64 {
        match self {
            Side::Right => -1.0,
            Side::Left => 1.0,
        }
    }
}

/// Strip-head firing: parallel lines perpendicular to the firing direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Distance between igniters within a heat (m, default 20)
    pub depth: f64,
    /// Distance between the last igniter of a heat and the first of the next
    /// (m, defaults to `depth`)
    pub heat_depth: Option<f64>,
    /// Stagger between igniter starts in metres of walking (default 0)
    pub spacing: f64,
    /// Side the first heat starts from (default right)
    pub side: Side,
    pub timing: TimingConfig,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            heat_depth: None,
            spacing: 0.0,
            side: Side::Right,
            timing: TimingConfig::default(),
        }
    }
}

impl StripConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("depth", self.depth)?;
        if let Some(heat_depth) = self.heat_depth {
            require_positive("heat_depth", heat_depth)?;
        }
        require_non_negative("spacing", self.spacing)?;
        self.timing.validate()
    }

    /// Heat depth with the default applied
    pub fn heat_depth(&self) -> f64 {
        self.heat_depth.unwrap_or(self.depth)
    }
}

/// Strip firing along terrain-following iso-distance lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripContourConfig {
    #[serde(flatten)]
    pub strip: StripConfig,
    /// Overrides the elevation grid's topographic multiplier when set
    pub z_scale: Option<f64>,
    /// Neighbourhood radius of the distance transform in cells (default 3)
    pub neighborhood: usize,
}

impl Default for StripContourConfig {
    fn default() -> Self {
        Self {
            strip: StripConfig::default(),
            z_scale: None,
            neighborhood: DEFAULT_NEIGHBORHOOD,
        }
    }
}

impl StripContourConfig {
    pub fn validate(&self) -> Result<()> {
        self.strip.validate()?;
        if let Some(z_scale) = self.z_scale {
            require_non_negative("z_scale", z_scale)?;
        }
        if self.neighborhood == 0 {
            return Err(crate::error::IgnitionError::constraint(
                "neighborhood",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Flank firing: lines parallel to the firing direction walked downwind
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlankConfig {
    /// Distance between igniters (m); defaults to the unit's width divided by
    /// the crew size
    pub depth: Option<f64>,
    /// Distance between heats (m, defaults to the resolved depth)
    pub heat_depth: Option<f64>,
    /// Stagger between igniter starts in metres of walking (default 0)
    pub spacing: f64,
    /// Flank the first igniter walks (default right)
    pub side: Side,
    pub timing: TimingConfig,
}

impl FlankConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(depth) = self.depth {
            require_positive("depth", depth)?;
        }
        if let Some(heat_depth) = self.heat_depth {
            require_positive("heat_depth", heat_depth)?;
        }
        require_non_negative("spacing", self.spacing)?;
        self.timing.validate()
    }
}

/// Ring firing: two igniters walking the perimeter in opposite directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Inward distance from the boundary (m, default 0)
    pub offset: f64,
    /// Timing; igniters finish together by default
    pub timing: TimingConfig,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            timing: TimingConfig {
                sync_end_time: true,
                ..TimingConfig::default()
            },
        }
    }
}

impl RingConfig {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("offset", self.offset)?;
        self.timing.validate()
    }
}

/// Head or back firing: one igniter along the upwind or downwind boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerimeterConfig {
    /// Inward distance from the boundary (m, default 0)
    pub offset: f64,
    /// Walk the segment clockwise around the unit (default true)
    pub clockwise: bool,
    pub timing: TimingConfig,
}

impl Default for PerimeterConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            clockwise: true,
            timing: TimingConfig::default(),
        }
    }
}

impl PerimeterConfig {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("offset", self.offset)?;
        self.timing.validate()
    }
}

/// Inferno (mass ignition) of the whole perimeter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfernoConfig {
    /// Inward distance from the boundary (m, default 0)
    pub offset: f64,
}

impl InfernoConfig {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("offset", self.offset).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IgnitionError;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let strip: StripConfig =
            serde_json::from_str(r#"{"depth": 30.0, "side": "left"}"#).unwrap();
        assert_eq!(strip.side, Side::Left);
        assert_eq!(strip.heat_depth(), 30.0);
        assert_eq!(strip.timing, TimingConfig::default());

        let ring: RingConfig = serde_json::from_str("{}").unwrap();
        assert!(ring.timing.sync_end_time);

        let head: PerimeterConfig = serde_json::from_str("{}").unwrap();
        assert!(head.clockwise);

        let contour: StripContourConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(contour.neighborhood, DEFAULT_NEIGHBORHOOD);
    }

    #[test]
    fn test_validation_names_the_parameter() {
        let strip = StripConfig {
            depth: 0.0,
            ..StripConfig::default()
        };
        assert!(matches!(
            strip.validate(),
            Err(IgnitionError::ConstraintViolation { parameter: "depth", .. })
        ));

        let flank = FlankConfig {
            spacing: -1.0,
            ..FlankConfig::default()
        };
        assert!(matches!(
            flank.validate(),
            Err(IgnitionError::ConstraintViolation { parameter: "spacing", .. })
        ));

        let contour = StripContourConfig {
            neighborhood: 0,
            ..StripContourConfig::default()
        };
        assert!(contour.validate().is_err());
    }
}
