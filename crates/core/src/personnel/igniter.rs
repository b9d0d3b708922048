//! Igniters and their ignition intervals

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, IgnitionError, Result};

/// Pattern in which an igniter sets fire while walking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IgnitionInterval {
    /// Continuous ignition line
    Line,
    /// Point ignitions every `gap` metres
    Point { gap: f64 },
    /// Alternating `dash` metres on and `gap` metres off
    Dash { dash: f64, gap: f64 },
}

/// Discriminant of an [`IgnitionInterval`] used by crew constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKind {
    Line,
    Point,
    Dash,
}

impl IgnitionInterval {
    pub fn kind(&self) -> IntervalKind {
        match self {
            Self::Line => IntervalKind::Line,
            Self::Point { .. } => IntervalKind::Point,
            Self::Dash { .. } => IntervalKind::Dash,
        }
    }

    /// Check interval lengths
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Line => Ok(()),
            Self::Point { gap } => require_positive("gap", gap).map(|_| ()),
            Self::Dash { dash, gap } => {
                require_positive("dash", dash)?;
                require_non_negative("gap", gap).map(|_| ())
            }
        }
    }
}

/// Interval expressed in seconds of walking rather than metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimedInterval {
    Line,
    Point { gap_s: f64 },
    Dash { dash_s: f64, gap_s: f64 },
}

/// Units of an ignition rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnits {
    /// Ignitions per metre
    #[default]
    Meters,
    /// Ignitions per second
    Seconds,
}

/// Anything with a walking velocity and an ignition interval: a person with a
/// drip torch, a vehicle, or a drone dispensing ignition spheres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIgniter")]
pub struct Igniter {
    velocity: f64,
    interval: IgnitionInterval,
}

#[derive(Deserialize)]
struct RawIgniter {
    velocity: f64,
    #[serde(default = "line_interval")]
    interval: IgnitionInterval,
}

fn line_interval() -> IgnitionInterval {
    IgnitionInterval::Line
}

impl TryFrom<RawIgniter> for Igniter {
    type Error = IgnitionError;

    fn try_from(raw: RawIgniter) -> Result<Self> {
        Self::new(raw.velocity, raw.interval)
    }
}

impl Igniter {
    /// Create an igniter.
    ///
    /// # Arguments
    /// * `velocity` - Walking speed in m/s, finite and positive
    /// * `interval` - Ignition interval along the path
    pub fn new(velocity: f64, interval: IgnitionInterval) -> Result<Self> {
        require_positive("velocity", velocity)?;
        interval.validate()?;
        Ok(Self { velocity, interval })
    }

    /// Igniter laying a continuous line
    pub fn line(velocity: f64) -> Result<Self> {
        Self::new(velocity, IgnitionInterval::Line)
    }

    /// Igniter setting point ignitions every `gap` metres
    pub fn point(velocity: f64, gap: f64) -> Result<Self> {
        Self::new(velocity, IgnitionInterval::Point { gap })
    }

    /// Igniter laying `dash` metres of fire separated by `gap` metres
    pub fn dash(velocity: f64, dash: f64, gap: f64) -> Result<Self> {
        Self::new(velocity, IgnitionInterval::Dash { dash, gap })
    }

    /// Igniter whose interval is given in seconds; converted with `velocity`
    pub fn with_timed_interval(velocity: f64, interval: TimedInterval) -> Result<Self> {
        require_positive("velocity", velocity)?;
        let interval = match interval {
            TimedInterval::Line => IgnitionInterval::Line,
            TimedInterval::Point { gap_s } => IgnitionInterval::Point {
                gap: gap_s * velocity,
            },
            TimedInterval::Dash { dash_s, gap_s } => IgnitionInterval::Dash {
                dash: dash_s * velocity,
                gap: gap_s * velocity,
            },
        };
        Self::new(velocity, interval)
    }

    /// Igniter described by an ignition rate.
    ///
    /// Zero is a continuous line, a positive rate gives point ignitions and a
    /// negative rate gives equal dashes and gaps of `1 / |rate|`.
    pub fn from_rate(velocity: f64, rate: f64, units: RateUnits) -> Result<Self> {
        require_positive("velocity", velocity)?;
        if !rate.is_finite() {
            return Err(IgnitionError::constraint("rate", format!("must be finite, got {rate}")));
        }
        if rate == 0.0 {
            return Self::line(velocity);
        }
        let spacing = match units {
            RateUnits::Meters => 1.0 / rate.abs(),
            RateUnits::Seconds => velocity / rate.abs(),
        };
        if rate > 0.0 {
            Self::point(velocity, spacing)
        } else {
            Self::dash(velocity, spacing, spacing)
        }
    }

    /// Walking speed in m/s
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn interval(&self) -> IgnitionInterval {
        self.interval
    }

    /// Copy with a different velocity
    pub fn with_velocity(&self, velocity: f64) -> Result<Self> {
        Self::new(velocity, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(Igniter::line(0.0).is_err());
        assert!(Igniter::line(f64::INFINITY).is_err());
        assert!(Igniter::point(1.0, 0.0).is_err());
        assert!(Igniter::dash(1.0, 0.0, 5.0).is_err());
        assert!(Igniter::dash(1.0, 5.0, -1.0).is_err());
        assert!(Igniter::dash(1.0, 5.0, 0.0).is_ok());
    }

    #[test]
    fn test_timed_interval_converts_with_velocity() {
        let interval = TimedInterval::Dash {
            dash_s: 10.0,
            gap_s: 4.0,
        };
        let igniter = Igniter::with_timed_interval(0.5, interval).unwrap();
        assert_eq!(igniter.interval(), IgnitionInterval::Dash { dash: 5.0, gap: 2.0 });
    }

    #[test]
    fn test_rate_sign_selects_interval_kind() {
        let line = Igniter::from_rate(1.0, 0.0, RateUnits::Meters).unwrap();
        assert_eq!(line.interval(), IgnitionInterval::Line);

        let dots = Igniter::from_rate(2.0, 0.1, RateUnits::Meters).unwrap();
        assert!(matches!(
            dots.interval(),
            IgnitionInterval::Point { gap } if (gap - 10.0).abs() < 1e-12
        ));

        let dashes = Igniter::from_rate(2.0, -0.5, RateUnits::Seconds).unwrap();
        match dashes.interval() {
            IgnitionInterval::Dash { dash, gap } => {
                assert_relative_eq!(dash, 4.0);
                assert_relative_eq!(gap, 4.0);
            }
            other => panic!("expected dashes, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Igniter =
            serde_json::from_str(r#"{"velocity": 0.8, "interval": {"kind": "point", "gap": 3.0}}"#)
                .unwrap();
        assert_eq!(ok.interval(), IgnitionInterval::Point { gap: 3.0 });

        let line: Igniter = serde_json::from_str(r#"{"velocity": 0.8}"#).unwrap();
        assert_eq!(line.interval(), IgnitionInterval::Line);

        assert!(serde_json::from_str::<Igniter>(r#"{"velocity": -1.0}"#).is_err());
    }
}
