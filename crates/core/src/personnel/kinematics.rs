//! Arc-length sampling of ignition intervals
//!
//! Maps a path length to the sub-intervals along it where ignition is on.
//! Independent of time; the propagator converts arc length to time with the
//! igniter's velocity.

use serde::{Deserialize, Serialize};

use super::{IgnitionInterval, Igniter};
use crate::error::{require_non_negative, require_positive, Result};

/// Tolerance for deciding whether a repeat starts before the end of the path
const LENGTH_EPSILON: f64 = 1e-9;

/// Arc-length interval `[start, end]` where ignition is on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnInterval {
    pub start: f64,
    pub end: f64,
}

impl OnInterval {
    #[inline]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Zero-length intervals are point ignitions
    #[inline]
    pub fn is_point(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Velocity and interval of one igniter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgniterKinematics {
    velocity: f64,
    interval: IgnitionInterval,
}

impl From<&Igniter> for IgniterKinematics {
    fn from(igniter: &Igniter) -> Self {
        Self {
            velocity: igniter.velocity(),
            interval: igniter.interval(),
        }
    }
}

impl IgniterKinematics {
    pub fn new(velocity: f64, interval: IgnitionInterval) -> Result<Self> {
        require_positive("velocity", velocity)?;
        interval.validate()?;
        Ok(Self { velocity, interval })
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Seconds needed to walk `distance` metres
    #[inline]
    pub fn travel_time(&self, distance: f64) -> f64 {
        distance / self.velocity
    }

    /// On-intervals along a path of `path_length` metres, ordered by start.
    pub fn sample(&self, path_length: f64) -> Vec<OnInterval> {
        let length = path_length.max(0.0);
        match self.interval {
            IgnitionInterval::Line => vec![OnInterval::new(0.0, length)],
            IgnitionInterval::Point { gap } => {
                let count = (length / gap + LENGTH_EPSILON).floor() as usize;
                (0..=count)
                    .map(|k| {
                        let s = (k as f64 * gap).min(length);
                        OnInterval::new(s, s)
                    })
                    .collect()
            }
            IgnitionInterval::Dash { gap, .. } if gap == 0.0 => vec![OnInterval::new(0.0, length)],
            IgnitionInterval::Dash { dash, gap } => {
                let period = dash + gap;
                let mut out = vec![OnInterval::new(0.0, dash.min(length))];
                let mut k = 1;
                loop {
                    let start = k as f64 * period;
                    if start >= length - LENGTH_EPSILON {
                        break;
                    }
                    out.push(OnInterval::new(start, (start + dash).min(length)));
                    k += 1;
                }
                out
            }
        }
    }
}

/// On-intervals for a path given raw dash and gap lengths.
///
/// `dash == 0` with a positive gap samples point ignitions, `dash == 0` with
/// no gap and any dash without a gap give one continuous interval.
pub fn sample(path_length: f64, velocity: f64, dash: f64, gap: f64) -> Result<Vec<OnInterval>> {
    require_non_negative("dash", dash)?;
    require_non_negative("gap", gap)?;
    let interval = match (dash > 0.0, gap > 0.0) {
        (false, false) => IgnitionInterval::Line,
        (false, true) => IgnitionInterval::Point { gap },
        (true, _) => IgnitionInterval::Dash { dash, gap },
    };
    Ok(IgniterKinematics::new(velocity, interval)?.sample(path_length))
}
