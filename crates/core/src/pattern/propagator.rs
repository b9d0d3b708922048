//! Timestamping of heat assignments
//!
//! Igniter `i` of heat `k` starts at
//! `heat_start(k) + i * igniter_delay + i * spacing / v_i` and reaches arc
//! length `s` of its legs at `start + s / v_i`. Walking between legs takes
//! time but lays no fire. Waypoints are emitted at the boundaries of every
//! on-interval and at the polyline vertices inside it.
//!
//! With [`TimingConfig::keep_formation`] each igniter instead starts when the
//! previous one reaches its first point, measured along the previous
//! igniter's walking direction. Every heat is re-anchored so that its
//! earliest ignition falls on the heat start.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Heat, Path, Pattern, Waypoint};
use crate::core_types::Point;
use crate::error::{require_non_negative, Result};
use crate::geometry::polyline::{cumulative_lengths, interpolate, VERTEX_EPSILON};
use crate::personnel::{IgniterKinematics, IgnitionCrew};

/// How successive heat start times are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatSchedule {
    /// Heat `k` starts `heat_delay` after the first ignition of heat `k - 1`,
    /// even if its igniters are still walking
    #[default]
    Fixed,
    /// Heat `k` starts `heat_delay` after the last ignition of heat `k - 1`
    AfterPrevious,
}

/// Delays between heats and igniters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds between heat starts (or heat end and next start)
    pub heat_delay: f64,
    /// Seconds between igniter starts within a heat
    pub igniter_delay: f64,
    pub schedule: HeatSchedule,
    /// Delay igniter starts so that every igniter of a heat finishes together
    pub sync_end_time: bool,
    /// Offset each igniter by how far its line starts ahead of the previous
    /// igniter's, along that igniter's walking direction (default false)
    pub keep_formation: bool,
}

impl TimingConfig {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("heat_delay", self.heat_delay)?;
        require_non_negative("igniter_delay", self.igniter_delay)?;
        Ok(())
    }
}

/// Whether igniters walk their legs or ignite them all at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingMode {
    /// Igniters walk their legs at their velocity
    #[default]
    Walking,
    /// Every waypoint of a heat is ignited at the heat start
    Instantaneous,
}

/// Walk plan of one igniter before its start time is known
struct Walk {
    igniter: usize,
    kinematics: IgniterKinematics,
    /// First two vertices of the first leg
    heading: Option<(Point, Point)>,
    offset: f64,
    duration: f64,
    strokes: Vec<Vec<Waypoint>>,
}

/// Converts untimed heats into a timed [`Pattern`]
#[derive(Debug, Clone)]
pub struct TemporalPropagator<'a> {
    crew: &'a IgnitionCrew,
    timing: TimingConfig,
    spacing: f64,
    mode: TimingMode,
}

impl<'a> TemporalPropagator<'a> {
    pub fn new(crew: &'a IgnitionCrew, timing: TimingConfig) -> Self {
        Self {
            crew,
            timing,
            spacing: 0.0,
            mode: TimingMode::Walking,
        }
    }

    /// Stagger igniter `i` by `i * spacing` metres of walking
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TimingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Timestamp every heat in order, starting at time zero.
    pub fn propagate(&self, heats: &[Heat], crs: Option<u32>) -> Pattern {
        let mut paths = Vec::new();
        let mut start = 0.0;
        let mut previous: Option<(f64, f64)> = None;

        for heat in heats {
            if let Some((prev_first, prev_last)) = previous {
                start = match self.timing.schedule {
                    HeatSchedule::Fixed => prev_first + self.timing.heat_delay,
                    HeatSchedule::AfterPrevious => prev_last + self.timing.heat_delay,
                };
            }
            let heat_paths = self.propagate_heat(heat, start);
            let first = heat_paths
                .iter()
                .filter_map(Path::start_time)
                .reduce(f64::min)
                .unwrap_or(start);
            let end = heat_paths
                .iter()
                .filter_map(Path::end_time)
                .fold(start, f64::max);
            debug!(heat = heat.index, start, end, paths = heat_paths.len(), "Timed heat");
            paths.extend(heat_paths);
            previous = Some((first, end));
        }

        Pattern::new(paths, crs)
    }

    /// Timed paths of one heat whose earliest walk begins at `start`
    pub fn propagate_heat(&self, heat: &Heat, start: f64) -> Vec<Path> {
        let mut walks: Vec<Walk> = heat
            .assignments
            .iter()
            .filter_map(|(&igniter, legs)| {
                let kinematics = IgniterKinematics::from(self.crew.get(igniter)?);
                Some(self.plan(igniter, legs, kinematics))
            })
            .collect();

        if self.mode == TimingMode::Walking {
            if self.timing.keep_formation {
                for j in 1..walks.len() {
                    let along = along_walk(&walks[j - 1], &walks[j]);
                    walks[j].offset = walks[j - 1].offset
                        + self.timing.igniter_delay
                        + walks[j].kinematics.travel_time(self.spacing + along);
                }
            }
            if self.timing.sync_end_time {
                let latest = walks
                    .iter()
                    .map(|w| w.offset + w.duration)
                    .fold(f64::NEG_INFINITY, f64::max);
                for walk in &mut walks {
                    walk.offset = latest - walk.duration;
                }
            }
        }

        let earliest = walks.iter().map(|w| w.offset).reduce(f64::min).unwrap_or(0.0);

        walks
            .into_iter()
            .map(|walk| {
                let shift = start + walk.offset - earliest;
                Path {
                    heat: heat.index,
                    igniter: walk.igniter,
                    strokes: walk
                        .strokes
                        .into_iter()
                        .map(|stroke| {
                            stroke
                                .into_iter()
                                .map(|w| Waypoint {
                                    point: w.point,
                                    time: w.time + shift,
                                })
                                .collect()
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Strokes of one igniter with times relative to its own start
    fn plan(&self, igniter: usize, legs: &[Vec<Point>], kinematics: IgniterKinematics) -> Walk {
        let heading = legs.first().and_then(|leg| match leg.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        });

        if self.mode == TimingMode::Instantaneous {
            let strokes = legs
                .iter()
                .map(|leg| leg.iter().map(|&point| Waypoint { point, time: 0.0 }).collect())
                .collect();
            return Walk {
                igniter,
                kinematics,
                heading,
                offset: 0.0,
                duration: 0.0,
                strokes,
            };
        }

        let i = igniter as f64;
        let offset = i * self.timing.igniter_delay + kinematics.travel_time(i * self.spacing);

        let mut strokes = Vec::new();
        let mut walked = 0.0;
        let mut last: Option<Point> = None;
        for leg in legs {
            if let (Some(prev), Some(first)) = (last, leg.first()) {
                walked += (*first - prev).norm();
            }
            let cumulative = cumulative_lengths(leg);
            let length = cumulative.last().copied().unwrap_or(0.0);
            for interval in kinematics.sample(length) {
                strokes.push(stroke(
                    leg,
                    &cumulative,
                    interval.start,
                    interval.end,
                    walked,
                    &kinematics,
                ));
            }
            walked += length;
            last = leg.last().copied().or(last);
        }

        Walk {
            igniter,
            kinematics,
            heading,
            offset,
            duration: kinematics.travel_time(walked),
            strokes,
        }
    }
}

/// Signed distance from `previous`'s first point to `current`'s first point
/// along `previous`'s opening direction
fn along_walk(previous: &Walk, current: &Walk) -> f64 {
    let (Some((a, b)), Some((c, _))) = (previous.heading, current.heading) else {
        return 0.0;
    };
    let direction = b - a;
    let norm = direction.norm();
    if norm < VERTEX_EPSILON {
        return 0.0;
    }
    (c - a).dot(&direction) / norm
}

/// Waypoints of `leg` between arc lengths `from` and `to`
fn stroke(
    leg: &[Point],
    cumulative: &[f64],
    from: f64,
    to: f64,
    walked: f64,
    kinematics: &IgniterKinematics,
) -> Vec<Waypoint> {
    let at = |s: f64| Waypoint {
        point: interpolate(leg, cumulative, s),
        time: kinematics.travel_time(walked + s),
    };
    let mut out = vec![at(from)];
    if to > from {
        out.extend(
            leg.iter()
                .zip(cumulative)
                .filter(|&(_, &c)| c > from && c < to)
                .map(|(&point, &c)| Waypoint {
                    point,
                    time: kinematics.travel_time(walked + c),
                }),
        );
        out.push(at(to));
    }
    out
}
