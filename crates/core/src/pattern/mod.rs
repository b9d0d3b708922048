//! Heats, timed paths and complete ignition patterns
//!
//! A [`Heat`] is the untimed output of a firing technique: which igniter walks
//! which legs. The [`TemporalPropagator`] turns heats into timed [`Path`]s
//! collected in a [`Pattern`].

pub mod propagator;

use std::collections::BTreeMap;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::core_types::{Point, Vec2};

pub use propagator::{HeatSchedule, TemporalPropagator, TimingConfig, TimingMode};

/// One synchronized firing pass over part of the unit
#[derive(Debug, Clone, Default)]
pub struct Heat {
    /// Position of the heat in firing order
    pub index: usize,
    /// Part of the unit this heat fires, world coordinates
    pub area: Option<MultiPolygon<f64>>,
    /// Legs each igniter walks, keyed by crew index, world coordinates
    pub assignments: BTreeMap<usize, Vec<Vec<Point>>>,
}

impl Heat {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Add an igniter's legs, ignoring assignments without any leg
    pub fn assign(&mut self, igniter: usize, legs: Vec<Vec<Point>>) {
        let legs: Vec<Vec<Point>> = legs.into_iter().filter(|leg| !leg.is_empty()).collect();
        if !legs.is_empty() {
            self.assignments.insert(igniter, legs);
        }
    }

    /// True when no igniter has anything to walk
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Position and time of one ignition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: Point,
    /// Seconds from the start of the pattern
    pub time: f64,
}

/// Timed path of one igniter in one heat
///
/// Each stroke is one contiguous run with ignition on; point ignitions give
/// single-waypoint strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub heat: usize,
    pub igniter: usize,
    pub strokes: Vec<Vec<Waypoint>>,
}

impl Path {
    /// All waypoints in walking order
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.strokes.iter().flatten()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.waypoints().next().map(|w| w.time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.strokes.iter().flatten().next_back().map(|w| w.time)
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(Vec::is_empty)
    }
}

/// Timed ignition paths of one or more firing techniques
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub paths: Vec<Path>,
    /// EPSG code of the coordinates, if known
    pub crs: Option<u32>,
}

impl Pattern {
    pub fn new(paths: Vec<Path>, crs: Option<u32>) -> Self {
        Self { paths, crs }
    }

    /// Number of heats (one past the largest heat index)
    pub fn heat_count(&self) -> usize {
        self.paths.iter().map(|p| p.heat + 1).max().unwrap_or(0)
    }

    /// Paths belonging to heat `index`
    pub fn heat(&self, index: usize) -> impl Iterator<Item = &Path> + '_ {
        self.paths.iter().filter(move |p| p.heat == index)
    }

    /// Every waypoint with its heat and igniter
    pub fn waypoints(&self) -> impl Iterator<Item = (usize, usize, &Waypoint)> + '_ {
        self.paths
            .iter()
            .flat_map(|p| p.waypoints().map(move |w| (p.heat, p.igniter, w)))
    }

    /// Earliest ignition time
    pub fn start_time(&self) -> Option<f64> {
        self.waypoints().map(|(_, _, w)| w.time).min_by(f64::total_cmp)
    }

    /// Latest ignition time
    pub fn end_time(&self) -> Option<f64> {
        self.waypoints().map(|(_, _, w)| w.time).max_by(f64::total_cmp)
    }

    /// Time between the first and last ignition
    pub fn elapsed_time(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Copy with every timestamp shifted by `offset` seconds
    #[must_use]
    pub fn shifted(&self, offset: f64) -> Self {
        self.map_waypoints(|w| Waypoint {
            point: w.point,
            time: w.time + offset,
        })
    }

    /// Copy with every point moved by `(dx, dy)`, e.g. to express the pattern
    /// relative to an export origin
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let delta = Vec2::new(dx, dy);
        self.map_waypoints(|w| Waypoint {
            point: w.point + delta,
            time: w.time,
        })
    }

    /// Append `other` after this pattern.
    ///
    /// `other`'s timestamps are shifted by `offset` and its heat indices move
    /// past this pattern's heats. The coordinate system of `self` wins when
    /// both are set.
    #[must_use]
    pub fn merge(&self, other: &Pattern, offset: f64) -> Self {
        let heat_base = self.heat_count();
        let mut paths = self.paths.clone();
        paths.extend(other.shifted(offset).paths.into_iter().map(|p| Path {
            heat: p.heat + heat_base,
            ..p
        }));
        Self {
            paths,
            crs: self.crs.or(other.crs),
        }
    }

    fn map_waypoints(&self, f: impl Fn(&Waypoint) -> Waypoint) -> Self {
        let paths = self
            .paths
            .iter()
            .map(|p| Path {
                heat: p.heat,
                igniter: p.igniter,
                strokes: p
                    .strokes
                    .iter()
                    .map(|s| s.iter().map(&f).collect())
                    .collect(),
            })
            .collect();
        Self {
            paths,
            crs: self.crs,
        }
    }
}
