//! Prescribed Fire Ignition Pattern Library
//!
//! Generates timed ignition paths for prescribed burns. Given a planar burn
//! unit boundary, a firing direction and a crew of igniters, a firing
//! technique lays out heats over the unit and the temporal propagator turns
//! them into timestamped waypoints for every igniter.
//!
//! ## Firing Techniques
//!
//! - Strip-head and terrain-following strip firing
//! - Flank firing downwind from either side
//! - Ring, head and back firing along the boundary
//! - Inferno (mass) ignition of the whole perimeter
//!
//! ```no_run
//! use firing_core::{BurnUnit, FiringTechnique, IgnitionCrew, Igniter, StripConfig};
//!
//! let unit = BurnUnit::from_exterior(
//!     &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
//!     0.0,
//!     None,
//! )?;
//! let crew = IgnitionCrew::clone_igniter(Igniter::line(0.5)?, 2)?;
//! let technique = FiringTechnique::Strip(StripConfig {
//!     depth: 25.0,
//!     ..StripConfig::default()
//! });
//! let report = technique.generate_pattern(&unit, &crew)?;
//! let pattern = &report.pattern;
//! println!("{} heats over {:.0} s", pattern.heat_count(), pattern.elapsed_time());
//! # Ok::<(), firing_core::IgnitionError>(())
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;

// Boundary geometry and terrain
pub mod geometry;
pub mod grid;

// Crew, techniques and timing
pub mod firing;
pub mod pattern;
pub mod personnel;

// Re-export core types
pub use core_types::{Degrees, Point, Vec2};
pub use error::{CrewResolution, IgnitionError, PatternWarning, Result};

// Re-export geometry and terrain types
pub use geometry::{Band, BoundarySegments, BurnUnit, OrientedFrame, PolygonSplitter, SplitAxis};
pub use grid::{Contour, DistanceField, ElevationGrid, FieldCell};

// Re-export pattern generation types
pub use firing::{
    FiringTechnique, FlankConfig, InfernoConfig, PatternReport, PerimeterConfig, RingConfig, Side,
    StripConfig, StripContourConfig,
};
pub use pattern::{
    Heat, HeatSchedule, Path, Pattern, TemporalPropagator, TimingConfig, TimingMode, Waypoint,
};
pub use personnel::{
    CrewConstraints, IgnitionCrew, IgnitionInterval, Igniter, IgniterKinematics, IntervalKind,
    OnInterval, RateUnits, TimedInterval,
};
