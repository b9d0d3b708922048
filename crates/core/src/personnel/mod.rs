//! Ignition personnel: igniters, crews and their walking kinematics

pub mod crew;
pub mod igniter;
pub mod kinematics;

pub use crew::{CrewConstraints, IgnitionCrew};
pub use igniter::{IgnitionInterval, Igniter, IntervalKind, RateUnits, TimedInterval};
pub use kinematics::{IgniterKinematics, OnInterval};
