//! Core types and utilities

pub mod units;
pub mod vec2;

pub use units::Degrees;
pub(crate) use units::f64_total_cmp;
pub use vec2::{from_coord, to_coord, Point, Vec2};
