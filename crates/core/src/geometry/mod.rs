//! Planar geometry of the burn unit
//!
//! - [`OrientedFrame`]: firing-aligned local coordinates
//! - [`BurnUnit`]: validated boundary with buffering operations
//! - [`BoundarySegments`]: fore/aft/port/starboard perimeter pieces
//! - [`PolygonSplitter`]: heat bands and igniter lanes

pub mod burn_unit;
pub mod frame;
pub mod polyline;
pub mod segments;
pub mod splitter;

pub use burn_unit::BurnUnit;
pub use frame::OrientedFrame;
pub use segments::BoundarySegments;
pub use splitter::{Band, PolygonSplitter, SplitAxis};
