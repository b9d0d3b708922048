//! Terrain grids for contour-following ignition

pub mod distance_field;
pub mod marching_squares;
pub mod terrain;

// Re-export main types
pub use distance_field::{DistanceField, FieldCell};
pub use marching_squares::Contour;
pub use terrain::ElevationGrid;
