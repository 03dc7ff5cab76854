//! Sampling grids and rasterization of vector geometry.

mod coordinate_system;
mod rasterize;

pub(crate) use coordinate_system::geometry_bounds;
pub use coordinate_system::{BoundsPolicy, CoordinateSystem, GridHalf, Resolution};
