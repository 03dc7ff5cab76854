//! Geometric fusion engine for fused optical-fiber cross sections.
//!
//! Fibers are placed as circular claddings, connected by bridges whose size
//! follows a fusion degree in `[0, 1]`, merged into one outline and finally
//! rasterized into a refractive-index map.

pub mod error;
pub mod fusion;
pub mod geometry;
pub mod grid;
pub mod math;
pub mod operations;
pub mod profile;
pub mod tessellation;

pub use error::{FiberFuseError, Result};
