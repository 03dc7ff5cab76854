pub mod bounds;
pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;
pub mod root;

pub use bounds::Bounds;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns the left-pointing normal of a 2D direction.
#[must_use]
pub fn left_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}
