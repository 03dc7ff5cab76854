mod circle;
mod discretization;
mod linestring;
mod polygon;
mod shape;

pub use circle::Circle;
pub use discretization::Discretization;
pub use linestring::LineString;
pub use polygon::{Polygon, Ring};
pub use shape::Shape;
