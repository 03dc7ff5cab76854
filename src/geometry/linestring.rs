use geo::{Euclidean, Length};

use crate::error::{GeometryError, Result};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::{Bounds, Point2};

/// An open polyline. It has no area and contributes nothing to boolean
/// region operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineString {
    points: Vec<Point2>,
}

impl LineString {
    /// Creates a new polyline.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if fewer than two points are given
    /// or any coordinate is not finite.
    pub fn new(points: Vec<Point2>) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::Degenerate(format!(
                "line string needs at least 2 points, got {}",
                points.len()
            ))
            .into());
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::Degenerate("line string has non-finite points".into()).into());
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        Euclidean.length(&self.to_geo())
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        // Non-empty by construction.
        Bounds::from_points(&self.points).unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Distance from `p` to the nearest segment.
    #[must_use]
    pub fn distance_to_point(&self, p: &Point2) -> f64 {
        self.points
            .windows(2)
            .map(|w| point_to_segment_dist(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Same polyline with every point mapped through `f`.
    #[must_use]
    pub fn map_points(&self, f: impl Fn(&Point2) -> Point2) -> Self {
        Self {
            points: self.points.iter().map(f).collect(),
        }
    }

    pub(crate) fn to_geo(&self) -> geo::LineString<f64> {
        self.points
            .iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn needs_two_points() {
        assert!(LineString::new(vec![Point2::origin()]).is_err());
    }

    #[test]
    fn length_and_distance() {
        let line = LineString::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(line.length(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(line.distance_to_point(&Point2::new(1.0, 1.0)), 1.0, epsilon = 1e-12);
        assert_relative_eq!(line.bounds().height(), 4.0);
    }
}
