use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Bounds, Point2, Vector2, TOLERANCE};

use super::{Discretization, Polygon};

/// A full circle in the plane, kept analytic until a polygon is needed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    center: Point2,
    radius: f64,
    discretization: Discretization,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the radius is not a finite
    /// positive number or the center is not finite.
    pub fn new(center: Point2, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius < TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "circle radius must be positive, got {radius}"
            ))
            .into());
        }
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(GeometryError::Degenerate("circle center must be finite".into()).into());
        }
        Ok(Self {
            center,
            radius,
            discretization: Discretization::default(),
        })
    }

    /// Sets the sampling used by [`Circle::to_polygon`].
    #[must_use]
    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    /// Returns the center of the circle.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius of the circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn discretization(&self) -> &Discretization {
        &self.discretization
    }

    /// Exact area `pi * r^2`.
    #[must_use]
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.center.x - self.radius,
            self.center.x + self.radius,
            self.center.y - self.radius,
            self.center.y + self.radius,
        )
    }

    /// Strict interior test.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        (p - self.center).norm() < self.radius
    }

    /// Point on the circle at angle `t` (radians, counter-clockwise from +x).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.center + Vector2::new(t.cos(), t.sin()) * self.radius
    }

    /// Counter-clockwise vertices of the inscribed regular polygon.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vertices(&self) -> Vec<Point2> {
        let n = self.discretization.full_circle_segments();
        (0..n)
            .map(|i| self.point_at(TAU * i as f64 / n as f64))
            .collect()
    }

    /// Polygonal approximation of the disc.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_ring_unchecked(self.vertices())
    }

    /// Same circle with a new center.
    #[must_use]
    pub fn moved_to(&self, center: Point2) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }

    /// Same center with a new radius; `None` if the radius collapses.
    #[must_use]
    pub fn resized(&self, radius: f64) -> Option<Self> {
        (radius.is_finite() && radius >= TOLERANCE).then(|| Self {
            radius,
            ..self.clone()
        })
    }
}
