use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2};

/// Arrangement of identical fibers before fusion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arrangement {
    /// Fibers on a circle, neighbours touching. The first fiber sits on +y,
    /// rotated counter-clockwise by `angle_shift` degrees.
    Ring { count: usize, angle_shift: f64 },
    /// Touching fibers on a segment centred on the origin, tilted by
    /// `rotation` degrees from +x.
    Line { count: usize, rotation: f64 },
}

/// A placement rule for [`FusedStructure::add_structure`](super::FusedStructure::add_structure).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    arrangement: Arrangement,
    scale: f64,
    shift: Vector2,
}

impl Layout {
    #[must_use]
    pub fn ring(count: usize) -> Self {
        Self::from(Arrangement::Ring {
            count,
            angle_shift: 0.0,
        })
    }

    #[must_use]
    pub fn line(count: usize) -> Self {
        Self::from(Arrangement::Line {
            count,
            rotation: 0.0,
        })
    }

    /// Rotates the arrangement by `degrees`.
    #[must_use]
    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.arrangement = match self.arrangement {
            Arrangement::Ring { count, .. } => Arrangement::Ring {
                count,
                angle_shift: degrees,
            },
            Arrangement::Line { count, .. } => Arrangement::Line {
                count,
                rotation: degrees,
            },
        };
        self
    }

    /// Multiplies every centre's distance from the origin by `scale`.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Moves the whole arrangement.
    #[must_use]
    pub fn with_shift(mut self, dx: f64, dy: f64) -> Self {
        self.shift = Vector2::new(dx, dy);
        self
    }

    #[must_use]
    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    /// Centres for fibers of radius `fiber_radius`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` for an empty arrangement or a
    /// non-positive radius or scale.
    #[allow(clippy::cast_precision_loss)]
    pub fn centers(&self, fiber_radius: f64) -> Result<Vec<Point2>> {
        if fiber_radius <= 0.0 || !fiber_radius.is_finite() {
            return Err(GeometryError::Degenerate(format!(
                "layout fiber radius must be positive, got {fiber_radius}"
            ))
            .into());
        }
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return Err(GeometryError::Degenerate(format!(
                "layout scale must be positive, got {}",
                self.scale
            ))
            .into());
        }

        let raw: Vec<Vector2> = match self.arrangement {
            Arrangement::Ring { count: 0, .. } | Arrangement::Line { count: 0, .. } => {
                return Err(GeometryError::Degenerate("layout has no fibers".into()).into());
            }
            Arrangement::Ring { count: 1, .. } => vec![Vector2::zeros()],
            Arrangement::Ring { count, angle_shift } => {
                let delta = TAU / count as f64;
                // Chord between neighbours equals one fiber diameter.
                let distance = (2.0 / (1.0 - delta.cos())).sqrt() * fiber_radius;
                (0..count)
                    .map(|i| {
                        let angle = angle_shift.to_radians() + delta * i as f64;
                        Vector2::new(-angle.sin(), angle.cos()) * distance
                    })
                    .collect()
            }
            Arrangement::Line { count, rotation } => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                let mean = (count - 1) as f64 * 0.5;
                (0..count)
                    .map(|i| Vector2::new(cos, sin) * ((i as f64 - mean) * 2.0 * fiber_radius))
                    .collect()
            }
        };
        Ok(raw
            .into_iter()
            .map(|v| Point2::from(v * self.scale + self.shift))
            .collect())
    }
}

impl From<Arrangement> for Layout {
    fn from(arrangement: Arrangement) -> Self {
        Self {
            arrangement,
            scale: 1.0,
            shift: Vector2::zeros(),
        }
    }
}
