use crate::error::{GeometryError, Result};
use crate::geometry::{Circle, Discretization, Shape};
use crate::math::{Point2, Vector2};

slotmap::new_key_type! {
    /// Unique identifier for a fiber in a fused structure.
    pub struct FiberId;
}

/// Scalar description of a fiber, as supplied by a catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiberSpec {
    pub clad_radius: f64,
    pub clad_index: f64,
    pub core_radius: Option<f64>,
    pub core_index: Option<f64>,
}

impl FiberSpec {
    /// A coreless fiber.
    #[must_use]
    pub fn new(clad_radius: f64, clad_index: f64) -> Self {
        Self {
            clad_radius,
            clad_index,
            core_radius: None,
            core_index: None,
        }
    }

    #[must_use]
    pub fn with_core(mut self, core_radius: f64, core_index: f64) -> Self {
        self.core_radius = Some(core_radius);
        self.core_index = Some(core_index);
        self
    }

    /// Builds a fiber centred at `center`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if a radius is not positive or the
    /// core does not fit inside the cladding.
    pub fn place(&self, center: Point2, discretization: Discretization) -> Result<FiberUnit> {
        let clad = Circle::new(center, self.clad_radius)?.with_discretization(discretization);
        let core = match (self.core_radius, self.core_index) {
            (Some(radius), Some(index)) => {
                if radius >= self.clad_radius {
                    return Err(GeometryError::Degenerate(format!(
                        "core radius {radius} does not fit in cladding radius {}",
                        self.clad_radius
                    ))
                    .into());
                }
                Some((Circle::new(center, radius)?.with_discretization(discretization), index))
            }
            _ => None,
        };
        Ok(FiberUnit {
            clad,
            clad_index: self.clad_index,
            core,
        })
    }
}

/// A placed fiber: cladding plus optional core.
#[derive(Debug, Clone)]
pub struct FiberUnit {
    clad: Circle,
    clad_index: f64,
    core: Option<(Circle, f64)>,
}

impl FiberUnit {
    #[must_use]
    pub fn center(&self) -> &Point2 {
        self.clad.center()
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.clad.radius()
    }

    #[must_use]
    pub fn clad(&self) -> &Circle {
        &self.clad
    }

    #[must_use]
    pub fn clad_index(&self) -> f64 {
        self.clad_index
    }

    /// Core shape, if the fiber has one.
    #[must_use]
    pub fn core(&self) -> Option<Shape> {
        self.core.as_ref().map(|(c, _)| Shape::Circle(c.clone()))
    }

    #[must_use]
    pub fn core_center(&self) -> Option<&Point2> {
        self.core.as_ref().map(|(c, _)| c.center())
    }

    #[must_use]
    pub fn core_index(&self) -> Option<f64> {
        self.core.as_ref().map(|(_, index)| *index)
    }

    /// Moves the cladding and the core together.
    pub(crate) fn translate(&mut self, offset: &Vector2) {
        self.clad = self.clad.moved_to(self.clad.center() + offset);
        if let Some((core, _)) = &mut self.core {
            *core = core.moved_to(core.center() + offset);
        }
    }

    /// Places the core at `center + offset`, leaving the cladding untouched.
    pub(crate) fn set_core_offset(&mut self, offset: &Vector2) {
        let target = self.clad.center() + offset;
        if let Some((core, _)) = &mut self.core {
            *core = core.moved_to(target);
        }
    }
}
