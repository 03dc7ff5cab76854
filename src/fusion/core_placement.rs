use tracing::debug;

use crate::error::{FiberFuseError, GeometryError, Result};
use crate::geometry::{Circle, Polygon, Shape};
use crate::math::root::{Brent, SolveError};
use crate::math::{left_normal, Point2, Vector2, TOLERANCE};
use crate::operations::boolean::{union_all, Boolean, BooleanKind};

use super::law::FusionConfig;

/// Core offsets of a connected pair, relative to each cladding centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreOffsets {
    pub first: Vector2,
    pub second: Vector2,
}

/// Moves the cores of a connected pair along the line of centres.
///
/// The fused pair (both claddings plus the bridge) is split by the radical
/// line of the two claddings. Each core goes to the cut, perpendicular to the
/// line of centres, that halves its fiber's share of the material.
///
/// # Example
///
/// ```
/// use fiberfuse::fusion::{ConnectionOptimizer, CorePlacement};
/// use fiberfuse::geometry::Circle;
/// use fiberfuse::math::Point2;
///
/// let a = Circle::new(Point2::new(0.0, 0.0), 1.0).unwrap();
/// let b = Circle::new(Point2::new(2.5, 0.0), 1.0).unwrap();
/// let connection = ConnectionOptimizer::new(&a, &b, 0.5).execute().unwrap();
/// let offsets = CorePlacement::new(&a, &b, connection.bridge()).execute().unwrap();
/// assert!(offsets.first.x > 0.0);
/// ```
pub struct CorePlacement<'a> {
    c0: &'a Circle,
    c1: &'a Circle,
    bridge: &'a Shape,
    config: FusionConfig,
}

impl<'a> CorePlacement<'a> {
    #[must_use]
    pub fn new(c0: &'a Circle, c1: &'a Circle, bridge: &'a Shape) -> Self {
        Self {
            c0,
            c1,
            bridge,
            config: FusionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: &FusionConfig) -> Self {
        self.config = *config;
        self
    }

    /// Executes the placement.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the cladding centres coincide or
    /// the halving cut cannot be bracketed.
    pub fn execute(&self) -> Result<CoreOffsets> {
        let delta = self.c1.center() - self.c0.center();
        let distance = delta.norm();
        if distance <= TOLERANCE * (self.c0.radius() + self.c1.radius()) {
            return Err(GeometryError::Degenerate("cladding centres coincide".into()).into());
        }
        let axis = delta / distance;

        let region = union_all(
            [
                &Shape::Circle(self.c0.clone()),
                &Shape::Circle(self.c1.clone()),
                self.bridge,
            ],
            self.config.dedup_epsilon,
        );
        let reach = region
            .bounds()
            .map_or(distance, |b| b.diagonal())
            .max(distance)
            * 2.0;

        let (r0, r1) = (self.c0.radius(), self.c1.radius());
        let split = (distance * distance + r0 * r0 - r1 * r1) / (2.0 * distance);

        let first = self.halving_offset(&region, self.c0.center(), &axis, r0, split, reach)?;
        let second =
            self.halving_offset(&region, self.c1.center(), &-axis, r1, distance - split, reach)?;
        debug!(first, second, "core offsets placed");
        Ok(CoreOffsets {
            first: axis * first,
            second: -axis * second,
        })
    }

    /// Signed distance from `center` along `dir` of the cut halving the part
    /// of `region` that lies before `split`.
    fn halving_offset(
        &self,
        region: &Shape,
        center: &Point2,
        dir: &Vector2,
        radius: f64,
        split: f64,
        reach: f64,
    ) -> Result<f64> {
        let share = self.clip(region, &half_plane(center, dir, split, reach)?);
        let half = 0.5 * share.area();

        let solved = Brent::new(-radius, split)
            .with_tolerance(self.config.tolerance)
            .with_scale(radius)
            .with_value_tolerance(self.config.tolerance * half)
            .with_max_iterations(self.config.max_iterations)
            .solve(|offset| {
                let plane = half_plane(center, dir, offset, reach)?;
                Ok::<_, FiberFuseError>(self.clip(&share, &plane).area() - half)
            });

        match solved {
            Ok(root) => Ok(root.x),
            Err(SolveError::Objective(err)) => Err(err),
            Err(SolveError::NoSignChange { f_lower, f_upper }) => Err(GeometryError::Degenerate(
                format!("core cut not bracketed: residuals {f_lower} and {f_upper}"),
            )
            .into()),
            Err(SolveError::NotConverged { iterations, x }) => Err(GeometryError::Degenerate(
                format!("core cut search stopped at {x} after {iterations} iterations"),
            )
            .into()),
        }
    }

    fn clip(&self, region: &Shape, plane: &Shape) -> Shape {
        Boolean::new(region, plane, BooleanKind::Intersection)
            .with_epsilon(self.config.dedup_epsilon)
            .execute()
    }
}

/// Rectangle standing in for the half plane `(p - origin) · dir <= offset`
/// within `reach` of `origin`.
fn half_plane(origin: &Point2, dir: &Vector2, offset: f64, reach: f64) -> Result<Shape> {
    let normal = left_normal(dir);
    let edge = origin + dir * offset;
    let back = origin - dir * reach;
    let corners = [
        edge - normal * reach,
        edge + normal * reach,
        back + normal * reach,
        back - normal * reach,
    ];
    Ok(Shape::Polygon(Polygon::new(&corners, &[])?))
}
