use geo::BooleanOps;

use crate::geometry::{Polygon, Shape};

/// The four planar set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BooleanKind {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

/// Default vertex merge distance, relative to the operands' bounding-box
/// diagonal.
pub const DEFAULT_DEDUP_EPSILON: f64 = 1e-9;

/// Boolean operation between two shapes.
///
/// Circles are polygonized with their own discretization; line strings count
/// as empty regions. The result is always a [`Shape::Polygon`], cleaned of
/// near-duplicate vertices and sliver rings.
pub struct Boolean<'a> {
    lhs: &'a Shape,
    rhs: &'a Shape,
    kind: BooleanKind,
    epsilon: f64,
}

impl<'a> Boolean<'a> {
    /// Creates a new boolean operation.
    #[must_use]
    pub fn new(lhs: &'a Shape, rhs: &'a Shape, kind: BooleanKind) -> Self {
        Self {
            lhs,
            rhs,
            kind,
            epsilon: DEFAULT_DEDUP_EPSILON,
        }
    }

    /// Sets the relative merge distance used during cleanup.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Executes the operation.
    #[must_use]
    pub fn execute(&self) -> Shape {
        let a = self.lhs.to_region();
        let b = self.rhs.to_region();
        let epsilon = self.absolute_epsilon(&a, &b);

        let result = match (a.is_empty(), b.is_empty(), self.kind) {
            (true, true, _) => Polygon::empty(),
            (true, false, BooleanKind::Union | BooleanKind::SymmetricDifference) => b,
            (
                false,
                true,
                BooleanKind::Union | BooleanKind::SymmetricDifference | BooleanKind::Difference,
            ) => a,
            (true, false, _) | (false, true, _) => Polygon::empty(),
            (false, false, kind) => {
                let (ga, gb) = (a.as_geo(), b.as_geo());
                Polygon::from_geo(match kind {
                    BooleanKind::Union => ga.union(gb),
                    BooleanKind::Intersection => ga.intersection(gb),
                    BooleanKind::Difference => ga.difference(gb),
                    BooleanKind::SymmetricDifference => ga.xor(gb),
                })
            }
        };
        Shape::Polygon(result.cleaned(epsilon))
    }

    fn absolute_epsilon(&self, a: &Polygon, b: &Polygon) -> f64 {
        let diagonal = match (a.bounds(), b.bounds()) {
            (Some(x), Some(y)) => x.union(&y).diagonal(),
            (Some(x), None) | (None, Some(x)) => x.diagonal(),
            (None, None) => 0.0,
        };
        self.epsilon * diagonal
    }
}

/// Unions `shapes` left to right.
///
/// Each step goes through [`Boolean`], so the cleanup is applied after every
/// merge and the result does not depend on intermediate slivers.
#[must_use]
pub fn union_all<'a>(shapes: impl IntoIterator<Item = &'a Shape>, epsilon: f64) -> Shape {
    shapes.into_iter().fold(Shape::empty(), |acc, shape| {
        Boolean::new(&acc, shape, BooleanKind::Union)
            .with_epsilon(epsilon)
            .execute()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, LineString};
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, side: f64) -> Shape {
        Shape::Polygon(
            Polygon::new(
                &[
                    Point2::new(x0, y0),
                    Point2::new(x0 + side, y0),
                    Point2::new(x0 + side, y0 + side),
                    Point2::new(x0, y0 + side),
                ],
                &[],
            )
            .unwrap(),
        )
    }

    #[test]
    fn overlapping_squares() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        let run = |kind| Boolean::new(&a, &b, kind).execute().area();
        assert_relative_eq!(run(BooleanKind::Union), 7.0, epsilon = 1e-9);
        assert_relative_eq!(run(BooleanKind::Intersection), 1.0, epsilon = 1e-9);
        assert_relative_eq!(run(BooleanKind::Difference), 3.0, epsilon = 1e-9);
        assert_relative_eq!(run(BooleanKind::SymmetricDifference), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_union_keeps_two_components() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(3.0, 0.0, 1.0);
        let u = Boolean::new(&a, &b, BooleanKind::Union).execute();
        assert_eq!(u.component_count(), 2);
    }

    #[test]
    fn empty_operands() {
        let a = square(0.0, 0.0, 1.0);
        let e = Shape::empty();
        assert_relative_eq!(Boolean::new(&a, &e, BooleanKind::Union).execute().area(), 1.0);
        assert_relative_eq!(Boolean::new(&e, &a, BooleanKind::Union).execute().area(), 1.0);
        assert!(Boolean::new(&a, &e, BooleanKind::Intersection).execute().is_empty());
        assert_relative_eq!(Boolean::new(&a, &e, BooleanKind::Difference).execute().area(), 1.0);
        assert!(Boolean::new(&e, &a, BooleanKind::Difference).execute().is_empty());
    }

    #[test]
    fn line_string_is_an_empty_region() {
        let a = square(0.0, 0.0, 1.0);
        let line = Shape::LineString(
            LineString::new(vec![Point2::new(-1.0, 0.5), Point2::new(2.0, 0.5)]).unwrap(),
        );
        let d = Boolean::new(&a, &line, BooleanKind::Difference).execute();
        assert_relative_eq!(d.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn union_all_of_circles() {
        let shapes: Vec<Shape> = (0..3)
            .map(|i| {
                Shape::Circle(Circle::new(Point2::new(f64::from(i) * 5.0, 0.0), 1.0).unwrap())
            })
            .collect();
        let u = union_all(&shapes, DEFAULT_DEDUP_EPSILON);
        assert_eq!(u.component_count(), 3);
        assert_relative_eq!(u.area(), 3.0 * std::f64::consts::PI, max_relative = 1e-3);
    }
}
