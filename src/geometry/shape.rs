use geo::{Buffer, Centroid, Rotate, Scale, Translate};

use crate::error::{GeometryError, Result};
use crate::math::distance_2d::polyline_to_polyline_dist;
use crate::math::{Bounds, Point2, TOLERANCE};
use crate::operations::boolean::{Boolean, BooleanKind};

use super::{Circle, LineString, Polygon, Ring};

/// Any 2D primitive handled by the engine.
///
/// Every operation returns a new value; operands are never modified.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    LineString(LineString),
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Self::Polygon(p)
    }
}

impl From<LineString> for Shape {
    fn from(l: LineString) -> Self {
        Self::LineString(l)
    }
}

impl Shape {
    /// The empty region.
    #[must_use]
    pub fn empty() -> Self {
        Self::Polygon(Polygon::empty())
    }

    /// Region covered by the shape. Line strings cover nothing.
    #[must_use]
    pub fn to_region(&self) -> Polygon {
        match self {
            Self::Circle(c) => c.to_polygon(),
            Self::Polygon(p) => p.clone(),
            Self::LineString(_) => Polygon::empty(),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Boolean::new(self, other, BooleanKind::Union).execute()
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Boolean::new(self, other, BooleanKind::Intersection).execute()
    }

    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Boolean::new(self, other, BooleanKind::Difference).execute()
    }

    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        Boolean::new(self, other, BooleanKind::SymmetricDifference).execute()
    }

    /// Grows (positive) or shrinks (negative) the shape by `distance`.
    ///
    /// Circles stay analytic. A line string grows into a capsule-shaped
    /// region; shrinking it yields the empty region.
    #[must_use]
    pub fn buffer(&self, distance: f64) -> Self {
        match self {
            Self::Circle(c) => c
                .resized(c.radius() + distance)
                .map_or_else(Self::empty, Self::Circle),
            Self::Polygon(p) if p.is_empty() => Self::empty(),
            Self::Polygon(p) => Self::Polygon(Polygon::from_geo(p.as_geo().buffer(distance))),
            Self::LineString(l) if distance > 0.0 => {
                Self::Polygon(Polygon::from_geo(l.to_geo().buffer(distance)))
            }
            Self::LineString(_) => Self::empty(),
        }
    }

    /// Scales uniformly about `origin`. A zero factor collapses the shape.
    #[must_use]
    pub fn scale(&self, factor: f64, origin: &Point2) -> Self {
        let map = |p: &Point2| origin + (p - origin) * factor;
        match self {
            Self::Circle(c) => c
                .resized(c.radius() * factor.abs())
                .map_or_else(Self::empty, |r| Self::Circle(r.moved_to(map(c.center())))),
            Self::Polygon(_) if factor.abs() < TOLERANCE => Self::empty(),
            Self::Polygon(p) => Self::Polygon(
                Polygon::from_geo(p.as_geo().scale_around_point(
                    factor,
                    factor,
                    geo::Coord {
                        x: origin.x,
                        y: origin.y,
                    },
                ))
                .cleaned(0.0),
            ),
            Self::LineString(l) => Self::LineString(l.map_points(map)),
        }
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        match self {
            Self::Circle(c) => {
                let center = c.center();
                Self::Circle(c.moved_to(Point2::new(center.x + dx, center.y + dy)))
            }
            Self::Polygon(p) => Self::Polygon(Polygon::from_geo(p.as_geo().translate(dx, dy))),
            Self::LineString(l) => {
                Self::LineString(l.map_points(|p| Point2::new(p.x + dx, p.y + dy)))
            }
        }
    }

    /// Rotates counter-clockwise by `degrees` about `origin`.
    #[must_use]
    pub fn rotate(&self, degrees: f64, origin: &Point2) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let map = |p: &Point2| {
            let v = p - origin;
            Point2::new(origin.x + cos * v.x - sin * v.y, origin.y + sin * v.x + cos * v.y)
        };
        match self {
            Self::Circle(c) => Self::Circle(c.moved_to(map(c.center()))),
            Self::Polygon(p) => Self::Polygon(Polygon::from_geo(
                p.as_geo()
                    .rotate_around_point(degrees, geo::Point::new(origin.x, origin.y)),
            )),
            Self::LineString(l) => Self::LineString(l.map_points(map)),
        }
    }

    /// Interior test for regions; for line strings, whether `p` lies on the
    /// polyline within tolerance.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        match self {
            Self::Circle(c) => c.contains(p),
            Self::Polygon(poly) => poly.contains(p),
            Self::LineString(l) => {
                l.distance_to_point(p) <= TOLERANCE * l.bounds().diagonal().max(1.0)
            }
        }
    }

    /// Minimum distance between the two shapes.
    ///
    /// Zero when they overlap or one contains the other; infinite when either
    /// is empty.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        if let (Self::Circle(a), Self::Circle(b)) = (self, other) {
            let gap = (b.center() - a.center()).norm() - a.radius() - b.radius();
            return gap.max(0.0);
        }
        let (a, b) = (self.outline_paths(), other.outline_paths());
        if a.is_empty() || b.is_empty() {
            return f64::INFINITY;
        }
        let inside = |paths: &[Vec<Point2>], shape: &Self| {
            paths.iter().flatten().any(|p| shape.contains(p))
        };
        if inside(&a, other) || inside(&b, self) {
            return 0.0;
        }
        a.iter()
            .flat_map(|pa| b.iter().map(move |pb| polyline_to_polyline_dist(pa, pb)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Boundary rings.
    ///
    /// A line string yields a single ring whose exterior is the open path.
    #[must_use]
    pub fn boundary(&self) -> Vec<Ring> {
        match self {
            Self::LineString(l) => vec![Ring {
                exterior: l.points().to_vec(),
                holes: Vec::new(),
            }],
            _ => self.to_region().rings(),
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Circle(c) => c.area(),
            Self::Polygon(p) => p.area(),
            Self::LineString(_) => 0.0,
        }
    }

    /// Axis-aligned bounds, or `None` for the empty region.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Circle(c) => Some(c.bounds()),
            Self::Polygon(p) => p.bounds(),
            Self::LineString(l) => Some(l.bounds()),
        }
    }

    #[must_use]
    pub fn centroid(&self) -> Option<Point2> {
        match self {
            Self::Circle(c) => Some(*c.center()),
            Self::Polygon(p) => p.centroid(),
            Self::LineString(l) => l.to_geo().centroid().map(|c| Point2::new(c.x(), c.y())),
        }
    }

    #[must_use]
    pub fn convex_hull(&self) -> Self {
        match self {
            Self::LineString(_) => Self::empty(),
            _ => Self::Polygon(self.to_region().convex_hull()),
        }
    }

    /// Returns `true` for shapes that cover no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Circle(_) => false,
            Self::Polygon(p) => p.is_empty(),
            Self::LineString(_) => true,
        }
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        match self {
            Self::Circle(_) => 1,
            Self::Polygon(p) => p.component_count(),
            Self::LineString(_) => 0,
        }
    }

    #[must_use]
    pub fn hole_count(&self) -> usize {
        match self {
            Self::Polygon(p) => p.hole_count(),
            _ => 0,
        }
    }

    /// Passes the shape through if it covers some area.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` naming `context` if the shape is
    /// empty.
    pub fn require_non_empty(self, context: &str) -> Result<Self> {
        if self.is_empty() {
            return Err(GeometryError::Degenerate(format!("{context}: empty result")).into());
        }
        Ok(self)
    }

    /// Closed boundary polylines (first point repeated) for distance queries.
    fn outline_paths(&self) -> Vec<Vec<Point2>> {
        let close = |mut ring: Vec<Point2>| {
            if let Some(first) = ring.first().copied() {
                ring.push(first);
            }
            ring
        };
        match self {
            Self::LineString(l) => vec![l.points().to_vec()],
            _ => self
                .to_region()
                .rings()
                .into_iter()
                .flat_map(|r| std::iter::once(r.exterior).chain(r.holes))
                .map(close)
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn circle(x: f64, y: f64, r: f64) -> Shape {
        Shape::Circle(Circle::new(Point2::new(x, y), r).unwrap())
    }

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Shape {
        Shape::Polygon(
            Polygon::new(
                &[
                    Point2::new(x0, y0),
                    Point2::new(x0 + w, y0),
                    Point2::new(x0 + w, y0 + h),
                    Point2::new(x0, y0 + h),
                ],
                &[],
            )
            .unwrap(),
        )
    }

    #[test]
    fn overlapping_circles_union_is_one_component() {
        let u = circle(0.0, 0.0, 1.0).union(&circle(1.5, 0.0, 1.0));
        assert_eq!(u.component_count(), 1);
        assert_eq!(u.hole_count(), 0);
        assert!(u.area() < 2.0 * PI);
        assert!(u.area() > PI);
    }

    #[test]
    fn difference_can_punch_a_hole() {
        let d = rect(0.0, 0.0, 4.0, 4.0).difference(&circle(2.0, 2.0, 1.0));
        assert_eq!(d.component_count(), 1);
        assert_eq!(d.hole_count(), 1);
        assert_relative_eq!(d.area(), 16.0 - PI, max_relative = 1e-3);
    }

    #[test]
    fn circle_buffer_stays_analytic() {
        let grown = circle(0.0, 0.0, 1.0).buffer(0.5);
        assert!(matches!(grown, Shape::Circle(ref c) if (c.radius() - 1.5).abs() < 1e-15));
        assert!(circle(0.0, 0.0, 1.0).buffer(-2.0).is_empty());
    }

    #[test]
    fn polygon_buffer_grows_area() {
        let grown = rect(0.0, 0.0, 2.0, 2.0).buffer(0.5);
        assert!(grown.area() > 4.0 + 4.0 * 2.0 * 0.5);
        let shrunk = rect(0.0, 0.0, 2.0, 2.0).buffer(-0.5);
        assert_relative_eq!(shrunk.area(), 1.0, max_relative = 1e-6);
    }

    #[test]
    fn translate_round_trip_restores_boundary() {
        let shape = rect(0.0, 0.0, 1.0, 2.0).union(&circle(1.0, 1.0, 0.5));
        let back = shape.translate(3.5, -1.25).translate(-3.5, 1.25);
        let (a, b) = (shape.boundary(), back.boundary());
        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(&b) {
            assert_eq!(ra.exterior.len(), rb.exterior.len());
            for (pa, pb) in ra.exterior.iter().zip(&rb.exterior) {
                assert!((pa - pb).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn scale_and_rotate() {
        let r = rect(0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(r.scale(3.0, &Point2::origin()).area(), 9.0, epsilon = 1e-12);
        assert!(r.scale(0.0, &Point2::origin()).is_empty());
        let rotated = r.rotate(90.0, &Point2::origin());
        let b = rotated.bounds().unwrap();
        assert_relative_eq!(b.x_min, -1.0, epsilon = 1e-12);
        assert_relative_eq!(b.x_max, 0.0, epsilon = 1e-12);
        let c = circle(1.0, 0.0, 1.0).rotate(180.0, &Point2::origin());
        assert_relative_eq!(c.centroid().unwrap().x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn distances() {
        assert_relative_eq!(circle(0.0, 0.0, 1.0).distance_to(&circle(3.0, 0.0, 1.0)), 1.0);
        assert_relative_eq!(circle(0.0, 0.0, 1.0).distance_to(&circle(1.0, 0.0, 1.0)), 0.0);
        let d = rect(0.0, 0.0, 1.0, 1.0).distance_to(&rect(3.0, 0.0, 1.0, 1.0));
        assert_relative_eq!(d, 2.0, epsilon = 1e-12);
        let nested = rect(0.0, 0.0, 10.0, 10.0).distance_to(&rect(4.0, 4.0, 1.0, 1.0));
        assert_relative_eq!(nested, 0.0);
        assert!(rect(0.0, 0.0, 1.0, 1.0).distance_to(&Shape::empty()).is_infinite());
    }

    #[test]
    fn line_string_contains_points_on_path() {
        let line = Shape::LineString(
            LineString::new(vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)]).unwrap(),
        );
        assert!(line.contains(&Point2::new(1.0, 0.0)));
        assert!(!line.contains(&Point2::new(1.0, 0.1)));
        assert!(line.is_empty());
        assert_relative_eq!(line.area(), 0.0);
        assert_eq!(line.boundary()[0].exterior.len(), 2);
    }

    #[test]
    fn require_non_empty_reports_context() {
        let err = Shape::empty().require_non_empty("bridge").unwrap_err();
        assert!(err.to_string().contains("bridge"));
        assert!(circle(0.0, 0.0, 1.0).require_non_empty("clad").is_ok());
    }

    #[test]
    fn convex_hull_of_two_circles() {
        let u = circle(0.0, 0.0, 1.0).union(&circle(4.0, 0.0, 1.0));
        let hull = u.convex_hull();
        assert_eq!(hull.component_count(), 1);
        assert_relative_eq!(hull.area(), PI + 8.0, max_relative = 1e-3);
    }
}
