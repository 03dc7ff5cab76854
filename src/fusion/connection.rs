use std::convert::Infallible;
use std::f64::consts::PI;

use tracing::debug;

use crate::error::{ConnectionError, FiberFuseError, Result};
use crate::geometry::{Circle, Polygon, Shape};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::circle_circle_intersect_2d;
use crate::math::root::{Brent, SolveError};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::operations::boolean::{Boolean, BooleanKind};

use super::law::{validate_degree, FusionConfig, Topology};

/// Material added between two claddings at a given fusion degree.
#[derive(Debug, Clone)]
pub struct Connection {
    bridge: Shape,
    degree: f64,
    topology: Topology,
    virtual_radius: Option<f64>,
    target_area: f64,
    limit_area: f64,
}

impl Connection {
    /// The bridge region. Never overlaps either cladding.
    #[must_use]
    pub fn bridge(&self) -> &Shape {
        &self.bridge
    }

    #[must_use]
    pub fn into_bridge(self) -> Shape {
        self.bridge
    }

    #[must_use]
    pub fn degree(&self) -> f64 {
        self.degree
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Radius of the virtual circles bounding the bridge; `None` when no
    /// search took place (empty bridge or the whole limit region).
    #[must_use]
    pub fn virtual_radius(&self) -> Option<f64> {
        self.virtual_radius
    }

    /// Area the search aimed for.
    #[must_use]
    pub fn target_area(&self) -> f64 {
        self.target_area
    }

    /// Area of the pair's convex hull not covered by either cladding.
    #[must_use]
    pub fn limit_area(&self) -> f64 {
        self.limit_area
    }

    /// Achieved bridge area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.bridge.area()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bridge.is_empty()
    }

    pub(crate) fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            bridge: self.bridge.translate(dx, dy),
            degree: self.degree,
            topology: self.topology,
            virtual_radius: self.virtual_radius,
            target_area: self.target_area,
            limit_area: self.limit_area,
        }
    }
}

/// Computes the bridge between two claddings.
///
/// The bridge is bounded by two virtual circles tangent to both claddings,
/// mirrored across the line of centres, and clipped to the pair's convex hull.
/// Growing the virtual radius grows the bridge monotonically, so the radius
/// that matches the target area is found with a bracketed root search.
///
/// # Example
///
/// ```
/// use fiberfuse::fusion::ConnectionOptimizer;
/// use fiberfuse::geometry::Circle;
/// use fiberfuse::math::Point2;
///
/// let a = Circle::new(Point2::new(0.0, 0.0), 1.0).unwrap();
/// let b = Circle::new(Point2::new(2.5, 0.0), 1.0).unwrap();
/// let connection = ConnectionOptimizer::new(&a, &b, 0.5).execute().unwrap();
/// assert!(!connection.is_empty());
/// ```
pub struct ConnectionOptimizer<'a> {
    c0: &'a Circle,
    c1: &'a Circle,
    degree: f64,
    topology: Topology,
    config: FusionConfig,
}

impl<'a> ConnectionOptimizer<'a> {
    /// Creates a new optimizer for the pair `(c0, c1)` at `degree`.
    #[must_use]
    pub fn new(c0: &'a Circle, c1: &'a Circle, degree: f64) -> Self {
        Self {
            c0,
            c1,
            degree,
            topology: Topology::isolated(),
            config: FusionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: &FusionConfig) -> Self {
        self.config = *config;
        self
    }

    /// Executes the search.
    ///
    /// # Errors
    ///
    /// - `GeometryError::ParameterOutOfRange` if the degree is outside `[0, 1]`
    /// - `ConnectionError::NoValidConnection` if the claddings are nested or
    ///   concentric, the pair is beyond the influence radius, the limit region
    ///   is empty, or the target area cannot be bracketed
    pub fn execute(&self) -> Result<Connection> {
        let degree = validate_degree(self.degree)?;
        let c0 = self
            .c0
            .clone()
            .with_discretization(self.config.discretization);
        let c1 = self
            .c1
            .clone()
            .with_discretization(self.config.discretization);
        let (r0, r1) = (c0.radius(), c1.radius());
        let distance = (c1.center() - c0.center()).norm();
        let extent = distance + r0 + r1;

        if distance <= TOLERANCE * extent {
            return Err(self.no_connection("cladding centres coincide"));
        }
        if distance <= (r0 - r1).abs() {
            return Err(self.no_connection("one cladding contains the other"));
        }

        let pair = PairGeometry::new(c0, c1, self.config.dedup_epsilon);
        let limit_area = pair.limit.area();
        let connection = |bridge, virtual_radius, target_area| Connection {
            bridge,
            degree,
            topology: self.topology,
            virtual_radius,
            target_area,
            limit_area,
        };

        if degree <= 0.0 {
            return Ok(connection(Shape::empty(), None, 0.0));
        }

        let gap = distance - r0 - r1;
        let max_gap = self.config.influence_gap(degree, r0, r1);
        if gap > max_gap {
            return Err(self.no_connection(format!(
                "clad gap {gap} exceeds the influence radius {max_gap}"
            )));
        }
        if limit_area <= TOLERANCE * extent * extent {
            return Err(self.no_connection("limit region has zero area"));
        }

        let target = self.config.law.target_area(degree, self.topology, limit_area, pair.overlap);
        let value_tolerance = self.config.tolerance * limit_area;
        if target <= value_tolerance {
            return Ok(connection(Shape::empty(), None, target));
        }
        if target >= limit_area - value_tolerance {
            return Ok(connection(pair.limit.clone(), None, target));
        }

        let lower = (0.5 * gap).max(0.0);
        let upper = self.config.search_span * extent;
        // Discretized arcs keep the bridge slightly short of the limit region
        // even at the top of the bracket.
        let ceiling = pair.bridge(upper).area();
        if target >= ceiling - value_tolerance {
            debug!(target, ceiling, limit_area, "target beyond the widest bridge");
            return Ok(connection(pair.limit.clone(), None, target));
        }

        let mut evaluations = 0_usize;
        let solved = Brent::new(lower, upper)
            .with_tolerance(self.config.tolerance)
            .with_scale(r0 + r1)
            .with_value_tolerance(value_tolerance)
            .with_max_iterations(self.config.max_iterations)
            .solve(|radius| {
                evaluations += 1;
                let area = pair.bridge(radius).area();
                debug!(evaluation = evaluations, radius, area, target, "bridge trial");
                Ok::<_, Infallible>(area - target)
            });

        let root = match solved {
            Ok(root) => root,
            Err(SolveError::Objective(never)) => match never {},
            Err(SolveError::NoSignChange { f_lower, f_upper }) => {
                return Err(self.no_connection(format!(
                    "bridge area cannot reach target {target}: residuals {f_lower} and {f_upper} at the bracket ends"
                )));
            }
            Err(SolveError::NotConverged { iterations, x }) => {
                return Err(self.no_connection(format!(
                    "virtual radius search stopped at {x} after {iterations} iterations"
                )));
            }
        };

        let (radius, bridge) = self.settle(&pair, root.x, upper)?;
        debug!(
            degree,
            radius,
            target,
            area = bridge.area(),
            iterations = root.iterations,
            "connection solved"
        );
        Ok(connection(bridge, Some(radius), target))
    }

    /// Steps off the pinch discontinuity when the root lands on its empty
    /// side.
    fn settle(&self, pair: &PairGeometry, radius: f64, upper: f64) -> Result<(f64, Shape)> {
        let mut radius = radius;
        let mut step = self.config.tolerance * radius.abs().max(pair.scale);
        for _ in 0..16 {
            let bridge = pair.bridge(radius);
            if !bridge.is_empty() {
                return Ok((radius, bridge));
            }
            radius = (radius + step).min(upper);
            step *= 2.0;
        }
        Err(self.no_connection(format!("bridge collapsed at virtual radius {radius}")))
    }

    fn no_connection(&self, reason: impl Into<String>) -> FiberFuseError {
        ConnectionError::NoValidConnection {
            degree: self.degree,
            pair: None,
            reason: reason.into(),
        }
        .into()
    }
}

/// Per-pair shapes shared by every trial radius.
struct PairGeometry {
    c0: Circle,
    c1: Circle,
    claddings: Shape,
    hull: Shape,
    limit: Shape,
    /// Area the two claddings share.
    overlap: f64,
    scale: f64,
    epsilon: f64,
}

impl PairGeometry {
    fn new(c0: Circle, c1: Circle, epsilon: f64) -> Self {
        let claddings = Boolean::new(
            &Shape::Circle(c0.clone()),
            &Shape::Circle(c1.clone()),
            BooleanKind::Union,
        )
        .with_epsilon(epsilon)
        .execute();
        let hull = claddings.convex_hull();
        let limit = Boolean::new(&hull, &claddings, BooleanKind::Difference)
            .with_epsilon(epsilon)
            .execute();
        let overlap =
            (c0.to_polygon().area() + c1.to_polygon().area() - claddings.area()).max(0.0);
        let scale = c0.radius() + c1.radius();
        Self {
            c0,
            c1,
            claddings,
            hull,
            limit,
            overlap,
            scale,
            epsilon,
        }
    }

    /// `(kite ∩ hull) − claddings` for virtual radius `radius`.
    fn bridge(&self, radius: f64) -> Shape {
        let Some(kite) = self.kite(radius) else {
            return Shape::empty();
        };
        let clipped = Boolean::new(&kite, &self.hull, BooleanKind::Intersection)
            .with_epsilon(self.epsilon)
            .execute();
        Boolean::new(&clipped, &self.claddings, BooleanKind::Difference)
            .with_epsilon(self.epsilon)
            .execute()
    }

    /// Quadrilateral-like region spanned by the two centres and the contact
    /// arcs. `None` when the virtual circles do not exist or pinch the line of
    /// centres.
    fn kite(&self, radius: f64) -> Option<Shape> {
        let (a, b) = (self.c0.center(), self.c1.center());
        let (upper, lower) = circle_circle_intersect_2d(
            a,
            self.c0.radius() + radius,
            b,
            self.c1.radius() + radius,
        )?;
        if point_to_segment_dist(&upper, a, b) < radius {
            return None;
        }

        let mut ring = vec![*a];
        ring.extend(self.contact_arc(&upper, radius, &self.c0, &self.c1));
        ring.push(*b);
        ring.extend(self.contact_arc(&lower, radius, &self.c1, &self.c0));
        Polygon::new(&ring, &[]).ok().map(Shape::Polygon)
    }

    /// Short arc of the virtual circle at `v` between its contact points with
    /// `from` and `to`.
    #[allow(clippy::cast_precision_loss)]
    fn contact_arc(&self, v: &Point2, radius: f64, from: &Circle, to: &Circle) -> Vec<Point2> {
        let start = contact_point(from, v);
        let end = contact_point(to, v);
        let a0 = (start - v).y.atan2((start - v).x);
        let a1 = (end - v).y.atan2((end - v).x);
        let mut sweep = a1 - a0;
        if sweep > PI {
            sweep -= 2.0 * PI;
        } else if sweep <= -PI {
            sweep += 2.0 * PI;
        }

        let n = self.c0.discretization().segments_for_sweep(sweep);
        let mut arc = Vec::with_capacity(n + 1);
        arc.push(start);
        for i in 1..n {
            let t = a0 + sweep * i as f64 / n as f64;
            arc.push(v + Vector2::new(t.cos(), t.sin()) * radius);
        }
        arc.push(end);
        arc
    }
}

/// Point where the segment from the cladding centre towards `v` leaves the
/// cladding.
fn contact_point(clad: &Circle, v: &Point2) -> Point2 {
    let dir = v - clad.center();
    let norm = dir.norm();
    if norm < TOLERANCE {
        return *clad.center();
    }
    clad.center() + dir * (clad.radius() / norm)
}
