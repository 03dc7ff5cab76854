use std::ops::Range;

use nalgebra::DMatrix;

use crate::error::Result;
use crate::geometry::Shape;
use crate::profile::Profile;

use super::CoordinateSystem;

impl CoordinateSystem {
    /// Occupancy mask of `shape`: a cell is set when its centre lies inside.
    ///
    /// Rows follow y (row 0 at `y_min`), columns follow x. Each scanline span
    /// is half-open, so a centre exactly on a right-hand edge is outside.
    #[must_use]
    pub fn rasterize(&self, shape: &Shape) -> DMatrix<bool> {
        let mut mask = DMatrix::from_element(self.ny(), self.nx(), false);
        for (row, columns) in self.spans(shape) {
            for column in columns {
                mask[(row, column)] = true;
            }
        }
        mask
    }

    /// Index map of a profile: background first, then every layer in
    /// resolved order, later layers overwriting earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::LayerOverlapAmbiguity` if the layer order is not
    /// determined.
    pub fn rasterize_layers(&self, profile: &Profile) -> Result<DMatrix<f64>> {
        let mut values = DMatrix::from_element(self.ny(), self.nx(), profile.background());
        for layer in profile.resolved_layers()? {
            for (row, columns) in self.spans(layer.shape()) {
                for column in columns {
                    values[(row, column)] = layer.index();
                }
            }
        }
        Ok(values)
    }

    /// Number of cell centres covered by `shape`.
    #[must_use]
    pub fn count_inside(&self, shape: &Shape) -> usize {
        self.spans(shape).map(|(_, columns)| columns.len()).sum()
    }

    /// Covered column ranges per row.
    fn spans<'a>(&'a self, shape: &'a Shape) -> impl Iterator<Item = (usize, Range<usize>)> + 'a {
        let edges = edges_of(shape);
        let ys = self.y_samples();
        ys.into_iter().enumerate().flat_map(move |(row, y)| {
            let crossings = match shape {
                Shape::Circle(c) => {
                    let dy = y - c.center().y;
                    let h2 = c.radius() * c.radius() - dy * dy;
                    if h2 > 0.0 {
                        let h = h2.sqrt();
                        vec![c.center().x - h, c.center().x + h]
                    } else {
                        Vec::new()
                    }
                }
                _ => scanline_crossings(&edges, y),
            };
            crossings
                .chunks_exact(2)
                .map(|pair| self.column_range(pair[0], pair[1]))
                .filter(|r| !r.is_empty())
                .map(move |r| (row, r))
                .collect::<Vec<_>>()
        })
    }

    /// Columns whose centre lies in `[x0, x1)`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn column_range(&self, x0: f64, x1: f64) -> Range<usize> {
        let dx = self.dx();
        let x_min = self.bounds().x_min;
        let first_at_or_after = |x: f64| -> usize {
            let k = ((x - x_min) / dx - 0.5).ceil();
            k.clamp(0.0, self.nx() as f64) as usize
        };
        first_at_or_after(x0)..first_at_or_after(x1)
    }
}

type Edge = ((f64, f64), (f64, f64));

/// Straight edges of every ring of a region; empty for line strings.
fn edges_of(shape: &Shape) -> Vec<Edge> {
    match shape {
        Shape::Circle(_) | Shape::LineString(_) => Vec::new(),
        Shape::Polygon(p) => p
            .rings()
            .iter()
            .flat_map(|ring| std::iter::once(&ring.exterior).chain(&ring.holes))
            .flat_map(|pts| {
                (0..pts.len()).map(move |k| {
                    let (a, b) = (pts[k], pts[(k + 1) % pts.len()]);
                    ((a.x, a.y), (b.x, b.y))
                })
            })
            .collect(),
    }
}

/// Sorted x positions where the horizontal line at `y` crosses an edge.
/// An edge counts when one end is strictly above `y` and the other is not.
fn scanline_crossings(edges: &[Edge], y: f64) -> Vec<f64> {
    let mut xs: Vec<f64> = edges
        .iter()
        .filter(|((_, ay), (_, by))| (*ay > y) != (*by > y))
        .map(|((ax, ay), (bx, by))| ax + (y - ay) * (bx - ax) / (by - ay))
        .collect();
    xs.sort_by(f64::total_cmp);
    xs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, LineString, Polygon};
    use crate::grid::Resolution;
    use crate::math::{Bounds, Point2};
    use std::f64::consts::PI;

    fn grid(n: usize) -> CoordinateSystem {
        CoordinateSystem::new(Bounds::new(-5.0, 5.0, -5.0, 5.0), Resolution::square(n)).unwrap()
    }

    fn unit_circle() -> Shape {
        Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap())
    }

    #[test]
    fn circle_cell_count_matches_area() {
        let cs = grid(100);
        let count = cs.rasterize(&unit_circle()).iter().filter(|v| **v).count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = count as f64 / (PI * 100.0);
        assert!((ratio - 1.0).abs() < 0.02, "count {count}");
        assert_eq!(count, cs.count_inside(&unit_circle()));
    }

    #[test]
    fn polygonal_circle_agrees_with_analytic() {
        let cs = grid(100);
        let analytic = cs.count_inside(&unit_circle());
        let sampled = cs.count_inside(&Shape::Polygon(
            Circle::new(Point2::origin(), 1.0).unwrap().to_polygon(),
        ));
        assert!(analytic.abs_diff(sampled) <= 4);
    }

    #[test]
    fn rasterization_is_idempotent() {
        let cs = grid(64);
        let shape = unit_circle().union(&Shape::Circle(Circle::new(Point2::new(1.2, 0.3), 0.8).unwrap()));
        assert_eq!(cs.rasterize(&shape), cs.rasterize(&shape));
    }

    #[test]
    fn holes_are_left_clear() {
        let cs = CoordinateSystem::new(Bounds::new(0.0, 4.0, 0.0, 4.0), Resolution::square(4)).unwrap();
        let square = |x0: f64, side: f64| {
            vec![
                Point2::new(x0, x0),
                Point2::new(x0 + side, x0),
                Point2::new(x0 + side, x0 + side),
                Point2::new(x0, x0 + side),
            ]
        };
        let ring = Shape::Polygon(Polygon::new(&square(0.0, 4.0), &[square(1.0, 2.0)]).unwrap());
        let mask = cs.rasterize(&ring);
        assert_eq!(mask.iter().filter(|v| **v).count(), 12);
        assert!(!mask[(1, 1)] && !mask[(2, 2)]);
        assert!(mask[(0, 0)] && mask[(3, 3)]);
    }

    #[test]
    fn right_edge_is_exclusive() {
        // Square [0.5, 2.5] x [0, 4]: centres 0.5 and 1.5 in, 2.5 out.
        let cs = CoordinateSystem::new(Bounds::new(0.0, 4.0, 0.0, 4.0), Resolution::square(4)).unwrap();
        let rect = Shape::Polygon(
            Polygon::new(
                &[
                    Point2::new(0.5, 0.0),
                    Point2::new(2.5, 0.0),
                    Point2::new(2.5, 4.0),
                    Point2::new(0.5, 4.0),
                ],
                &[],
            )
            .unwrap(),
        );
        let mask = cs.rasterize(&rect);
        assert!(mask[(1, 0)] && mask[(1, 1)]);
        assert!(!mask[(1, 2)]);
    }

    #[test]
    fn line_strings_cover_nothing() {
        let cs = grid(16);
        let line = Shape::LineString(
            LineString::new(vec![Point2::new(-4.0, 0.0), Point2::new(4.0, 0.0)]).unwrap(),
        );
        assert_eq!(cs.count_inside(&line), 0);
    }
}
