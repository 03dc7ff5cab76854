use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::geometry::Shape;
use crate::math::Point2;

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the region covered by a shape.
///
/// Every boundary ring becomes a constraint loop of a constrained Delaunay
/// triangulation; triangles are kept when an odd number of constraints
/// separates them from the outside.
pub struct TessellateShape<'a> {
    shape: &'a Shape,
}

impl<'a> TessellateShape<'a> {
    #[must_use]
    pub fn new(shape: &'a Shape) -> Self {
        Self { shape }
    }

    /// Executes the tessellation. An empty region gives an empty mesh.
    ///
    /// # Errors
    ///
    /// Returns `TessellationError::Failed` if a vertex cannot be inserted or
    /// two boundary segments cross.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let region = self.shape.to_region();
        let mut cdt = Cdt::new();
        for ring in region.rings() {
            insert_constraint_loop(&mut cdt, &ring.exterior)?;
            for hole in &ring.holes {
                insert_constraint_loop(&mut cdt, hole)?;
            }
        }

        let interior = classify_interior_faces(&cdt);
        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let mut triangle = [0_u32; 3];
            for (slot, vh) in triangle.iter_mut().zip(face.vertices()) {
                let key = vh.fix().index();
                *slot = if let Some(&existing) = vertex_map.get(&key) {
                    existing
                } else {
                    let index = u32::try_from(mesh.vertices.len()).map_err(|_| {
                        TessellationError::Failed("mesh exceeds u32 vertex indices".into())
                    })?;
                    let pos = vh.position();
                    mesh.vertices.push(Point2::new(pos.x, pos.y));
                    vertex_map.insert(key, index);
                    index
                };
            }
            mesh.indices.push(triangle);
        }

        Ok(mesh)
    }
}

/// Inserts a closed ring as constraint edges.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed("boundary segments intersect".into()).into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Flood fill from the outer face; crossing a constraint flips the parity.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, LineString, Polygon};
    use approx::assert_relative_eq;

    fn square(x0: f64, side: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, x0),
            Point2::new(x0 + side, x0),
            Point2::new(x0 + side, x0 + side),
            Point2::new(x0, x0 + side),
        ]
    }

    #[test]
    fn square_produces_two_triangles() {
        let shape = Shape::Polygon(Polygon::new(&square(0.0, 1.0), &[]).unwrap());
        let mesh = TessellateShape::new(&shape).execute().unwrap();
        assert_eq!(mesh.indices.len(), 2);
        assert_eq!(mesh.vertices.len(), 4);
        assert_relative_eq!(mesh.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hole_is_excluded() {
        let shape =
            Shape::Polygon(Polygon::new(&square(0.0, 4.0), &[square(1.0, 2.0)]).unwrap());
        let mesh = TessellateShape::new(&shape).execute().unwrap();
        assert_relative_eq!(mesh.area(), 12.0, epsilon = 1e-9);
        for tri in &mesh.indices {
            let c = mesh.centroid_of(tri);
            assert!(!(c.x > 1.0 && c.x < 3.0 && c.y > 1.0 && c.y < 3.0));
        }
    }

    #[test]
    fn fused_pair_area_matches_shape() {
        let a = Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap());
        let b = Shape::Circle(Circle::new(Point2::new(1.5, 0.0), 1.0).unwrap());
        let shape = a.union(&b);
        let mesh = TessellateShape::new(&shape).execute().unwrap();
        assert_relative_eq!(mesh.area(), shape.area(), max_relative = 1e-9);
    }

    #[test]
    fn empty_shapes_give_empty_mesh() {
        let line = Shape::LineString(
            LineString::new(vec![Point2::origin(), Point2::new(1.0, 0.0)]).unwrap(),
        );
        assert!(TessellateShape::new(&line).execute().unwrap().indices.is_empty());
        assert!(TessellateShape::new(&Shape::empty()).execute().unwrap().is_empty());
    }
}
