mod tessellate_shape;

pub use tessellate_shape::TessellateShape;

use crate::math::Point2;

/// A planar triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point2>,
    /// Triangle indices (each triple defines a counter-clockwise or clockwise
    /// triangle; use [`TriangleMesh::area`] for unsigned measures).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Total unsigned area of all triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.indices
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
                0.5 * (b - a).perp(&(c - a)).abs()
            })
            .sum()
    }

    /// Centroid of one triangle.
    #[must_use]
    pub fn centroid_of(&self, tri: &[u32; 3]) -> Point2 {
        let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
        Point2::from((a.coords + b.coords + c.coords) / 3.0)
    }
}
